//! Account Role Value Object
//!
//! Two roles exist. The role is embedded in every access credential and is
//! checked by the route gate.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// アカウントのロール
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountRole {
    #[default]
    User,
    Admin,
}

impl AccountRole {
    pub const ALL: [AccountRole; 2] = [AccountRole::User, AccountRole::Admin];

    /// DB に保存する数値 ID
    pub const fn id(self) -> i16 {
        match self {
            AccountRole::User => 1,
            AccountRole::Admin => 2,
        }
    }

    pub fn from_id(id: i16) -> AppResult<Self> {
        match id {
            1 => Ok(AccountRole::User),
            2 => Ok(AccountRole::Admin),
            _ => Err(AppError::internal(format!("Unknown role id: {id}"))),
        }
    }

    /// ワイヤ上の表記 ("USER" / "ADMIN")
    pub const fn code(self) -> &'static str {
        match self {
            AccountRole::User => "USER",
            AccountRole::Admin => "ADMIN",
        }
    }

    pub const fn is_admin(self) -> bool {
        matches!(self, AccountRole::Admin)
    }

    const fn bit(self) -> u8 {
        1 << (self.id() - 1)
    }
}

impl FromStr for AccountRole {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER" => Ok(AccountRole::User),
            "ADMIN" => Ok(AccountRole::Admin),
            _ => Err(AppError::bad_request(format!("Unknown role: {s}"))
                .with_action("Role must be USER or ADMIN")),
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// 許可ロールの集合 (ルートごとのアクセス制御に使う)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const ANY: RoleSet = RoleSet(AccountRole::User.bit() | AccountRole::Admin.bit());
    pub const ADMIN_ONLY: RoleSet = RoleSet(AccountRole::Admin.bit());
    pub const USER_ONLY: RoleSet = RoleSet(AccountRole::User.bit());

    pub fn of(roles: &[AccountRole]) -> Self {
        RoleSet(roles.iter().fold(0, |acc, role| acc | role.bit()))
    }

    pub const fn contains(self, role: AccountRole) -> bool {
        self.0 & role.bit() != 0
    }
}
