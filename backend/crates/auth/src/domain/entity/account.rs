//! Account Entity
//!
//! An identity holding a role, a wallet and at most one live session.
//!
//! The wallet balance is read here but only ever written by the settlement
//! ledger; profile updates never touch it.

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use kernel::money::Money;
use serde::Serialize;

use crate::domain::value_object::{
    account_role::AccountRole, display_name::DisplayName, email::Email, password::UserPassword,
    session_marker::SessionMarker,
};

#[derive(Debug, Clone)]
pub struct Account {
    pub account_id: AccountId,
    pub name: DisplayName,
    pub email: Email,
    pub password: UserPassword,
    pub role: AccountRole,
    pub wallet_balance: Money,
    pub session: SessionMarker,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// 新規アカウント (残高 0, セッションなし)
    pub fn new(name: DisplayName, email: Email, password: UserPassword, role: AccountRole) -> Self {
        let now = Utc::now();
        Self {
            account_id: AccountId::new(),
            name,
            email,
            password,
            role,
            wallet_balance: Money::ZERO,
            session: SessionMarker::None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_active()
    }

    pub fn rename(&mut self, name: DisplayName) {
        self.name = name;
        self.touch();
    }

    pub fn change_email(&mut self, email: Email) {
        self.email = email;
        self.touch();
    }

    pub fn change_role(&mut self, role: AccountRole) {
        self.role = role;
        self.touch();
    }

    /// パスワード変更は既存セッションを無効化する
    pub fn change_password(&mut self, password: UserPassword) {
        self.password = password;
        self.session = SessionMarker::None;
        self.touch();
    }

    pub fn view(&self) -> AccountView {
        AccountView {
            account_id: self.account_id,
            name: self.name.as_str().to_string(),
            email: self.email.as_str().to_string(),
            role: self.role,
            wallet_balance: self.wallet_balance,
            created_at: self.created_at,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Outward view of an account: no password hash, no session marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub account_id: AccountId,
    pub name: String,
    pub email: String,
    pub role: AccountRole,
    pub wallet_balance: Money,
    pub created_at: DateTime<Utc>,
}
