//! Credentials

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use serde::{Deserialize, Serialize};

use crate::domain::value_object::account_role::AccountRole;

/// アクセストークンとリフレッシュトークンの組
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Identity proven by a verified access credential
///
/// Inserted into request extensions by the role gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedAccount {
    pub account_id: AccountId,
    pub role: AccountRole,
}

impl AuthenticatedAccount {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
