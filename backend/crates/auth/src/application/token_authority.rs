//! Token Authority
//!
//! Issues and verifies the credential pair. Access and refresh credentials
//! are signed with different secrets, so one can never be replayed as the
//! other. Password reset links are signed with the access secret but carry
//! a purpose claim that access decoding rejects.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use platform::token::{self, SignedToken, TokenError};
use serde::{Deserialize, Serialize};

use crate::application::config::AuthConfig;
use crate::domain::entity::account::Account;
use crate::domain::entity::credential::{AuthenticatedAccount, CredentialPair};
use crate::domain::value_object::account_role::AccountRole;
use crate::error::{AuthError, AuthResult};

const RESET_PURPOSE: &str = "reset";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
struct AccountClaims {
    sub: AccountId,
    role: AccountRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    purpose: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ResetClaims {
    sub: AccountId,
    purpose: String,
    /// パスワードハッシュの指紋 (変更済みなら無効)
    pwd: String,
}

/// Decoded password reset link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetGrant {
    pub account_id: AccountId,
    pub password_fingerprint: String,
}

#[derive(Debug, Clone)]
pub struct TokenAuthority {
    config: Arc<AuthConfig>,
}

impl TokenAuthority {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn issue_pair(&self, account_id: AccountId, role: AccountRole) -> AuthResult<CredentialPair> {
        self.issue_pair_at(account_id, role, Utc::now())
    }

    pub fn issue_pair_at(
        &self,
        account_id: AccountId,
        role: AccountRole,
        now: DateTime<Utc>,
    ) -> AuthResult<CredentialPair> {
        let claims = AccountClaims {
            sub: account_id,
            role,
            purpose: None,
        };

        let access = token::sign(&claims, &self.config.access_secret, self.config.access_ttl, now)
            .map_err(signing_error)?;
        let refresh = token::sign(&claims, &self.config.refresh_secret, self.config.refresh_ttl, now)
            .map_err(signing_error)?;

        Ok(CredentialPair {
            access_token: access.token,
            refresh_token: refresh.token,
            access_expires_at: access.expires_at,
            refresh_expires_at: refresh.expires_at,
        })
    }

    pub fn decode(&self, token: &str, kind: TokenKind) -> AuthResult<AuthenticatedAccount> {
        self.decode_at(token, kind, Utc::now())
    }

    /// 署名と有効期限を検証して {accountId, role} を返す
    pub fn decode_at(
        &self,
        token: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> AuthResult<AuthenticatedAccount> {
        let secret = match kind {
            TokenKind::Access => &self.config.access_secret,
            TokenKind::Refresh => &self.config.refresh_secret,
        };

        let claims = token::verify::<AccountClaims>(token, secret, now)?;
        if claims.body.purpose.is_some() {
            return Err(AuthError::Unauthorized("Invalid or expired token"));
        }

        Ok(AuthenticatedAccount {
            account_id: claims.body.sub,
            role: claims.body.role,
        })
    }

    pub fn issue_reset_token(&self, account: &Account, now: DateTime<Utc>) -> AuthResult<SignedToken> {
        let claims = ResetClaims {
            sub: account.account_id,
            purpose: RESET_PURPOSE.to_string(),
            pwd: account.password.fingerprint(),
        };
        token::sign(&claims, &self.config.access_secret, self.config.reset_ttl, now)
            .map_err(signing_error)
    }

    pub fn decode_reset_token(&self, token: &str, now: DateTime<Utc>) -> AuthResult<ResetGrant> {
        let claims = token::verify::<ResetClaims>(token, &self.config.access_secret, now)
            .map_err(|_| AuthError::Unauthorized("Invalid or expired reset link"))?;

        if claims.body.purpose != RESET_PURPOSE {
            return Err(AuthError::Unauthorized("Invalid or expired reset link"));
        }

        Ok(ResetGrant {
            account_id: claims.body.sub,
            password_fingerprint: claims.body.pwd,
        })
    }
}

fn signing_error(e: TokenError) -> AuthError {
    AuthError::Internal(format!("Token signing failed: {e}"))
}
