//! Password Reset Use Cases
//!
//! `forgot` mails a short-lived signed link bound to the current password
//! hash; `reset` consumes it. The new hash is written only over the hash the
//! link was issued for, so a link works at most once even when two resets
//! race. A successful reset also ends the live session.

use std::sync::Arc;

use chrono::Utc;
use platform::mail::{MailMessage, Mailer};

use crate::application::config::AuthConfig;
use crate::application::token_authority::TokenAuthority;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    email::Email,
    password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

const RESET_LINK_REJECTED: &str = "Invalid or expired reset link";

/// Password reset use case
pub struct PasswordResetUseCase<A, M>
where
    A: AccountRepository,
    M: Mailer,
{
    account_repo: Arc<A>,
    mailer: Arc<M>,
    config: Arc<AuthConfig>,
}

impl<A, M> PasswordResetUseCase<A, M>
where
    A: AccountRepository,
    M: Mailer,
{
    pub fn new(account_repo: Arc<A>, mailer: Arc<M>, config: Arc<AuthConfig>) -> Self {
        Self {
            account_repo,
            mailer,
            config,
        }
    }

    /// Mail a reset link to the account registered under `email`
    pub async fn forgot(&self, email: String) -> AuthResult<()> {
        let email = Email::new(email).map_err(|_| AuthError::AccountNotFound)?;
        let account = self
            .account_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let authority = TokenAuthority::new(self.config.clone());
        let reset = authority.issue_reset_token(&account, Utc::now())?;
        let link = self.config.reset_link(&reset.token);

        let message = MailMessage {
            to: account.email.as_str().to_string(),
            subject: "Password Reset Request".to_string(),
            body: format!(
                "Hello {},\n\nUse the link below to choose a new password. \
                 It expires in {} minutes.\n\n{}\n\n\
                 If you did not ask for this, you can ignore this email.",
                account.name,
                self.config.reset_ttl.as_secs() / 60,
                link
            ),
        };
        self.mailer.send(&message).await?;

        tracing::info!(account_id = %account.account_id, "Password reset link sent");

        Ok(())
    }

    /// Set a new password using a mailed reset link
    pub async fn reset(&self, token: &str, new_password: String) -> AuthResult<()> {
        let authority = TokenAuthority::new(self.config.clone());
        let grant = authority.decode_reset_token(token, Utc::now())?;

        let account = self
            .account_repo
            .find_by_id(&grant.account_id)
            .await?
            .ok_or(AuthError::Unauthorized(RESET_LINK_REJECTED))?;

        if account.password.fingerprint() != grant.password_fingerprint {
            return Err(AuthError::Unauthorized(RESET_LINK_REJECTED));
        }

        let raw_password = RawPassword::new(new_password)?;
        if self.config.check_breached_passwords {
            raw_password.reject_if_compromised().await?;
        }
        let password =
            UserPassword::from_raw(&raw_password, self.config.pepper(), self.config.password_cost)?;

        // A concurrent reset with the same link loses here
        let replaced = self
            .account_repo
            .replace_password(&account.account_id, &account.password, &password)
            .await?;
        if !replaced {
            return Err(AuthError::Unauthorized(RESET_LINK_REJECTED));
        }

        tracing::info!(account_id = %account.account_id, "Password reset");

        Ok(())
    }
}
