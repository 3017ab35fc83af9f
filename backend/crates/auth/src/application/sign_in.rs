//! Sign In Use Case
//!
//! Verifies email and password and opens the account's single session.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token_authority::TokenAuthority;
use crate::domain::entity::account::AccountView;
use crate::domain::entity::credential::CredentialPair;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    email::Email, password::RawPassword, session_marker::SessionMarker,
};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Sign in output
#[derive(Debug)]
pub struct SignInOutput {
    pub account: AccountView,
    pub credentials: CredentialPair,
}

/// Sign in use case
pub struct SignInUseCase<A>
where
    A: AccountRepository,
{
    account_repo: Arc<A>,
    config: Arc<AuthConfig>,
}

impl<A> SignInUseCase<A>
where
    A: AccountRepository,
{
    pub fn new(account_repo: Arc<A>, config: Arc<AuthConfig>) -> Self {
        Self {
            account_repo,
            config,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        // 形式不正なアドレスは登録され得ない
        let email = Email::new(input.email).map_err(|_| AuthError::AccountNotFound)?;

        let account = self
            .account_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let raw_password = RawPassword::for_sign_in(input.password);
        if !account.password.verify(&raw_password, self.config.pepper()) {
            tracing::warn!(account_id = %account.account_id, "Sign-in with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if account.is_signed_in() {
            return Err(AuthError::SessionConflict);
        }

        let authority = TokenAuthority::new(self.config.clone());
        let credentials = authority.issue_pair(account.account_id, account.role)?;

        // 同時サインインはどちらか一方だけが成功する
        let opened = self
            .account_repo
            .compare_and_set_session(
                &account.account_id,
                &SessionMarker::None,
                &SessionMarker::Active(credentials.refresh_token.clone()),
            )
            .await?;
        if !opened {
            return Err(AuthError::SessionConflict);
        }

        tracing::info!(account_id = %account.account_id, "Account signed in");

        Ok(SignInOutput {
            account: account.view(),
            credentials,
        })
    }
}
