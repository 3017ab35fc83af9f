//! Sign Up Use Case
//!
//! Creates an account and opens its first session.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token_authority::TokenAuthority;
use crate::domain::entity::account::{Account, AccountView};
use crate::domain::entity::credential::CredentialPair;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    account_role::AccountRole,
    display_name::DisplayName,
    email::Email,
    password::{RawPassword, UserPassword},
    session_marker::SessionMarker,
};
use crate::error::{AuthError, AuthResult};

/// Sign up input
pub struct SignUpInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: AccountRole,
}

/// Sign up output
#[derive(Debug)]
pub struct SignUpOutput {
    pub account: AccountView,
    pub credentials: CredentialPair,
}

/// Sign up use case
pub struct SignUpUseCase<A>
where
    A: AccountRepository,
{
    account_repo: Arc<A>,
    config: Arc<AuthConfig>,
}

impl<A> SignUpUseCase<A>
where
    A: AccountRepository,
{
    pub fn new(account_repo: Arc<A>, config: Arc<AuthConfig>) -> Self {
        Self {
            account_repo,
            config,
        }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SignUpOutput> {
        if input.role.is_admin() && !self.config.allow_admin_sign_up {
            return Err(AuthError::Forbidden("Admin accounts cannot be self-registered"));
        }

        let name = DisplayName::new(input.name)?;
        let email = Email::new(input.email)?;

        if self.account_repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let raw_password = RawPassword::new(input.password)?;
        if self.config.check_breached_passwords {
            raw_password.reject_if_compromised().await?;
        }
        let password =
            UserPassword::from_raw(&raw_password, self.config.pepper(), self.config.password_cost)?;

        let mut account = Account::new(name, email, password, input.role);

        let authority = TokenAuthority::new(self.config.clone());
        let credentials = authority.issue_pair(account.account_id, account.role)?;
        account.session = SessionMarker::Active(credentials.refresh_token.clone());

        // 同時登録の競合は一意制約で EmailTaken になる
        self.account_repo.create(&account).await?;

        tracing::info!(
            account_id = %account.account_id,
            role = %account.role,
            "Account signed up"
        );

        Ok(SignUpOutput {
            account: account.view(),
            credentials,
        })
    }
}
