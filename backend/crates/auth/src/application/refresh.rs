//! Refresh Use Case
//!
//! Exchanges the current refresh credential for a new pair. The presented
//! credential must equal the stored session marker, so a rotated-out or
//! signed-out credential is rejected even while its signature is valid.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token_authority::{TokenAuthority, TokenKind};
use crate::domain::entity::credential::CredentialPair;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::session_marker::SessionMarker;
use crate::error::{AuthError, AuthResult};

const REFRESH_REJECTED: &str = "Invalid or Expired Refresh Token";

/// Refresh use case
pub struct RefreshUseCase<A>
where
    A: AccountRepository,
{
    account_repo: Arc<A>,
    config: Arc<AuthConfig>,
}

impl<A> RefreshUseCase<A>
where
    A: AccountRepository,
{
    pub fn new(account_repo: Arc<A>, config: Arc<AuthConfig>) -> Self {
        Self {
            account_repo,
            config,
        }
    }

    pub async fn execute(&self, refresh_token: &str) -> AuthResult<CredentialPair> {
        let authority = TokenAuthority::new(self.config.clone());
        let identity = authority
            .decode(refresh_token, TokenKind::Refresh)
            .map_err(|_| AuthError::Unauthorized(REFRESH_REJECTED))?;

        let account = self
            .account_repo
            .find_by_id(&identity.account_id)
            .await?
            .ok_or(AuthError::Unauthorized(REFRESH_REJECTED))?;

        if !account.session.matches(refresh_token) {
            tracing::warn!(
                account_id = %account.account_id,
                "Refresh with a superseded credential"
            );
            return Err(AuthError::Unauthorized(REFRESH_REJECTED));
        }

        // ロール変更は次のペアから反映される
        let credentials = authority.issue_pair(account.account_id, account.role)?;

        let rotated = self
            .account_repo
            .compare_and_set_session(
                &account.account_id,
                &account.session,
                &SessionMarker::Active(credentials.refresh_token.clone()),
            )
            .await?;
        if !rotated {
            return Err(AuthError::Unauthorized(REFRESH_REJECTED));
        }

        tracing::debug!(account_id = %account.account_id, "Session refreshed");

        Ok(credentials)
    }
}
