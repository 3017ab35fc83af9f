//! Role Gate
//!
//! `require_roles` verifies the bearer access credential, checks the role
//! against the route's allowed set and stores the caller in request
//! extensions. Handlers read it back with the `AuthenticatedAccount`
//! extractor.

use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::Request;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use platform::client::extract_bearer_token;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token_authority::{TokenAuthority, TokenKind};
use crate::domain::entity::credential::AuthenticatedAccount;
use crate::domain::value_object::account_role::RoleSet;
use crate::error::AuthError;

/// Middleware state: who may pass
#[derive(Clone)]
pub struct AccessGate {
    authority: TokenAuthority,
    allowed: RoleSet,
}

impl AccessGate {
    pub fn new(config: Arc<AuthConfig>, allowed: RoleSet) -> Self {
        Self {
            authority: TokenAuthority::new(config),
            allowed,
        }
    }

    pub fn allowed(&self) -> RoleSet {
        self.allowed
    }
}

/// Middleware that requires a valid access credential with an allowed role
pub async fn require_roles(
    State(gate): State<AccessGate>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let token = extract_bearer_token(req.headers())
        .ok_or(AuthError::Unauthorized("Missing or malformed Authorization header"))?;

    let caller = gate.authority.decode(token, TokenKind::Access)?;

    if !gate.allowed.contains(caller.role) {
        tracing::warn!(
            account_id = %caller.account_id,
            role = %caller.role,
            path = %req.uri().path(),
            "Role not permitted"
        );
        return Err(AuthError::Forbidden("You do not have permission to access this resource"));
    }

    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}

impl<S> FromRequestParts<S> for AuthenticatedAccount
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedAccount>()
            .copied()
            .ok_or(AuthError::Unauthorized("Authentication required"))
    }
}
