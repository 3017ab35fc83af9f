//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use platform::mail::{HttpMailer, Mailer};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::account_role::RoleSet;
use crate::infra::postgres::PgAccountRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AccessGate, require_roles};

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(repo: PgAccountRepository, mailer: HttpMailer, config: Arc<AuthConfig>) -> Router {
    auth_router_generic(repo, mailer, config)
}

/// Create a generic Auth router for any repository / mailer implementation
///
/// Routes are relative; the binary nests them under `/api`.
pub fn auth_router_generic<R, M>(repo: R, mailer: M, config: Arc<AuthConfig>) -> Router
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
        mailer: Arc::new(mailer),
        config: config.clone(),
    };

    let public = Router::new()
        .route("/auth/signup", post(handlers::sign_up::<R, M>))
        .route("/auth/signin", post(handlers::sign_in::<R, M>))
        .route("/auth/refresh", post(handlers::refresh::<R, M>))
        .route("/auth/forgot-password", post(handlers::forgot_password::<R, M>))
        .route("/auth/reset-password", post(handlers::reset_password::<R, M>));

    let members = Router::new()
        .route("/auth/logout", post(handlers::log_out::<R, M>))
        .route(
            "/accounts/me",
            get(handlers::get_me::<R, M>)
                .patch(handlers::update_me::<R, M>)
                .delete(handlers::delete_me::<R, M>),
        )
        .route_layer(middleware::from_fn_with_state(
            AccessGate::new(config.clone(), RoleSet::ANY),
            require_roles,
        ));

    let admins = Router::new()
        .route("/accounts", get(handlers::list_accounts::<R, M>))
        .route(
            "/accounts/{id}",
            get(handlers::get_account::<R, M>).delete(handlers::delete_account::<R, M>),
        )
        .route("/accounts/{id}/role", patch(handlers::change_role::<R, M>))
        .route(
            "/accounts/by-email/{email}",
            get(handlers::find_account_by_email::<R, M>),
        )
        .route_layer(middleware::from_fn_with_state(
            AccessGate::new(config, RoleSet::ADMIN_ONLY),
            require_roles,
        ));

    public.merge(members).merge(admins).with_state(state)
}
