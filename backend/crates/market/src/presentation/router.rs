//! Market Router

use auth::{AccessGate, AuthConfig, RoleSet, require_roles};
use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};
use std::sync::Arc;

use crate::application::config::MarketConfig;
use crate::infra::postgres::PgMarketRepository;
use crate::presentation::handlers::{self, MarketAppState, MarketStore};

/// Create the Market router with PostgreSQL repository
pub fn market_router(
    store: PgMarketRepository,
    auth_config: Arc<AuthConfig>,
    config: MarketConfig,
) -> Router {
    market_router_generic(store, auth_config, config)
}

/// Create a generic Market router for any store implementation
///
/// Routes are relative; the binary nests them under `/api`. Access
/// credentials are checked with the same gate the auth routes use.
pub fn market_router_generic<S>(store: S, auth_config: Arc<AuthConfig>, config: MarketConfig) -> Router
where
    S: MarketStore,
{
    let state = MarketAppState {
        store: Arc::new(store),
        config: Arc::new(config),
    };

    let public = Router::new()
        .route("/projects", get(handlers::list_projects::<S>))
        .route("/projects/{id}", get(handlers::get_project::<S>))
        .route("/projects/owner/{id}", get(handlers::list_projects_by_owner::<S>))
        .route("/feedback/project/{id}", get(handlers::list_project_feedback::<S>));

    let members = Router::new()
        .route("/projects", post(handlers::create_project::<S>))
        .route("/projects/purchased", get(handlers::list_purchased_projects::<S>))
        .route("/projects/{id}/source", get(handlers::get_project_source::<S>))
        .route("/transactions", post(handlers::create_transaction::<S>))
        .route("/transactions/{id}", get(handlers::get_transaction::<S>))
        .route("/feedback", post(handlers::create_feedback::<S>))
        .route(
            "/feedback/{id}",
            patch(handlers::update_feedback::<S>).delete(handlers::delete_feedback::<S>),
        )
        .route_layer(middleware::from_fn_with_state(
            AccessGate::new(auth_config.clone(), RoleSet::ANY),
            require_roles,
        ));

    let admins = Router::new()
        .route("/transactions", get(handlers::list_transactions::<S>))
        .route(
            "/transactions/{id}",
            delete(handlers::delete_transaction::<S>),
        )
        .route(
            "/transactions/{id}/status",
            patch(handlers::update_transaction_status::<S>),
        )
        .route_layer(middleware::from_fn_with_state(
            AccessGate::new(auth_config, RoleSet::ADMIN_ONLY),
            require_roles,
        ));

    public.merge(members).merge(admins).with_state(state)
}
