//! Marketplace API server
//!
//! Wires the token authority and the settlement engine onto one axum router
//! under `/api`. Startup failures surface through `anyhow`; request-level
//! failures stay in `kernel::error::AppError`.

mod config;
mod rate_limit;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use auth::{PgAccountRepository, auth_router};
use axum::http::{HeaderValue, Method, header};
use axum::{Router, middleware};
use market::{PgMarketRepository, market_router};
use platform::mail::HttpMailer;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{ApiConfig, MailRelay};
use crate::rate_limit::{RateLimitState, limit_by_client_ip};

const DEFAULT_LOG_FILTER: &str = "api=info,auth=info,market=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env().context("Invalid configuration")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database pool ready");

    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await
        .context("Failed to apply migrations")?;
    tracing::info!("Schema up to date");

    tracing::info!(
        platform_account_id = %config.market.platform_account_id,
        commission_rate_bps = config.market.commission_rate_bps,
        require_list_price = config.market.require_list_price,
        "Settlement configured"
    );

    let mailer = build_mailer(config.mail_relay.as_ref());
    let cors = build_cors(&config.frontend_origins);
    let auth_config = Arc::new(config.auth);

    let api = Router::new()
        .merge(auth_router(
            PgAccountRepository::new(pool.clone()),
            mailer,
            auth_config.clone(),
        ))
        .merge(market_router(
            PgMarketRepository::new(pool),
            auth_config,
            config.market,
        ));

    let app = Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(
            RateLimitState::new(config.rate_limit, config.trusted_proxies),
            limit_by_client_ip,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "Serving");

    // ConnectInfo feeds the per-IP rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn build_mailer(relay: Option<&MailRelay>) -> HttpMailer {
    match relay {
        Some(relay) => HttpMailer::new(relay.url.clone(), relay.api_key.clone()),
        None => {
            tracing::warn!("MAIL_RELAY_URL not set, password reset mail will only be logged");
            HttpMailer::log_only()
        }
    }
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true)
}
