//! Per-client rate limiting middleware

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderValue, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use kernel::error::app_error::AppError;
use platform::client::extract_client_ip;
use platform::rate_limit::{InMemoryRateLimitStore, RateLimitConfig, RateLimitStore};

#[derive(Clone)]
pub struct RateLimitState {
    pub store: Arc<InMemoryRateLimitStore>,
    pub config: Arc<RateLimitConfig>,
    /// Peers whose forwarding headers are believed
    pub trusted_proxies: Arc<[IpAddr]>,
}

impl RateLimitState {
    pub fn new(config: RateLimitConfig, trusted_proxies: Vec<IpAddr>) -> Self {
        Self {
            store: Arc::new(InMemoryRateLimitStore::new()),
            config: Arc::new(config),
            trusted_proxies: trusted_proxies.into(),
        }
    }
}

/// Count the request against its client IP; 429 with `Retry-After` once over the limit
pub async fn limit_by_client_ip(
    State(state): State<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let direct_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let key = extract_client_ip(req.headers(), direct_ip, &state.trusted_proxies)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let now = Utc::now();
    let result = state.store.check_and_increment(&key, &state.config, now).await;

    if !result.allowed {
        tracing::warn!(client_ip = %key, "Rate limit exceeded");
        let mut response = AppError::too_many_requests("Too many requests, please try again later")
            .with_action("Wait before retrying")
            .into_response();
        if let Ok(value) = HeaderValue::from_str(&result.retry_after_secs(now).to_string()) {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        return response;
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Router, middleware};
    use tower::ServiceExt;

    const PROXY: &str = "10.0.0.1";

    fn app(max_requests: u32) -> Router {
        Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(middleware::from_fn_with_state(
                RateLimitState::new(
                    RateLimitConfig::new(max_requests, 60),
                    vec![PROXY.parse().unwrap()],
                ),
                limit_by_client_ip,
            ))
    }

    fn request(peer: &str, forwarded_for: Option<&str>) -> Request<Body> {
        let mut builder = Request::get("/ping");
        if let Some(xff) = forwarded_for {
            builder = builder.header("x-forwarded-for", xff);
        }
        let mut req = builder.body(Body::empty()).unwrap();
        let addr = SocketAddr::new(peer.parse().unwrap(), 40000);
        req.extensions_mut().insert(ConnectInfo(addr));
        req
    }

    #[tokio::test]
    async fn test_limit_then_retry_after() {
        let app = app(2);

        for _ in 0..2 {
            let response = app.clone().oneshot(request("203.0.113.7", None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app.clone().oneshot(request("203.0.113.7", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let retry_after: u64 = response.headers()[header::RETRY_AFTER]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!(retry_after > 0 && retry_after <= 60);

        // other clients have their own window
        let response = app.oneshot(request("198.51.100.1", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_forged_forwarded_for_does_not_reset_window() {
        let app = app(2);

        let mut allowed = 0;
        for i in 0..50 {
            let forged = format!("192.0.2.{i}");
            let response = app
                .clone()
                .oneshot(request("203.0.113.7", Some(forged.as_str())))
                .await
                .unwrap();
            if response.status() == StatusCode::OK {
                allowed += 1;
            }
        }

        assert_eq!(allowed, 2);
    }

    #[tokio::test]
    async fn test_trusted_proxy_limits_per_forwarded_client() {
        let app = app(1);

        let first = app.clone().oneshot(request(PROXY, Some("198.51.100.1"))).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        let again = app.clone().oneshot(request(PROXY, Some("198.51.100.1"))).await.unwrap();
        assert_eq!(again.status(), StatusCode::TOO_MANY_REQUESTS);

        // a different client behind the same proxy has its own window
        let other = app.oneshot(request(PROXY, Some("198.51.100.2"))).await.unwrap();
        assert_eq!(other.status(), StatusCode::OK);
    }
}
