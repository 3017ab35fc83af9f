//! Client identification utilities
//!
//! Header helpers shared by the role gate and the rate limiter.

use axum::http::{HeaderMap, header};
use std::net::IpAddr;

/// Extract the bearer credential from `Authorization: Bearer <token>`
///
/// The scheme is matched case-insensitively; an empty token is treated as
/// absent.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Resolve the client IP for a request
///
/// The peer address is the answer unless the peer is one of
/// `trusted_proxies`. Behind a trusted proxy, `X-Forwarded-For` is walked from
/// the right and the first hop that is not itself a trusted proxy wins, then
/// `X-Real-IP` is consulted. Forwarding headers from any other peer are
/// ignored.
pub fn extract_client_ip(
    headers: &HeaderMap,
    direct_ip: Option<IpAddr>,
    trusted_proxies: &[IpAddr],
) -> Option<IpAddr> {
    let peer = direct_ip?;
    if !trusted_proxies.contains(&peer) {
        return Some(peer);
    }

    let hops: Vec<IpAddr> = headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|xff| xff.split(','))
        .filter_map(|hop| hop.trim().parse().ok())
        .collect();
    let forwarded = hops
        .iter()
        .rev()
        .find(|hop| !trusted_proxies.contains(*hop))
        .copied();

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|ip| ip.trim().parse::<IpAddr>().ok())
    };

    forwarded.or_else(real_ip).or(Some(peer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_auth(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(&with_auth("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token(&with_auth("bearer abc")), Some("abc"));
        assert_eq!(extract_bearer_token(&with_auth("Basic dXNlcjpwYXNz")), None);
        assert_eq!(extract_bearer_token(&with_auth("Bearer ")), None);
        assert_eq!(extract_bearer_token(&with_auth("Bearer")), None);
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_untrusted_peer_ignores_forwarding_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("192.168.1.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("10.9.9.9"));

        let peer = ip("203.0.113.5");
        assert_eq!(extract_client_ip(&headers, Some(peer), &[]), Some(peer));
        assert_eq!(
            extract_client_ip(&headers, Some(peer), &[ip("10.0.0.1")]),
            Some(peer)
        );
    }

    #[test]
    fn test_trusted_proxy_uses_rightmost_untrusted_hop() {
        let proxy = ip("10.0.0.1");
        let mut headers = HeaderMap::new();
        // the leftmost entry is whatever the client sent
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("1.2.3.4, 198.51.100.7, 10.0.0.1"),
        );

        assert_eq!(
            extract_client_ip(&headers, Some(proxy), &[proxy]),
            Some(ip("198.51.100.7"))
        );
    }

    #[test]
    fn test_trusted_proxy_falls_back_to_real_ip_then_peer() {
        let proxy = ip("10.0.0.1");
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.9.9.9"));
        assert_eq!(
            extract_client_ip(&headers, Some(proxy), &[proxy]),
            Some(ip("10.9.9.9"))
        );

        assert_eq!(
            extract_client_ip(&HeaderMap::new(), Some(proxy), &[proxy]),
            Some(proxy)
        );
    }

    #[test]
    fn test_no_peer_means_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("192.168.1.1"));
        assert_eq!(extract_client_ip(&headers, None, &[]), None);
    }
}
