//! Server Configuration
//!
//! Everything the binary reads from the environment, gathered once at
//! startup. Debug builds fall back to development defaults for secrets.

use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, bail};
use auth::AuthConfig;
use base64::Engine;
use base64::engine::general_purpose;
use kernel::id::AccountId;
use market::MarketConfig;
use platform::rate_limit::RateLimitConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";

/// Mail relay settings; absent means reset mail is only logged
#[derive(Debug, Clone)]
pub struct MailRelay {
    pub url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
    pub market: MarketConfig,
    pub rate_limit: RateLimitConfig,
    /// Reverse proxies allowed to set `X-Forwarded-For` / `X-Real-IP`
    pub trusted_proxies: Vec<IpAddr>,
    pub mail_relay: Option<MailRelay>,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        // Blank entries (`KEY=`) count as unset
        Self::from_lookup(
            |key| std::env::var(key).ok().filter(|value| !value.trim().is_empty()),
            cfg!(debug_assertions),
        )
    }

    /// `lookup` returns the raw value of a variable, if set
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        development: bool,
    ) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be a socket address")?;

        let frontend_origins = lookup("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let auth = auth_config(&lookup, development)?;
        let market = market_config(&lookup)?;

        let rate_limit = RateLimitConfig::new(
            parse_or(&lookup, "RATE_LIMIT_MAX_REQUESTS", 100)?,
            parse_or(&lookup, "RATE_LIMIT_WINDOW_SECS", 15 * 60)?,
        );

        let trusted_proxies = lookup("TRUSTED_PROXIES")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                entry
                    .parse()
                    .with_context(|| format!("TRUSTED_PROXIES has an invalid address: {entry}"))
            })
            .collect::<anyhow::Result<Vec<IpAddr>>>()?;

        let mail_relay = lookup("MAIL_RELAY_URL").map(|url| MailRelay {
            url,
            api_key: lookup("MAIL_RELAY_KEY"),
        });

        Ok(Self {
            database_url,
            bind_addr,
            frontend_origins,
            auth,
            market,
            rate_limit,
            trusted_proxies,
            mail_relay,
        })
    }
}

fn auth_config(
    lookup: &impl Fn(&str) -> Option<String>,
    development: bool,
) -> anyhow::Result<AuthConfig> {
    let secrets = (lookup("ACCESS_TOKEN_SECRET"), lookup("REFRESH_TOKEN_SECRET"));

    let mut config = match secrets {
        (Some(access), Some(refresh)) => AuthConfig::from_secrets(
            decode_secret("ACCESS_TOKEN_SECRET", &access)?,
            decode_secret("REFRESH_TOKEN_SECRET", &refresh)?,
        )?,
        _ if development => {
            tracing::warn!("Token secrets not set, using random development secrets");
            AuthConfig::development()
        }
        _ => bail!("ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must be set in production"),
    };

    if let Some(pepper) = lookup("PASSWORD_PEPPER") {
        config.password_pepper = Some(decode_secret("PASSWORD_PEPPER", &pepper)?);
    }
    if let Some(base) = lookup("FE_BASE_URL") {
        config.reset_link_base = base.trim_end_matches('/').to_string();
    }
    config.check_breached_passwords =
        parse_or(lookup, "CHECK_BREACHED_PASSWORDS", config.check_breached_passwords)?;
    config.allow_admin_sign_up = parse_or(lookup, "ALLOW_ADMIN_SIGNUP", config.allow_admin_sign_up)?;

    Ok(config)
}

fn market_config(lookup: &impl Fn(&str) -> Option<String>) -> anyhow::Result<MarketConfig> {
    let platform_account_id: AccountId = lookup("PLATFORM_ACCOUNT_ID")
        .context("PLATFORM_ACCOUNT_ID must be set")?
        .parse()
        .context("PLATFORM_ACCOUNT_ID must be a UUID")?;

    let defaults = MarketConfig::new(platform_account_id);
    let config = MarketConfig {
        commission_rate_bps: parse_or(lookup, "COMMISSION_RATE_BPS", defaults.commission_rate_bps)?,
        require_list_price: parse_or(lookup, "REQUIRE_LIST_PRICE", defaults.require_list_price)?,
        ..defaults
    };
    config.validate()?;

    Ok(config)
}

fn decode_secret(name: &str, value: &str) -> anyhow::Result<Vec<u8>> {
    general_purpose::STANDARD
        .decode(value.trim())
        .with_context(|| format!("{name} must be base64"))
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        None => Ok(default),
    }
}
