use std::str::FromStr;

use crate::app_config::{AppConfig, ClientSettings, Environment, ShopifyCredentials};
use crate::policy::{OrderWindow, RestockPolicy, ThresholdRule};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but its value is invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but its value is invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Missing store credentials are not an error here: the server must still
/// start and answer each request with a configuration error.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let store = optional("SHOPIFY_STORE");
    let access_token = optional("SHOPIFY_ACCESS_TOKEN");
    let credentials = match (store, access_token) {
        (Some(store), Some(access_token)) => Some(ShopifyCredentials {
            store,
            access_token,
        }),
        _ => None,
    };

    let env = parse_environment(&or_default("RESTOCK_ENV", "development"))?;
    let bind_addr: SocketAddr = parse_var(&lookup, "RESTOCK_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("RESTOCK_LOG_LEVEL", "info");

    let defaults = ClientSettings::default();
    let client = ClientSettings {
        api_version: or_default("SHOPIFY_API_VERSION", &defaults.api_version),
        base_url: optional("SHOPIFY_API_BASE_URL"),
        request_timeout_secs: parse_var(&lookup, "RESTOCK_REQUEST_TIMEOUT_SECS", "30")?,
        user_agent: or_default("RESTOCK_USER_AGENT", &defaults.user_agent),
        max_retries: parse_var(&lookup, "RESTOCK_MAX_RETRIES", "0")?,
        retry_backoff_base_ms: parse_var(&lookup, "RESTOCK_RETRY_BACKOFF_BASE_MS", "1000")?,
    };

    let policy = build_policy(&lookup)?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        credentials,
        client,
        policy,
    })
}

fn build_policy<F>(lookup: &F) -> Result<RestockPolicy, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let lookback_months: u32 = parse_var(lookup, "RESTOCK_LOOKBACK_MONTHS", "6")?;
    if !(1..=24).contains(&lookback_months) {
        return Err(ConfigError::InvalidEnvVar {
            var: "RESTOCK_LOOKBACK_MONTHS".to_string(),
            reason: format!("{lookback_months} is outside 1..=24"),
        });
    }
    let max_lookback_months: u32 = parse_var(lookup, "RESTOCK_MAX_LOOKBACK_MONTHS", "24")?;
    if max_lookback_months < lookback_months {
        return Err(ConfigError::InvalidEnvVar {
            var: "RESTOCK_MAX_LOOKBACK_MONTHS".to_string(),
            reason: format!(
                "{max_lookback_months} is shorter than the initial lookback of {lookback_months}"
            ),
        });
    }

    let window = OrderWindow {
        lookback_months,
        max_lookback_months,
        widen_step_months: parse_var(lookup, "RESTOCK_WIDEN_STEP_MONTHS", "3")?,
        min_orders: parse_var(lookup, "RESTOCK_MIN_ORDERS", "0")?,
        order_cap: parse_var(lookup, "RESTOCK_ORDER_CAP", "1000")?,
    };
    if window.order_cap == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "RESTOCK_ORDER_CAP".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let flat: Option<u32> = parse_optional_var(lookup, "RESTOCK_FLAT_THRESHOLD")?;
    let threshold = match flat {
        Some(level) => ThresholdRule::Flat(level),
        None => ThresholdRule::MonthsOfSupply {
            months: parse_var(lookup, "RESTOCK_SUPPLY_MONTHS", "2")?,
            floor: parse_optional_var(lookup, "RESTOCK_MIN_FLOOR")?,
        },
    };

    Ok(RestockPolicy {
        pagination: parse_var(lookup, "RESTOCK_PAGINATION", "cursor")?,
        window,
        rate_basis: parse_var(lookup, "RESTOCK_RATE_BASIS", "observed")?,
        rate_rounding: parse_var(lookup, "RESTOCK_RATE_ROUNDING", "nearest")?,
        threshold,
        sort: parse_var(lookup, "RESTOCK_SORT", "sku")?,
        prediction_limit: parse_var(lookup, "RESTOCK_PREDICTION_LIMIT", "10")?,
    })
}

/// Parses `var` (or `default` when unset or blank) with `FromStr`.
fn parse_var<F, T>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string());
    raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

fn parse_optional_var<F, T>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse::<T>()
                .map(Some)
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason: e.to_string(),
                })
        }
        _ => Ok(None),
    }
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "RESTOCK_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
