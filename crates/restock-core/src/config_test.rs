use std::collections::HashMap;
use std::env::VarError;

use super::*;
use crate::policy::{PaginationStrategy, RateBasis, RateRounding, SortKey};

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with store credentials populated.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("SHOPIFY_STORE", "acme-tea.myshopify.com");
    m.insert("SHOPIFY_ACCESS_TOKEN", "shpat_test");
    m
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "RESTOCK_ENV"));
}

#[test]
fn build_app_config_succeeds_without_credentials() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("config without credentials");
    assert!(cfg.credentials.is_none());
    assert!(matches!(
        cfg.shopify_credentials(),
        Err(ConfigError::MissingCredentials)
    ));
}

#[test]
fn build_app_config_requires_both_store_and_token() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("SHOPIFY_STORE", "acme-tea.myshopify.com");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.credentials.is_none());

    map.insert("SHOPIFY_ACCESS_TOKEN", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.credentials.is_none(), "blank token counts as missing");
}

#[test]
fn build_app_config_applies_defaults() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();

    let creds = cfg.shopify_credentials().unwrap();
    assert_eq!(creds.store, "acme-tea.myshopify.com");
    assert_eq!(creds.access_token, "shpat_test");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.client.api_version, "2024-10");
    assert!(cfg.client.base_url.is_none());
    assert_eq!(cfg.client.request_timeout_secs, 30);
    assert_eq!(cfg.client.max_retries, 0);
    assert_eq!(cfg.client.retry_backoff_base_ms, 1_000);
    assert_eq!(cfg.policy, RestockPolicy::default());
}

#[test]
fn debug_output_redacts_access_token() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let debug = format!("{cfg:?}");
    assert!(!debug.contains("shpat_test"), "token leaked: {debug}");
    assert!(debug.contains("[redacted]"));
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = full_env();
    map.insert("RESTOCK_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RESTOCK_BIND_ADDR"),
        "expected InvalidEnvVar(RESTOCK_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn api_version_override() {
    let mut map = full_env();
    map.insert("SHOPIFY_API_VERSION", "2025-01");
    map.insert("SHOPIFY_API_BASE_URL", "http://127.0.0.1:9999/admin/api/2025-01");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.client.api_version, "2025-01");
    assert_eq!(
        cfg.client.base_url.as_deref(),
        Some("http://127.0.0.1:9999/admin/api/2025-01")
    );
}

#[test]
fn max_retries_invalid() {
    let mut map = full_env();
    map.insert("RESTOCK_MAX_RETRIES", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RESTOCK_MAX_RETRIES"),
        "expected InvalidEnvVar(RESTOCK_MAX_RETRIES), got: {result:?}"
    );
}

#[test]
fn policy_overrides_are_parsed() {
    let mut map = full_env();
    map.insert("RESTOCK_PAGINATION", "since_id");
    map.insert("RESTOCK_LOOKBACK_MONTHS", "12");
    map.insert("RESTOCK_MIN_ORDERS", "200");
    map.insert("RESTOCK_ORDER_CAP", "5000");
    map.insert("RESTOCK_RATE_BASIS", "nominal");
    map.insert("RESTOCK_RATE_ROUNDING", "fractional");
    map.insert("RESTOCK_SUPPLY_MONTHS", "1");
    map.insert("RESTOCK_MIN_FLOOR", "10");
    map.insert("RESTOCK_SORT", "deficit");
    map.insert("RESTOCK_PREDICTION_LIMIT", "5");
    let policy = build_app_config(lookup_from_map(&map)).unwrap().policy;

    assert_eq!(policy.pagination, PaginationStrategy::SinceId);
    assert_eq!(policy.window.lookback_months, 12);
    assert_eq!(policy.window.min_orders, 200);
    assert_eq!(policy.window.order_cap, 5_000);
    assert_eq!(policy.rate_basis, RateBasis::Nominal);
    assert_eq!(policy.rate_rounding, RateRounding::Fractional);
    assert_eq!(
        policy.threshold,
        ThresholdRule::MonthsOfSupply {
            months: 1,
            floor: Some(10)
        }
    );
    assert_eq!(policy.sort, SortKey::Deficit);
    assert_eq!(policy.prediction_limit, 5);
}

#[test]
fn flat_threshold_takes_precedence_over_supply_months() {
    let mut map = full_env();
    map.insert("RESTOCK_FLAT_THRESHOLD", "50");
    map.insert("RESTOCK_SUPPLY_MONTHS", "3");
    let policy = build_app_config(lookup_from_map(&map)).unwrap().policy;
    assert_eq!(policy.threshold, ThresholdRule::Flat(50));
}

#[test]
fn lookback_outside_supported_range_fails() {
    let mut map = full_env();
    map.insert("RESTOCK_LOOKBACK_MONTHS", "36");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RESTOCK_LOOKBACK_MONTHS"),
        "expected InvalidEnvVar(RESTOCK_LOOKBACK_MONTHS), got: {result:?}"
    );
}

#[test]
fn max_lookback_shorter_than_lookback_fails() {
    let mut map = full_env();
    map.insert("RESTOCK_LOOKBACK_MONTHS", "12");
    map.insert("RESTOCK_MAX_LOOKBACK_MONTHS", "6");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RESTOCK_MAX_LOOKBACK_MONTHS"),
        "expected InvalidEnvVar(RESTOCK_MAX_LOOKBACK_MONTHS), got: {result:?}"
    );
}

#[test]
fn unknown_sort_key_fails() {
    let mut map = full_env();
    map.insert("RESTOCK_SORT", "name");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RESTOCK_SORT"),
        "expected InvalidEnvVar(RESTOCK_SORT), got: {result:?}"
    );
}

#[test]
fn blank_numeric_vars_fall_back_to_defaults() {
    let mut map = full_env();
    map.insert("RESTOCK_ORDER_CAP", "");
    map.insert("RESTOCK_LOOKBACK_MONTHS", "   ");
    map.insert("RESTOCK_SORT", "");
    let cfg = build_app_config(lookup_from_map(&map)).expect("blank values mean unset");
    assert_eq!(cfg.policy.window.order_cap, 1_000);
    assert_eq!(cfg.policy.window.lookback_months, 6);
    assert_eq!(cfg.policy.sort, SortKey::Sku);
}

#[test]
fn zero_order_cap_fails() {
    let mut map = full_env();
    map.insert("RESTOCK_ORDER_CAP", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RESTOCK_ORDER_CAP"),
        "expected InvalidEnvVar(RESTOCK_ORDER_CAP), got: {result:?}"
    );
}
