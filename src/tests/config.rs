use crate::config::*;
use anyhow::Result;
use std::{collections::BTreeMap, time::Duration};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: BTreeMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn defaults_apply_when_nothing_is_set() -> Result<()> {
    let config = Config::from_lookup(lookup(&[]))?;

    assert_eq!(config.bind_addr, "0.0.0.0:3000".parse()?);
    assert_eq!(config.api_base_url, "http://localhost:3001/api");
    assert!(config.analytics_enabled);
    assert_eq!(config.api_timeout, Duration::from_secs(5));
    assert_eq!(config.event_log_capacity, 4096);

    Ok(())
}

#[test]
fn variables_override_defaults() -> Result<()> {
    let config = Config::from_lookup(lookup(&[
        (BIND_ADDR_VAR, "127.0.0.1:8080"),
        (API_URL_VAR, "https://agenttalk.dev/api"),
        (ANALYTICS_ENABLED_VAR, "false"),
        (API_TIMEOUT_VAR, "2"),
        (EVENT_LOG_CAPACITY_VAR, "64"),
    ]))?;

    assert_eq!(config.bind_addr, "127.0.0.1:8080".parse()?);
    assert_eq!(config.api_base_url, "https://agenttalk.dev/api");
    assert!(!config.analytics_enabled);
    assert_eq!(config.api_timeout, Duration::from_secs(2));
    assert_eq!(config.event_log_capacity, 64);

    Ok(())
}

#[test]
fn invalid_values_name_the_variable() {
    for (name, value) in [
        (BIND_ADDR_VAR, "not-an-address"),
        (API_URL_VAR, "ftp://example.com"),
        (ANALYTICS_ENABLED_VAR, "maybe"),
        (API_TIMEOUT_VAR, "-1"),
        (EVENT_LOG_CAPACITY_VAR, "0"),
        (EVENT_LOG_CAPACITY_VAR, "lots"),
    ] {
        let err = Config::from_lookup(lookup(&[(name, value)])).unwrap_err();
        assert!(
            format!("{err:#}").contains(name),
            "{name}: unexpected error {err:#}"
        );
    }
}
