use crate::event_log::DEFAULT_RETAINED_EVENTS;
use anyhow::{format_err, Context, Result};
use std::{net::SocketAddr, str::FromStr, time::Duration};

pub const BIND_ADDR_VAR: &str = "AGENTTALK_BIND_ADDR";
pub const API_URL_VAR: &str = "AGENTTALK_API_URL";
pub const ANALYTICS_ENABLED_VAR: &str = "AGENTTALK_ANALYTICS_ENABLED";
pub const API_TIMEOUT_VAR: &str = "AGENTTALK_API_TIMEOUT_SECS";
pub const EVENT_LOG_CAPACITY_VAR: &str = "AGENTTALK_EVENT_LOG_CAPACITY";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_API_URL: &str = "http://localhost:3001/api";
const DEFAULT_API_TIMEOUT_SECS: u64 = 5;

/// Site configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// Base url of the analytics/contact service
    pub api_base_url: String,
    pub analytics_enabled: bool,
    pub api_timeout: Duration,
    /// Number of player events kept for `/api/demo/events`
    pub event_log_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind_addr = parse_or(&lookup, BIND_ADDR_VAR, DEFAULT_BIND_ADDR)?;

        let api_base_url = lookup(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(format_err!("{API_URL_VAR} must be an http(s) url, got {api_base_url:?}"));
        }

        let analytics_enabled = match lookup(ANALYTICS_ENABLED_VAR) {
            None => true,
            Some(v) => parse_flag(&v)
                .ok_or_else(|| format_err!("{ANALYTICS_ENABLED_VAR} must be true or false, got {v:?}"))?,
        };

        let api_timeout = Duration::from_secs(parse_or(
            &lookup,
            API_TIMEOUT_VAR,
            &DEFAULT_API_TIMEOUT_SECS.to_string(),
        )?);

        let event_log_capacity: usize = parse_or(
            &lookup,
            EVENT_LOG_CAPACITY_VAR,
            &DEFAULT_RETAINED_EVENTS.to_string(),
        )?;
        if event_log_capacity == 0 {
            return Err(format_err!("{EVENT_LOG_CAPACITY_VAR} must be positive"));
        }

        Ok(Self {
            bind_addr,
            api_base_url,
            analytics_enabled,
            api_timeout,
            event_log_capacity,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = lookup(name).unwrap_or_else(|| default.to_owned());
    value
        .parse()
        .with_context(|| format!("invalid {name}: {value:?}"))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
