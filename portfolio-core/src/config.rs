use std::{env, time::Duration};
use thiserror::Error;
use url::Url;

const DEFAULT_FORM_ENDPOINT: &str = "https://formspree.io/f/myzjdzry";
const DEFAULT_FALLBACK_EMAIL: &str = "contact@himanshukurapati.com";
const DEFAULT_SUBMIT_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_REPLY_DELAY_MIN_MS: u64 = 1_000;
const DEFAULT_REPLY_DELAY_MAX_MS: u64 = 2_500;
const DEFAULT_LOAD_DELAY_MS: u64 = 2_000;
const DEFAULT_REVEAL_INTERVAL_MS: u64 = 500;
const DEFAULT_DOUBLE_TAP_MS: u64 = 300;
const DEFAULT_TICK_MS: u64 = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}")]
    Message(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Config {
    pub contact: ContactConfig,
    pub desktop: DesktopConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ContactConfig {
    pub form_endpoint: String,
    pub fallback_email: String,
    pub submit_timeout: Duration,
    pub pacing: Pacing,
}

/// Bounds of the simulated "thinking" delay before each bot reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pacing {
    pub reply_delay_min: Duration,
    pub reply_delay_max: Duration,
}

impl Pacing {
    pub fn fixed(delay: Duration) -> Self {
        Self {
            reply_delay_min: delay,
            reply_delay_max: delay,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DesktopConfig {
    pub load_delay: Duration,
    pub reveal_interval: Duration,
    pub double_tap_window: Duration,
    pub tick_interval: Duration,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            form_endpoint: DEFAULT_FORM_ENDPOINT.to_string(),
            fallback_email: DEFAULT_FALLBACK_EMAIL.to_string(),
            submit_timeout: Duration::from_millis(DEFAULT_SUBMIT_TIMEOUT_MS),
            pacing: Pacing {
                reply_delay_min: Duration::from_millis(DEFAULT_REPLY_DELAY_MIN_MS),
                reply_delay_max: Duration::from_millis(DEFAULT_REPLY_DELAY_MAX_MS),
            },
        }
    }
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            load_delay: Duration::from_millis(DEFAULT_LOAD_DELAY_MS),
            reveal_interval: Duration::from_millis(DEFAULT_REVEAL_INTERVAL_MS),
            double_tap_window: Duration::from_millis(DEFAULT_DOUBLE_TAP_MS),
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; `load` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let form_endpoint = lookup("CONTACT_FORM_ENDPOINT")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_FORM_ENDPOINT.to_string());
        validate_endpoint(&form_endpoint)?;

        let fallback_email = lookup("CONTACT_FALLBACK_EMAIL")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_FALLBACK_EMAIL.to_string());

        let submit_timeout_ms = parse_positive_u64(
            lookup("CONTACT_SUBMIT_TIMEOUT_MS"),
            DEFAULT_SUBMIT_TIMEOUT_MS,
        )
        .clamp(1_000, 60_000);

        let reply_delay_min_ms = parse_u64(
            lookup("CHAT_REPLY_DELAY_MIN_MS"),
            DEFAULT_REPLY_DELAY_MIN_MS,
        );
        let reply_delay_max_ms = parse_u64(
            lookup("CHAT_REPLY_DELAY_MAX_MS"),
            DEFAULT_REPLY_DELAY_MAX_MS,
        )
        .max(reply_delay_min_ms);

        let desktop = DesktopConfig {
            load_delay: Duration::from_millis(parse_u64(
                lookup("DESKTOP_LOAD_DELAY_MS"),
                DEFAULT_LOAD_DELAY_MS,
            )),
            reveal_interval: Duration::from_millis(parse_u64(
                lookup("DESKTOP_REVEAL_INTERVAL_MS"),
                DEFAULT_REVEAL_INTERVAL_MS,
            )),
            double_tap_window: Duration::from_millis(parse_positive_u64(
                lookup("DESKTOP_DOUBLE_TAP_MS"),
                DEFAULT_DOUBLE_TAP_MS,
            )),
            tick_interval: Duration::from_millis(
                parse_positive_u64(lookup("DESKTOP_TICK_MS"), DEFAULT_TICK_MS).clamp(5, 1_000),
            ),
        };

        Ok(Self {
            contact: ContactConfig {
                form_endpoint,
                fallback_email,
                submit_timeout: Duration::from_millis(submit_timeout_ms),
                pacing: Pacing {
                    reply_delay_min: Duration::from_millis(reply_delay_min_ms),
                    reply_delay_max: Duration::from_millis(reply_delay_max_ms),
                },
            },
            desktop,
        })
    }
}

fn validate_endpoint(value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|err| ConfigError::Message(format!("CONTACT_FORM_ENDPOINT is invalid: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Message(format!(
            "CONTACT_FORM_ENDPOINT must use http or https, got {other}"
        ))),
    }
}

fn parse_u64(value: Option<String>, fallback: u64) -> u64 {
    value
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .unwrap_or(fallback)
}

fn parse_positive_u64(value: Option<String>, fallback: u64) -> u64 {
    value
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(fallback)
}
