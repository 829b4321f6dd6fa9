//! Environment configuration.

use chrono::FixedOffset;
use std::{env, fmt::Display, str::FromStr, time::Duration};
use tracing::{info, warn};

const DEFAULT_API_URL: &str = "http://localhost:3000/api";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub auth_token: Option<String>,
    pub restaurant_id: String,
    pub display_offset_minutes: i32,
    pub long_press_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_token: None,
            restaurant_id: String::new(),
            display_offset_minutes: 0,
            long_press_ms: 600,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Missing or unparseable values fall back to
    /// the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let token = lookup("KITCHEN_AUTH_TOKEN").filter(|token| !token.trim().is_empty());
        if token.is_none() {
            info!("KITCHEN_AUTH_TOKEN not set, requests will be unauthenticated");
        }

        Self {
            api_url: try_load(&lookup, "KITCHEN_API_URL", defaults.api_url),
            auth_token: token,
            restaurant_id: try_load(&lookup, "KITCHEN_RESTAURANT_ID", defaults.restaurant_id),
            display_offset_minutes: try_load(
                &lookup,
                "KITCHEN_DISPLAY_OFFSET_MINUTES",
                defaults.display_offset_minutes,
            ),
            long_press_ms: try_load(&lookup, "KITCHEN_LONG_PRESS_MS", defaults.long_press_ms),
        }
    }

    /// Offset the `date`/`time` display strings are formatted in. Out of
    /// range offsets become UTC.
    pub fn display_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.display_offset_minutes.saturating_mul(60)).unwrap_or_else(|| {
            warn!(minutes = self.display_offset_minutes, "Display offset out of range, using UTC");
            utc()
        })
    }

    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }
}

pub(crate) fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap_or_else(|| unreachable!("zero offset is always valid"))
}

fn try_load<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(value) = lookup(key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };
    value.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value: {e}, using default: {default}");
        default
    })
}
