//! Engine configuration.
//!
//! Resolved in priority order: CLI flags, then `STACKWATCH_*` environment
//! variables, then built-in defaults.
use anyhow::{Context, Result};
use std::time::Duration;

pub const POLL_PAUSE_ENV: &str = "STACKWATCH_POLL_PAUSE_MS";
pub const LOOKUP_TIMEOUT_ENV: &str = "STACKWATCH_LOOKUP_TIMEOUT_MS";

const DEFAULT_POLL_PAUSE: Duration = Duration::from_secs(5);
const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Pause between two polls of the same operation.
    pub poll_pause: Duration,
    /// Upper bound for single-shot lookups.
    pub lookup_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_pause: DEFAULT_POLL_PAUSE,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(pause) = millis_var(&lookup, POLL_PAUSE_ENV)? {
            config.poll_pause = pause;
        }
        if let Some(timeout) = millis_var(&lookup, LOOKUP_TIMEOUT_ENV)? {
            config.lookup_timeout = timeout;
        }
        Ok(config)
    }

    /// Apply explicit overrides, e.g. from command-line flags.
    pub fn with_overrides(
        mut self,
        poll_pause_ms: Option<u64>,
        lookup_timeout_ms: Option<u64>,
    ) -> Self {
        if let Some(ms) = poll_pause_ms {
            self.poll_pause = Duration::from_millis(ms);
        }
        if let Some(ms) = lookup_timeout_ms {
            self.lookup_timeout = Duration::from_millis(ms);
        }
        self
    }
}

fn millis_var(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<Duration>> {
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let ms: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("parse {name}={raw:?} as milliseconds"))?;
    Ok(Some(Duration::from_millis(ms)))
}
