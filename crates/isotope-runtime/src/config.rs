#![forbid(unsafe_code)]

//! State cell configuration.
//!
//! # Environment
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `ISOTOPE_COUNT_MUTATIONS` | `0`/`false` disables counter bumps along changed chains |
//! | `ISOTOPE_REFRESH` | `deferred` (default) or `immediate` |
//! | `ISOTOPE_CHANGE_LOG` | `-`/`stdout` or a file path; enables the JSONL change log there |
//! | `ISOTOPE_CHANGE_LOG_FLUSH` | `0`/`false` buffers change-log lines instead of flushing each |

use crate::change_log::{ChangeLogConfig, ChangeLogDestination};
use crate::refresh::RefreshMode;

/// Configuration for a [`StateCell`](crate::StateCell).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateConfig {
    /// Bump the mutation counter of every node along a changed chain.
    pub count_mutations: bool,
    pub refresh: RefreshMode,
    pub change_log: ChangeLogConfig,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            count_mutations: true,
            refresh: RefreshMode::Deferred,
            change_log: ChangeLogConfig::default(),
        }
    }
}

impl StateConfig {
    /// Defaults overridden by `ISOTOPE_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(v) = lookup("ISOTOPE_COUNT_MUTATIONS") {
            config.count_mutations = !is_off(&v);
        }
        if let Some(raw) = lookup("ISOTOPE_REFRESH") {
            match RefreshMode::parse(&raw) {
                Some(mode) => config.refresh = mode,
                None => tracing::warn!(value = %raw, "unknown ISOTOPE_REFRESH, keeping default"),
            }
        }
        if let Some(destination) = lookup("ISOTOPE_CHANGE_LOG")
            .as_deref()
            .and_then(ChangeLogDestination::parse)
        {
            config.change_log = ChangeLogConfig::writing_to(destination);
        }
        if let Some(v) = lookup("ISOTOPE_CHANGE_LOG_FLUSH") {
            config.change_log = config.change_log.with_flush_on_write(!is_off(&v));
        }
        config
    }

    #[must_use]
    pub fn with_count_mutations(mut self, enabled: bool) -> Self {
        self.count_mutations = enabled;
        self
    }

    #[must_use]
    pub fn with_refresh(mut self, mode: RefreshMode) -> Self {
        self.refresh = mode;
        self
    }

    #[must_use]
    pub fn with_change_log(mut self, change_log: ChangeLogConfig) -> Self {
        self.change_log = change_log;
        self
    }
}

fn is_off(v: &str) -> bool {
    matches!(v.trim(), "0" | "false" | "FALSE")
}
