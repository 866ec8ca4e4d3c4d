use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{HeraldError, Result};

/// What a center does when an observer fails to handle an envelope
/// delivered inline (typically a decode error).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop delivering and return the error from `post`
    #[default]
    Propagate,
    /// Log the error and keep delivering to the remaining observers
    #[serde(alias = "log")]
    LogAndContinue,
}

impl FromStr for FailurePolicy {
    type Err = HeraldError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "propagate" => Ok(Self::Propagate),
            "log" | "log_and_continue" => Ok(Self::LogAndContinue),
            other => Err(HeraldError::Config(format!(
                "unknown failure policy `{other}`"
            ))),
        }
    }
}

/// Configuration of a [`NotificationCenter`](crate::NotificationCenter)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CenterConfig {
    /// Label attached to every log line the center emits
    pub label: String,
    pub failure_policy: FailurePolicy,
    /// Emit a warning when an envelope is posted on a name nobody observes
    pub warn_unobserved: bool,
}

impl Default for CenterConfig {
    fn default() -> Self {
        Self {
            label: std::env::var("HERALD_CENTER_LABEL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "default".to_string()),
            failure_policy: std::env::var("HERALD_FAILURE_POLICY")
                .ok()
                .and_then(|v| v.parse::<FailurePolicy>().ok())
                .unwrap_or_default(),
            warn_unobserved: std::env::var("HERALD_WARN_UNOBSERVED")
                .ok()
                .and_then(|v| v.parse::<bool>().ok())
                .unwrap_or(false),
        }
    }
}

impl CenterConfig {
    /// Load configuration from a TOML file (path via HERALD_CONFIG or ./herald.toml),
    /// overlaying values onto env-driven defaults.
    pub fn load() -> Self {
        let default = Self::default();
        let path = std::env::var("HERALD_CONFIG").unwrap_or_else(|_| "herald.toml".into());
        let p = Path::new(&path);
        if !p.exists() {
            tracing::info!(target = "herald", path = %path, "No TOML config found; using defaults/env");
            return default;
        }
        match Self::from_file(p) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(target = "herald", error = %e, "Failed to load TOML; using defaults");
                default
            }
        }
    }

    /// Reads and parses a TOML file, overlaying it onto the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    /// Parses a TOML document whose fields are all optional.
    ///
    /// ```
    /// use herald_core::{CenterConfig, FailurePolicy};
    ///
    /// let cfg = CenterConfig::from_toml_str(r#"failure_policy = "log""#).unwrap();
    /// assert_eq!(cfg.failure_policy, FailurePolicy::LogAndContinue);
    /// ```
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let t = toml::from_str::<CenterToml>(s).map_err(|e| HeraldError::Config(e.to_string()))?;
        Ok(t.overlay(Self::default()))
    }
}

// =========================
// TOML overlay definitions
// =========================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CenterToml {
    pub label: Option<String>,
    pub failure_policy: Option<FailurePolicy>,
    pub warn_unobserved: Option<bool>,
}

impl CenterToml {
    fn overlay(self, mut base: CenterConfig) -> CenterConfig {
        if let Some(v) = self.label {
            base.label = v;
        }
        if let Some(v) = self.failure_policy {
            base.failure_policy = v;
        }
        if let Some(v) = self.warn_unobserved {
            base.warn_unobserved = v;
        }
        base
    }
}
