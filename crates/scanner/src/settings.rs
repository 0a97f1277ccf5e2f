//! Settings — scanner configuration.

use serde::{Deserialize, Serialize};

/// How the scanner treats lines that arrive while no match is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStartPolicy {
    /// Only an init marker opens a match; stray lines are ignored.
    #[default]
    Explicit,
    /// Any stray line opens a match. The trigger line itself is consumed
    /// and not interpreted, so noise after a shutdown can yield an empty
    /// trailing match.
    Implicit,
}

/// Scanner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerSettings {
    /// Path to the server log snapshot. No default; must be configured.
    pub log_path: String,

    /// Start policy for headless lines.
    pub match_start: MatchStartPolicy,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            log_path: String::new(),
            match_start: MatchStartPolicy::default(),
        }
    }
}

impl ScannerSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.log_path.trim().is_empty() {
            return Err("log_path must not be empty".to_string());
        }
        Ok(())
    }
}
