//! Configuration for scripted filters.

use serde::{Deserialize, Serialize};

/// Where a filter script comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Inline Rhai script (mutually exclusive with script_file).
    #[serde(default)]
    pub script: Option<String>,

    /// Path to a local Rhai script file.
    #[serde(default)]
    pub script_file: Option<String>,
}

impl FilterConfig {
    /// Creates a config with an inline script.
    pub fn with_script(script: impl Into<String>) -> Self {
        Self {
            script: Some(script.into()),
            script_file: None,
        }
    }

    /// Creates a config with a script file path.
    pub fn with_script_file(path: impl Into<String>) -> Self {
        Self {
            script: None,
            script_file: Some(path.into()),
        }
    }

    /// Returns true if neither an inline script nor a file is set.
    pub fn is_empty(&self) -> bool {
        self.script.is_none() && self.script_file.is_none()
    }

    /// Checks that at most one script source is set.
    pub fn validate(&self) -> Result<(), String> {
        if self.script.is_some() && self.script_file.is_some() {
            return Err("script and script_file are mutually exclusive".to_string());
        }
        Ok(())
    }
}
