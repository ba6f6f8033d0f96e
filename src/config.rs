//! Debugger configuration.
//!
//! Hosts pass the same camelCase JSON shape they use for launch arguments;
//! every field is optional.

use crate::error::ConfigError;
use crate::render::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DebuggerConfig {
    /// Script loaded and run by `load_and_run`. Falls back to the first
    /// JavaScript file in the session.
    pub primary_script: Option<String>,
    /// Added to editor line numbers before they reach the engine.
    pub engine_line_offset: u32,
    pub max_render_depth: usize,
}

impl Default for DebuggerConfig {
    fn default() -> Self {
        Self {
            primary_script: None,
            engine_line_offset: 1,
            max_render_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DebuggerConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: DebuggerConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_render_depth == 0 {
            return Err(ConfigError::ZeroRenderDepth);
        }
        Ok(())
    }

    pub fn with_primary_script(mut self, filename: impl Into<String>) -> Self {
        self.primary_script = Some(filename.into());
        self
    }
}
