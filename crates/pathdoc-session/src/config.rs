use serde::{Deserialize, Serialize};

use crate::error::SessionResult;

/// How stored text that does not decode under its type tag is handled on load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePolicy {
    /// Substitute a typed empty value (`0`, `[]`, `{}`) and log a warning.
    #[default]
    Lenient,
    /// Fail the load.
    Strict,
}

/// What `load` does when the session still holds unsaved changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardPolicy {
    /// Drop the pending changes and report them in the load outcome.
    #[default]
    Warn,
    /// Refuse to load and leave the session untouched.
    Reject,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub decode_policy: DecodePolicy,
    pub on_pending_discard: DiscardPolicy,
}

impl SessionConfig {
    /// Parse a config from TOML. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> SessionResult<Self> {
        Ok(toml::from_str(text)?)
    }
}
