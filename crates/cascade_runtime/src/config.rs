//! Runtime configuration files.
//!
//! A config file is a JSON object with optional `execution` and
//! `observability` sections and an optional `functions` directory:
//!
//! ```json
//! {
//!   "execution": { "command_limit": 10000, "fork_limit": 64 },
//!   "observability": { "enabled": true, "profiling": true },
//!   "functions": "data"
//! }
//! ```
//!
//! Missing fields take their defaults. Unknown top-level keys are rejected.

use std::fs;
use std::path::{Path, PathBuf};

use cascade_debug::ObservabilityConfig;
use cascade_engine::ExecutionConfig;
use cascade_foundation::{Error, ErrorContext, ErrorKind, Result};
use serde::{Deserialize, Serialize};

/// Settings for a [`Session`](crate::Session).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Limits applied to every run.
    pub execution: ExecutionConfig,
    /// Tracing and profiling switches.
    pub observability: ObservabilityConfig,
    /// Function directory loaded at startup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functions: Option<PathBuf>,
}

impl RuntimeConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Config`] if the text is not a valid config.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|err| Error::new(ErrorKind::Config(err.to_string())))
    }

    /// Reads a configuration file.
    ///
    /// A relative `functions` path is resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Io`] if the file cannot be read and
    /// [`ErrorKind::Config`] if it does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|err| {
            Error::new(ErrorKind::Io(format!("{}: {err}", path.display())))
                .with_context(ErrorContext::new().with_source(path.display().to_string()))
        })?;
        let mut config = Self::from_json(&text)
            .map_err(|err| err.with_context(ErrorContext::new().with_source(path.display().to_string())))?;
        if let (Some(functions), Some(parent)) = (&config.functions, path.parent()) {
            if functions.is_relative() {
                config.functions = Some(parent.join(functions));
            }
        }
        Ok(config)
    }

    /// Renders the configuration as pretty JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Builder method to replace the execution limits.
    #[must_use]
    pub fn with_execution(mut self, execution: ExecutionConfig) -> Self {
        self.execution = execution;
        self
    }

    /// Builder method to replace the observability switches.
    #[must_use]
    pub fn with_observability(mut self, observability: ObservabilityConfig) -> Self {
        self.observability = observability;
        self
    }

    /// Builder method to set the startup function directory.
    #[must_use]
    pub fn with_functions(mut self, path: impl Into<PathBuf>) -> Self {
        self.functions = Some(path.into());
        self
    }
}
