use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// CLI configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CliConfig {
    /// Log filter used when `RUST_LOG` is not set (e.g. "info", "event_models=debug")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Pretty-print JSON output
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            pretty: default_pretty(),
        }
    }
}

impl CliConfig {
    /// Load the YAML config at `path`, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = fs::read_to_string(path).map_err(|e| {
            CliError::InvalidConfig(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let config: CliConfig = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Install the global tracing subscriber; `RUST_LOG` overrides `log_level`
    pub fn init_logging(&self) -> CliResult<()> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.log_level))
            .map_err(|e| CliError::InvalidConfig(format!("Invalid log level: {}", e)))?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| CliError::Logging(e.to_string()))
    }

    /// Render a value as JSON honoring `pretty`
    pub fn render<T: Serialize>(&self, value: &T) -> CliResult<String> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(rendered)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_pretty() -> bool {
    true
}
