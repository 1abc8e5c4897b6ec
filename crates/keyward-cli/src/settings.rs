//! Server configuration.
//!
//! Layered lowest to highest: built-in defaults, `keyward.yaml` (or the file
//! given with `--config`), `KEYWARD_*` environment variables, command-line
//! flags. Nested keys use a double underscore, e.g. `KEYWARD_TRACING__FORMAT`.

use config::{Config, ConfigError, Environment, File};
use keyward_db::DEFAULT_MAX_CONNECTIONS;
use keyward_trace::TracingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::commands::ServeArgs;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub in_memory: bool,
    pub tracing: TracingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            in_memory: false,
            tracing: TracingConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name("keyward").required(false),
        };

        Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("KEYWARD").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Apply command-line overrides.
    pub fn with_args(mut self, args: ServeArgs) -> Self {
        if let Some(bind) = args.bind {
            self.bind = bind;
        }
        if args.database_url.is_some() {
            self.database_url = args.database_url;
        }
        if let Some(max_connections) = args.max_connections {
            self.max_connections = max_connections;
        }
        self.in_memory |= args.in_memory;
        self
    }
}
