//! Layered configuration loading.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    Result,
    naming::{PrefixRule, PrefixRules},
};

/// Wrapper for service configuration.
///
/// Automatically loads configuration from:
/// 1. `config/default.toml`
/// 2. `config/{env}.toml` (where {env} is RUN_MODE, defaults to "development")
/// 3. `config/local.toml`
/// 4. Environment variables (prefixed with APP_, nested keys split on `__`)
/// 5. `.env` file, read into the environment first
pub struct EywaConfig;

impl EywaConfig {
    /// Load configuration into a struct that implements `Deserialize`.
    pub fn load<T>() -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        Self::load_from(Path::new("config"))
    }

    /// Like [`EywaConfig::load`], reading the TOML files from `dir`.
    pub fn load_from<T>(dir: &Path) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        dotenvy::dotenv().ok();

        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        info!("Loading configuration for environment: {}", run_mode);

        let file = |name: &str| {
            File::new(&dir.join(name).to_string_lossy(), FileFormat::Toml).required(false)
        };

        let settings = Config::builder()
            .add_source(file("default"))
            .add_source(file(&run_mode))
            .add_source(file("local"))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Route-engine settings, usually nested under an `autoroute` table.
///
/// ```toml
/// [autoroute]
/// base_path = "/api"
/// bind_address = "127.0.0.1:3000"
/// prefixes = [{ prefix = "Fetch", method = "GET" }]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoRouteSettings {
    pub base_path: String,
    /// Address used by [`EywaApp::run`](crate::EywaApp::run).
    pub bind_address: String,
    /// Extra prefix rules.
    pub prefixes: Vec<PrefixRule>,
    /// Replace the default prefix table instead of appending to it.
    pub replace_prefixes: bool,
    /// Serve the Scalar UI and OpenAPI JSON.
    pub docs: bool,
    /// Where to write the OpenAPI YAML document, if anywhere.
    pub openapi_yaml: Option<PathBuf>,
}

impl Default for AutoRouteSettings {
    fn default() -> Self {
        Self {
            base_path: "/".to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            prefixes: Vec::new(),
            replace_prefixes: false,
            docs: false,
            openapi_yaml: None,
        }
    }
}

impl AutoRouteSettings {
    /// The effective prefix table.
    pub fn prefix_rules(&self) -> PrefixRules {
        if self.replace_prefixes {
            return PrefixRules::new(self.prefixes.iter().cloned());
        }
        let mut rules = PrefixRules::default();
        rules.append(self.prefixes.iter().cloned());
        rules
    }
}
