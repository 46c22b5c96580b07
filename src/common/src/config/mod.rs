use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

pub const DEFAULT_CONFIG_FILE: &str = "dashkit.toml";
pub const ENV_PREFIX: &str = "DASHKIT__";

/// How the table projector treats series whose columns differ from the
/// header built from the first series.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchemaPolicy {
    /// Reject the response with an inconsistent-schema error
    #[default]
    Strict,
    /// Align cells by name, filling missing ones with null
    Pad,
}

impl fmt::Display for SchemaPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaPolicy::Strict => write!(f, "strict"),
            SchemaPolicy::Pad => write!(f, "pad"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct TableConfig {
    pub schema_policy: SchemaPolicy,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter used when neither RUST_LOG nor a verbosity flag is given
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Configuration {
    /// Table rendering options
    pub table: TableConfig,
    /// Logging defaults
    pub log: LogConfig,
}

impl Configuration {
    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Configuration::default()))
    }

    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config = Self::figment()
            .merge(Toml::file(DEFAULT_CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, Box<figment::Error>> {
        let config = Self::figment()
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }
}
