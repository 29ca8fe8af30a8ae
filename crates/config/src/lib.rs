//! Manages application configuration by loading settings from standard locations.
//!
//! This crate provides a unified configuration object (`Config`) that aggregates
//! settings from files and environment variables, making them accessible
//! globally via a lazily initialized static reference (`CONFIG`).

use std::path::PathBuf;
use std::sync::LazyLock;

use etcetera::BaseStrategy;
use figment::providers::{Env, Format, Toml};
use figment::{Figment, Metadata, Provider};
use serde::{Deserialize, Deserializer, Serialize};

/// The default configuration values
const DEFAULT_TOML_CONFIG: &str = include_str!("./dist-meta.default.toml");

/// The prefix of environment variables overriding configuration keys.
pub const ENV_PREFIX: &str = "DIST_META_";

//================================================================================================
// Statics
//================================================================================================

/// Provides a lazily instantiated static reference to the application `Config`.
///
/// This static variable ensures that configuration is parsed only once from
/// canonical locations and then made immutably available throughout the
/// application's lifecycle.
pub static CONFIG: LazyLock<Config> = LazyLock::new(load_config);

//================================================================================================
// Types
//================================================================================================

/// Represents the application's primary configuration structure.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Whether parse results are memoized for the lifetime of the process.
    ///
    /// Accepts booleans as well as the integers `0` and `1`, so that
    /// `DIST_META_CACHE=0` disables caching.
    #[serde(default = "enabled", deserialize_with = "toggle")]
    pub cache: bool,
    /// Directories searched for installed distributions, in order.
    ///
    /// Accepts a list, or a single string in the platform's `PATH` format so
    /// that `DIST_META_PATHS=/a:/b` works.
    #[serde(default, deserialize_with = "path_list")]
    pub paths: Vec<PathBuf>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Toggle {
    Bool(bool),
    Int(i64),
    Str(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PathList {
    Many(Vec<PathBuf>),
    Joined(String),
}

//================================================================================================
// Impls
//================================================================================================

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: true,
            paths: Vec::new(),
        }
    }
}

impl Config {
    /// Constructs a `Figment` instance for configuration loading.
    ///
    /// This method builds a configuration provider by layering default settings,
    /// user-specific configuration files, and environment variables.
    pub fn figment() -> Figment {
        let mut fig = Figment::from(Config::default()).merge(Toml::string(DEFAULT_TOML_CONFIG));

        if let Ok(c) = etcetera::choose_base_strategy() {
            let config = c.config_dir().join("dist-meta.toml");
            fig = fig.admerge(Toml::file(config));
        }

        fig.admerge(Env::prefixed(ENV_PREFIX))
    }

    /// Creates a `Config` instance from a given provider.
    pub fn from<T: Provider>(provider: T) -> Result<Config, Box<figment::Error>> {
        Figment::from(provider).extract().map_err(Box::new)
    }
}

impl Provider for Config {
    fn metadata(&self) -> figment::Metadata {
        Metadata::named("dist-meta Config")
    }

    fn data(
        &self,
    ) -> Result<figment::value::Map<figment::Profile, figment::value::Dict>, figment::Error> {
        figment::providers::Serialized::defaults(self).data()
    }
}

//================================================================================================
// Functions
//================================================================================================

fn enabled() -> bool {
    true
}

fn toggle<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Toggle::deserialize(deserializer)? {
        Toggle::Bool(b) => Ok(b),
        Toggle::Int(i) => Ok(i != 0),
        Toggle::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(D::Error::custom(format!("invalid cache toggle: {other:?}"))),
        },
    }
}

fn path_list<'de, D>(deserializer: D) -> Result<Vec<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match PathList::deserialize(deserializer)? {
        PathList::Many(paths) => paths,
        PathList::Joined(joined) => std::env::split_paths(&joined)
            .filter(|p| !p.as_os_str().is_empty())
            .collect(),
    })
}

/// Loads the application configuration using the default `Figment` provider.
///
/// This function is used to initialize the `CONFIG` static variable.
fn load_config() -> Config {
    Config::figment().extract().unwrap_or_else(|e| {
        tracing::error!(error = %e, "problem loading config from default sources, falling back to defaults");
        Config::default()
    })
}
