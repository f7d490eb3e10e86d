use crate::config::CalculatorConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "config/Config.toml";
const ENV_PREFIX: &str = "LOT_SIZER_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads the calculator configuration by layering built-in defaults,
    /// `config/Config.toml` and `LOT_SIZER_` environment variables.
    ///
    /// Nested keys use a double underscore, e.g. `LOT_SIZER_ACCOUNT__CAPITAL`.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration source exists but cannot be parsed.
    pub fn load() -> Result<CalculatorConfig> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Same as [`ConfigLoader::load`] but reads the TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration source exists but cannot be parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<CalculatorConfig> {
        let config: CalculatorConfig = Self::base(path.as_ref())
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        tracing::debug!(?config, "Loaded calculator config");
        Ok(config)
    }

    /// Loads configuration with `config/Config.{profile}.toml` layered on top.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration source exists but cannot be parsed.
    pub fn load_with_profile(profile: &str) -> Result<CalculatorConfig> {
        let config: CalculatorConfig = Self::base(Path::new(DEFAULT_CONFIG_PATH))
            .merge(Toml::file(format!("config/Config.{profile}.toml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        tracing::debug!(profile, ?config, "Loaded calculator config");
        Ok(config)
    }

    fn base(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(CalculatorConfig::default())).merge(Toml::file(path))
    }
}
