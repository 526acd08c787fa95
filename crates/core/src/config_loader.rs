use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

const CONFIG_FILE: &str = "config/Config.toml";
const ENV_PREFIX: &str = "TRADE_MOOD_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads application configuration by layering defaults, TOML and environment variables.
    ///
    /// A missing `config/Config.toml` is not an error; every field has a default.
    ///
    /// # Errors
    ///
    /// Returns an error if a present configuration source cannot be parsed.
    pub fn load() -> Result<AppConfig> {
        let config: AppConfig = Self::base().merge(Self::env()).extract()?;
        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Loads application configuration with a specific profile overlay.
    ///
    /// # Errors
    ///
    /// Returns an error if a present configuration source cannot be parsed.
    pub fn load_with_profile(profile: &str) -> Result<AppConfig> {
        let config: AppConfig = Self::base()
            .merge(Toml::file(format!("config/Config.{profile}.toml")))
            .merge(Self::env())
            .extract()?;
        tracing::debug!(profile, ?config, "configuration loaded");
        Ok(config)
    }

    fn base() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::file(CONFIG_FILE))
    }

    fn env() -> Env {
        Env::prefixed(ENV_PREFIX).split("__")
    }
}
