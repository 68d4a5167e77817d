mod types;

pub use types::*;

use crate::{Error, Result};
use std::env;
use std::path::Path;
use tracing::warn;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

pub async fn load() -> Result<Config> {
    let explicit_path = env::var("CONFIG_PATH").ok();
    let config_path = explicit_path
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let mut config = if Path::new(&config_path).exists() {
        let config_str = tokio::fs::read_to_string(&config_path).await?;
        parse(&config_str)?
    } else if explicit_path.is_some() {
        return Err(Error::config(format!(
            "configuration file not found: {}",
            config_path
        )));
    } else {
        Config::default()
    };

    config.apply_env_overrides(|key| env::var(key).ok())?;

    Ok(config)
}

pub fn parse(config_str: &str) -> Result<Config> {
    // An empty document deserializes to unit, not to an all-defaults mapping.
    if config_str.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(config_str)?)
}

impl Config {
    /// Applies `OPENAI_API_KEY`, `PORT` and `QUESTIONS_PATH` on top of the
    /// parsed file. `lookup` is injected so tests don't touch the process env.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_key) = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.llm.api_key = Some(api_key);
        }

        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| Error::config(format!("invalid PORT value: '{}'", port)))?;
        }

        if let Some(path) = lookup("QUESTIONS_PATH") {
            self.questions.path = path;
        }

        Ok(())
    }

    /// Reports settings that degrade the service. Runs after the tracing
    /// subscriber is installed, since `load` happens before logging exists.
    pub fn log_warnings(&self) {
        if self.llm.api_key.is_none() {
            warn!("No OpenAI API key configured; AI feedback endpoints will report an error");
        }
    }
}
