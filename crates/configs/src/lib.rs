//! murmur/crates/configs/src/lib.rs
//!
//! Layered runtime configuration: built-in defaults, an optional
//! `murmur.toml`, then `MURMUR__*` environment variables (loaded through
//! dotenv first). Feature-specific sections only exist when the matching
//! adapter feature is compiled in.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Emit JSON log lines instead of the human-readable format.
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventsConfig {
    /// Broadcast channel capacity; slow subscribers past this lag drop
    /// events rather than backpressuring the pipeline.
    pub capacity: usize,
}

#[cfg(feature = "db-postgres")]
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: secrecy::SecretString,
}

#[cfg(feature = "media-local")]
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    pub root: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub log: LogConfig,
    pub events: EventsConfig,
    #[cfg(feature = "db-postgres")]
    pub database: DatabaseConfig,
    #[cfg(feature = "media-local")]
    pub media: MediaConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("log.json", false)?
            .set_default("events.capacity", 256)?;

        #[cfg(feature = "media-local")]
        {
            builder = builder.set_default("media.root", "./data/blobs")?;
        }

        let settings = builder
            .add_source(config::File::with_name("murmur").required(false))
            .add_source(config::Environment::with_prefix("MURMUR").separator("__"))
            .build()?;

        let cfg: AppConfig = settings.try_deserialize()?;
        tracing::debug!(host = %cfg.server.host, port = cfg.server.port, "configuration loaded");
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // one test so the env mutation cannot race a parallel defaults check
    #[test]
    fn defaults_apply_and_environment_overrides() {
        let cfg = AppConfig::load().expect("defaults should load");
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 3000);
        assert!(!cfg.log.json);
        assert_eq!(cfg.events.capacity, 256);

        std::env::set_var("MURMUR__SERVER__PORT", "8088");
        let cfg = AppConfig::load().expect("env override should load");
        assert_eq!(cfg.server.port, 8088);
        std::env::remove_var("MURMUR__SERVER__PORT");
    }
}
