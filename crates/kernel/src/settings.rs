use std::path::PathBuf;

use anyhow::{anyhow, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "CATALOG_ENV";
const CONFIG_DIR_ENV: &str = "CATALOG_CONFIG_DIR";
const ENV_PREFIX: &str = "CATALOG";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub reviews: ReviewSettings,
    #[serde(default)]
    pub validation: ValidationSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, environment overlay and
    /// `CATALOG_*` variables.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .context("unable to resolve current directory")?
                .join("config"),
        };

        let mut settings = Self::from_dir(&config_dir, &environment)?;
        settings.environment = environment.parse()?;
        Ok(settings)
    }

    /// Build settings from `base.toml` and `{environment}.toml` in `config_dir`,
    /// with environment variables layered on top.
    pub fn from_dir(config_dir: &std::path::Path, environment: &str) -> anyhow::Result<Self> {
        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        cfg.try_deserialize()
            .with_context(|| "failed to deserialize configuration")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    /// No deadline is applied to requests unless this is set.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        5000
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "DatabaseSettings::default_sqlite_path")]
    pub sqlite_path: PathBuf,
    #[serde(default = "DatabaseSettings::default_bootstrap_schema")]
    pub bootstrap_schema: bool,
}

impl DatabaseSettings {
    fn default_sqlite_path() -> PathBuf {
        PathBuf::from("db/books.db")
    }

    fn default_bootstrap_schema() -> bool {
        true
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            sqlite_path: Self::default_sqlite_path(),
            bootstrap_schema: Self::default_bootstrap_schema(),
        }
    }
}

/// Where reviews are persisted.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReviewBackend {
    /// `Reviews` table next to `Books`, joined for titles.
    #[default]
    Sqlite,
    /// Free-form documents in a MongoDB collection.
    Mongo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewSettings {
    #[serde(default)]
    pub backend: ReviewBackend,
    #[serde(default = "ReviewSettings::default_mongo_uri")]
    pub mongo_uri: String,
    #[serde(default = "ReviewSettings::default_mongo_database")]
    pub mongo_database: String,
    #[serde(default = "ReviewSettings::default_mongo_collection")]
    pub mongo_collection: String,
}

impl ReviewSettings {
    fn default_mongo_uri() -> String {
        "mongodb://127.0.0.1:27017".to_string()
    }

    fn default_mongo_database() -> String {
        "catalog".to_string()
    }

    fn default_mongo_collection() -> String {
        "reviews".to_string()
    }
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            backend: ReviewBackend::default(),
            mongo_uri: Self::default_mongo_uri(),
            mongo_database: Self::default_mongo_database(),
            mongo_collection: Self::default_mongo_collection(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidationSettings {
    /// Treat `0` in numeric required fields (`rating`, `publication_year`) as
    /// absent.
    #[serde(default = "ValidationSettings::default_zero_is_missing")]
    pub zero_is_missing: bool,
}

impl ValidationSettings {
    fn default_zero_is_missing() -> bool {
        true
    }
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            zero_is_missing: Self::default_zero_is_missing(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    /// Fallback filter directive when `RUST_LOG` is unset.
    #[serde(default = "TelemetrySettings::default_filter")]
    pub filter: String,
}

impl TelemetrySettings {
    fn default_filter() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            filter: Self::default_filter(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_environment_is_local() {
        let settings = Settings::default();
        assert_eq!(settings.environment, Environment::Local);
    }

    #[test]
    fn default_review_backend_is_sqlite() {
        let settings = Settings::default();
        assert_eq!(settings.reviews.backend, ReviewBackend::Sqlite);
        assert_eq!(settings.database.sqlite_path, PathBuf::from("db/books.db"));
    }

    #[test]
    fn zero_is_missing_by_default() {
        assert!(Settings::default().validation.zero_is_missing);
    }

    #[test]
    fn unknown_environment_is_rejected() {
        assert!("qa".parse::<Environment>().is_err());
        assert_eq!(
            "production".parse::<Environment>().unwrap(),
            Environment::Production
        );
    }

    #[test]
    fn base_file_overrides_defaults() {
        let dir = std::env::temp_dir().join(format!("catalog-settings-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("base.toml"),
            r#"
            [server]
            port = 8081

            [reviews]
            backend = "mongo"
            mongo_database = "bookshop"

            [validation]
            zero_is_missing = false
            "#,
        )
        .unwrap();

        let settings = Settings::from_dir(&dir, "local").unwrap();
        assert_eq!(settings.server.port, 8081);
        assert_eq!(settings.reviews.backend, ReviewBackend::Mongo);
        assert_eq!(settings.reviews.mongo_database, "bookshop");
        assert_eq!(settings.reviews.mongo_collection, "reviews");
        assert!(!settings.validation.zero_is_missing);

        std::fs::remove_dir_all(&dir).ok();
    }
}
