//! Runtime settings.
//!
//! Sources, lowest precedence first: built-in defaults, an optional
//! `bansos.toml` in the working directory, then `BANSOS__SECTION__KEY`
//! environment variables. A `.env` file is loaded into the environment
//! before anything else.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub storage: StorageSettings,
    pub report: ReportSettings,
    pub export: ExportSettings,
    pub auth: AuthSettings,
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Largest accepted JSON body, in bytes.
    pub json_limit: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            json_limit: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("bansos.sqlite"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding uploaded photos, error workbooks and exports.
    pub root: PathBuf,
    /// Prefix of the URLs handed out for stored files.
    pub public_prefix: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("uploads"),
            public_prefix: "image".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub fonts_dir: PathBuf,
    pub font_family: String,
    pub rows_per_file: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            fonts_dir: PathBuf::from("fonts"),
            font_family: "LiberationSans".to_string(),
            rows_per_file: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Seconds an exported file stays downloadable.
    pub ttl_secs: u64,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self { ttl_secs: 30 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me".to_string(),
            token_ttl_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct LogLevel(pub String);

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel("info".to_string())
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new(".env").exists() {
            if let Err(e) = dotenvy::dotenv() {
                log::warn!("Ignoring unreadable .env file: {e}");
            }
        }

        let mut builder = Config::builder();
        if Path::new("bansos.toml").exists() {
            builder = builder.add_source(File::with_name("bansos"));
        }
        builder = builder.add_source(
            Environment::with_prefix("BANSOS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
