use serde::{Deserialize, Serialize};
use config::{Config, ConfigError, File};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::tiers::{TierBand, TierTable};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub app: AppSettings,
    pub catalog: CatalogSettings,
    pub tiers: TierSettings,
    pub export: ExportSettings,
    pub tui: TuiSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub version: String,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// File path or `http(s)://` URL of the catalog CSV.
    pub source: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierSettings {
    /// Highest band first.
    pub bands: Vec<TierBand>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    pub output_dir: String,
    pub ratings_file: String,
    pub statistics_prefix: String,
    pub site_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuiSettings {
    pub tick_rate_ms: u64,
}

impl ExportSettings {
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        Path::new(&self.output_dir).join(file_name)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: "Board Game Tracker".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                log_level: "info".to_string(),
            },
            catalog: CatalogSettings {
                source: "selected_boardgames_2023.csv".to_string(),
                timeout_seconds: 30,
            },
            tiers: TierSettings {
                bands: TierTable::default_bands(),
            },
            export: ExportSettings {
                output_dir: ".".to_string(),
                ratings_file: "played_boardgames.csv".to_string(),
                statistics_prefix: "boardgame_statistics".to_string(),
                site_base_url: "https://boardgamegeek.com".to_string(),
            },
            tui: TuiSettings {
                tick_rate_ms: 250,
            },
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("BOARDGAME_TRACKER")
                    .separator("__"),
            )
            .build()?;

        s.try_deserialize()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::from(path.as_ref()))
            .build()?;

        s.try_deserialize()
    }

    pub fn tier_table(&self) -> crate::Result<TierTable> {
        TierTable::new(self.tiers.bands.clone())
    }

    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog.timeout_seconds)
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.export.path_for(file_name)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.tier_table().map_err(|e| e.to_string())?;

        if self.app.log_level.parse::<tracing::Level>().is_err() {
            return Err(format!("Unknown log level: {}", self.app.log_level));
        }

        if self.tui.tick_rate_ms == 0 {
            return Err("TUI tick rate must be positive".to_string());
        }

        if self.catalog.source.trim().is_empty() {
            return Err("Catalog source must not be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.tier_table().unwrap().len(), 16);
    }

    #[test]
    fn test_output_path_uses_export_dir() {
        let mut settings = Settings::default();
        settings.export.output_dir = "exports".to_string();
        assert_eq!(
            settings.output_path("played_boardgames.csv"),
            PathBuf::from("exports").join("played_boardgames.csv")
        );
    }

    #[test]
    fn test_invalid_bands_fail_validation() {
        let mut settings = Settings::default();
        settings.tiers.bands = vec![
            TierBand::new("a", "A", 5.0, 10.0),
            TierBand::new("b", "B", 4.0, 6.0),
        ];
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_unknown_log_level_fails_validation() {
        let mut settings = Settings::default();
        settings.app.log_level = "chatty".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_from_file_overrides_bands() {
        let path = std::env::temp_dir().join(format!("bgt_settings_{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
[catalog]
source = "games.csv"

[[tiers.bands]]
key = "good"
label = "Good"
min = 5.0
max = 10.0

[[tiers.bands]]
key = "bad"
label = "Bad"
min = 0.0
max = 4.9
"#,
        )
        .unwrap();

        let settings = Settings::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(settings.catalog.source, "games.csv");
        assert_eq!(settings.catalog.timeout_seconds, 30);
        let table = settings.tier_table().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.band_for(7.3).unwrap().key, "good");
    }
}
