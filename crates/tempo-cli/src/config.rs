//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use tempo_core::WeekStart;

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// First day of the week for weekly periods.
    #[serde(default)]
    pub week_start: WeekStart,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("week_start", &self.week_start)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("tempo.db"),
            week_start: WeekStart::default(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Later sources win: defaults, the user config file, `config_path`,
    /// then `TEMPO_*` environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("TEMPO_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for tempo.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tempo"))
}

/// Returns the platform-specific data directory for tempo.
///
/// On Linux: `~/.local/share/tempo`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("tempo"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use figment::Jail;

    #[test]
    fn default_config_uses_data_dir_for_db() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("tempo.db"));
        assert_eq!(config.week_start, WeekStart::Monday);
    }

    #[test]
    fn config_file_then_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
                    database_path = "/tmp/from-file.db"
                    week_start = "sunday"
                "#,
            )?;
            let config = Config::load_from(Some(Path::new("custom.toml")))?;
            assert_eq!(config.database_path, PathBuf::from("/tmp/from-file.db"));
            assert_eq!(config.week_start, WeekStart::Sunday);

            jail.set_env("TEMPO_DATABASE_PATH", "/tmp/from-env.db");
            let config = Config::load_from(Some(Path::new("custom.toml")))?;
            assert_eq!(config.database_path, PathBuf::from("/tmp/from-env.db"));
            assert_eq!(config.week_start, WeekStart::Sunday);
            Ok(())
        });
    }

    #[test]
    fn invalid_week_start_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("TEMPO_WEEK_START", "friday");
            assert!(Config::load_from(None).is_err());
            Ok(())
        });
    }
}
