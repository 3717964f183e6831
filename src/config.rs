//! Configuration of a [`DbConnection`](`crate::adaptor::DbConnection`)
//!
//! The configuration is usually read from a TOML file. Every field is
//! optional, missing fields use their default value.
//!
//! ```toml
//! path = "annotation.sqlite"   # omitted: in-memory database
//! atomic_writes = true         # run store/remove in one transaction
//! edits_enabled = true         # apply RNA edits to fetched transcripts
//! genetic_code = "standard"    # name or amino acid table
//! apply_patches = true         # upgrade the schema of existing databases
//! ```
//!
//! ```rust
//! use txdb::config::DbConfig;
//!
//! let config = DbConfig::from_toml_str("atomic_writes = false").unwrap();
//! assert!(!config.atomic_writes);
//! assert!(config.edits_enabled);
//! assert!(config.path.is_none());
//! ```
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::GeneticCode;
use crate::utils::errors::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// SQLite database file, `None` for an in-memory database
    pub path: Option<PathBuf>,
    /// Run every multi-table write inside one transaction
    pub atomic_writes: bool,
    /// Default for [`Transcript::edits_enabled`](`crate::models::Transcript::edits_enabled`) of fetched transcripts
    pub edits_enabled: bool,
    /// Genetic code used for translations, see [`GeneticCode::guess`]
    pub genetic_code: String,
    /// Apply pending schema patches when opening an existing database
    pub apply_patches: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        DbConfig {
            path: None,
            atomic_writes: true,
            edits_enabled: true,
            genetic_code: "standard".to_string(),
            apply_patches: true,
        }
    }
}

impl DbConfig {
    /// Returns the default configuration for a database file
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        DbConfig {
            path: Some(path.as_ref().to_path_buf()),
            ..Default::default()
        }
    }

    /// Parses the configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: DbConfig = toml::from_str(content)?;
        config.genetic_code()?;
        Ok(config)
    }

    /// Reads the configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Returns the configured genetic code
    pub fn genetic_code(&self) -> Result<GeneticCode, ConfigError> {
        Ok(GeneticCode::guess(&self.genetic_code)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = DbConfig::from_toml_str("").unwrap();
        assert_eq!(config, DbConfig::default());
        assert_eq!(config.genetic_code().unwrap(), GeneticCode::default());
    }

    #[test]
    fn test_full_config() {
        let config = DbConfig::from_toml_str(
            r#"
            path = "/tmp/annotation.sqlite"
            atomic_writes = false
            edits_enabled = false
            genetic_code = "vertebrate mitochondrial"
            apply_patches = false
            "#,
        )
        .unwrap();
        assert_eq!(config.path, Some(PathBuf::from("/tmp/annotation.sqlite")));
        assert!(!config.atomic_writes);
        assert!(!config.edits_enabled);
        assert!(!config.apply_patches);
        assert_eq!(
            config.genetic_code().unwrap(),
            GeneticCode::vertebrate_mitochondrial()
        );
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            DbConfig::from_toml_str("atomic_writes = 3"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            DbConfig::from_toml_str("genetic_code = \"klingon\""),
            Err(ConfigError::GeneticCode(_))
        ));
    }

    #[test]
    fn test_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "edits_enabled = false").unwrap();
        let config = DbConfig::from_file(file.path()).unwrap();
        assert!(!config.edits_enabled);

        assert!(matches!(
            DbConfig::from_file("/this/file/does/not/exist.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
