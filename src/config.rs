// ABOUTME: Run configuration built once at startup and passed to every component
// ABOUTME: Holds the connection profile, backup location, and run mode parsing

use anyhow::bail;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Fixed name of the schema artifact inside the backup directory.
pub const SCHEMA_FILE_NAME: &str = "schema.sql";

/// Extension carried by per-table data artifacts.
pub const TABLE_ARTIFACT_EXT: &str = "csv";

/// Run mode selected via the MODE environment variable (or --mode flag).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Backup,
    Restore,
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "backup" => Ok(Mode::Backup),
            "restore" => Ok(Mode::Restore),
            other => bail!("Invalid mode '{}'. Use 'backup' or 'restore'.", other),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Backup => write!(f, "backup"),
            Mode::Restore => write!(f, "restore"),
        }
    }
}

/// Connection profile plus backup location, immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct Config {
    pub user: String,
    pub password: String,
    pub database: String,
    pub host: String,
    pub port: u16,
    pub backup_dir: PathBuf,
}

impl Config {
    /// Path of the schema artifact inside the backup directory.
    pub fn schema_file(&self) -> PathBuf {
        self.backup_dir.join(SCHEMA_FILE_NAME)
    }

    /// Path of the data artifact for a given table.
    pub fn table_file(&self, table: &str) -> PathBuf {
        self.backup_dir
            .join(format!("{}.{}", table, TABLE_ARTIFACT_EXT))
    }

    /// Build a tokio-postgres configuration from the connection profile.
    ///
    /// Uses the builder API rather than a formatted connection string so
    /// credentials never need quoting or escaping.
    pub fn pg_config(&self) -> tokio_postgres::Config {
        let mut pg = tokio_postgres::Config::new();
        pg.host(&self.host)
            .port(self.port)
            .user(&self.user)
            .password(&self.password)
            .dbname(&self.database);
        pg
    }
}

/// Derive a table name from a data artifact path.
///
/// Returns `None` for files that do not carry the artifact extension. The
/// exporter and importer agree on a strict `<table>.csv` naming convention,
/// so the file stem is the table name.
pub fn table_name_from_artifact(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    if !ext.eq_ignore_ascii_case(TABLE_ARTIFACT_EXT) {
        return None;
    }
    path.file_stem()?.to_str().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            user: "postgres".to_string(),
            password: "secret".to_string(),
            database: "appdb".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            backup_dir: PathBuf::from("./backup"),
        }
    }

    #[test]
    fn mode_parses_recognized_values() {
        assert_eq!("backup".parse::<Mode>().unwrap(), Mode::Backup);
        assert_eq!("restore".parse::<Mode>().unwrap(), Mode::Restore);
    }

    #[test]
    fn mode_parsing_is_case_insensitive_and_trimmed() {
        assert_eq!("BACKUP".parse::<Mode>().unwrap(), Mode::Backup);
        assert_eq!("  Restore \n".parse::<Mode>().unwrap(), Mode::Restore);
    }

    #[test]
    fn mode_rejects_unrecognized_values() {
        assert!("banana".parse::<Mode>().is_err());
        assert!("".parse::<Mode>().is_err());
        assert!("backup restore".parse::<Mode>().is_err());
    }

    #[test]
    fn artifact_paths_follow_naming_convention() {
        let config = test_config();
        assert_eq!(config.schema_file(), PathBuf::from("./backup/schema.sql"));
        assert_eq!(config.table_file("users"), PathBuf::from("./backup/users.csv"));
    }

    #[test]
    fn table_name_derived_from_artifact_stem() {
        assert_eq!(
            table_name_from_artifact(Path::new("/b/users.csv")),
            Some("users".to_string())
        );
        assert_eq!(
            table_name_from_artifact(Path::new("orders.CSV")),
            Some("orders".to_string())
        );
        assert_eq!(table_name_from_artifact(Path::new("/b/schema.sql")), None);
        assert_eq!(table_name_from_artifact(Path::new("/b/noext")), None);
    }

    #[test]
    fn pg_config_carries_connection_profile() {
        let pg = test_config().pg_config();
        assert_eq!(pg.get_user(), Some("postgres"));
        assert_eq!(pg.get_dbname(), Some("appdb"));
        assert_eq!(pg.get_ports(), &[5432]);
    }
}
