use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Directory the config was loaded from; relative paths resolve against it
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_log_dir() -> String {
    "target/logs".to_string()
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/metafields.db"

[server]
port = 3000

[logging]
dir = "target/logs"
"#;

/// Load configuration from config.toml
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Current working directory (cargo run from the workspace root)
/// 3. Falls back to embedded default config
///
/// Called before tracing is initialised, so nothing is logged here; the
/// caller reports `base_dir` once logging is up.
pub fn load_config() -> anyhow::Result<Config> {
    let mut candidates = Vec::new();
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.push(exe_dir.to_path_buf());
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd);
    }

    for dir in candidates {
        let config_path = dir.join("config.toml");
        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let mut config = parse_config(&contents)?;
            config.base_dir = Some(dir);
            return Ok(config);
        }
    }

    parse_config(DEFAULT_CONFIG)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    Ok(config)
}

/// Get the database file path from configuration
pub fn get_database_path(config: &Config) -> PathBuf {
    resolve(config, &config.database.path)
}

/// Get the log directory from configuration
pub fn get_log_dir(config: &Config) -> PathBuf {
    resolve(config, &config.logging.dir)
}

fn resolve(config: &Config, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match &config.base_dir {
        Some(base) => base.join(path),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.database.path, "target/db/metafields.db");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.logging.dir, "target/logs");
        assert!(config.base_dir.is_none());
    }

    #[test]
    fn test_optional_sections_default() {
        let config = parse_config("[database]\npath = \"app.db\"\n").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.logging.dir, "target/logs");
    }

    #[test]
    fn test_relative_paths_resolve_against_base_dir() {
        let mut config = parse_config("[database]\npath = \"db/app.db\"\n").unwrap();
        assert_eq!(get_database_path(&config), PathBuf::from("db/app.db"));

        config.base_dir = Some(PathBuf::from("/opt/console"));
        assert_eq!(
            get_database_path(&config),
            PathBuf::from("/opt/console/db/app.db")
        );
        assert_eq!(
            get_log_dir(&config),
            PathBuf::from("/opt/console/target/logs")
        );
    }

    #[test]
    fn test_missing_database_section_fails() {
        assert!(parse_config("[server]\nport = 8080\n").is_err());
    }
}
