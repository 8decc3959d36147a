use std::{env, fmt, fs, path};

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read config file")]
    ReadFailed,
    #[error("failed to write config file")]
    WriteFailed,
    #[error("failed to parse config file")]
    ParseFailed,
    #[error("no usable config directory")]
    ConfigPathUnavailable,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: Server,
    pub monitoring: Monitoring,
    pub storage: Storage,
    pub websites: Vec<WebsiteEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Monitoring {
    /// Seconds between check cycles.
    pub interval_seconds: u64,
    /// Per-probe request timeout in seconds.
    pub timeout_seconds: u64,
    /// Whether a slow cycle may keep running while the next one starts.
    pub overlap_ticks: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Storage {
    /// Path to the SQLite database file. Absent means the in-memory store.
    pub db_path: Option<path::PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebsiteEntry {
    pub name: String,
    pub url: String,
}

impl Default for Server {
    fn default() -> Self {
        Self { bind: "0.0.0.0".into(), port: 8080 }
    }
}

impl Default for Monitoring {
    fn default() -> Self {
        Self { interval_seconds: 60, timeout_seconds: 10, overlap_ticks: true }
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/sitewatch/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, Error> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(Error::ConfigPathUnavailable);
    };

    Ok(path.join("sitewatch/config.toml"))
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current Internal Configuration State:")?;
        writeln!(f, "  Server")?;
        writeln!(f, "    Bind Address: {}", self.server.bind)?;
        writeln!(f, "    Port: {}", self.server.port)?;
        writeln!(f, "  Monitoring")?;
        writeln!(f, "    Interval: {}s", self.monitoring.interval_seconds)?;
        writeln!(f, "    Timeout: {}s", self.monitoring.timeout_seconds)?;
        writeln!(f, "    Overlapping Ticks: {}", self.monitoring.overlap_ticks)?;
        writeln!(f, "  Storage")?;
        match &self.storage.db_path {
            Some(path) => writeln!(f, "    Database: {}", path.display())?,
            None => writeln!(f, "    Database: in-memory")?,
        }
        writeln!(f, "  Websites: {}", self.websites.len())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/sitewatch/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, Error> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path).map_err(|_err| Error::ReadFailed)?;
            toml::from_str(raw_string.as_str()).map_err(|_err| Error::ParseFailed)
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), Error> {
        let config_str: String =
            toml::to_string_pretty(self).map_err(|_err| Error::ParseFailed)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|_err| Error::WriteFailed)?;
        }

        fs::write(path, config_str).map_err(|_err| Error::WriteFailed)
    }
}
