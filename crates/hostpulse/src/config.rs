use std::time::Duration;
use std::{env, fmt, fs, path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::probe::ProbeConfig;
use crate::scheduler::SchedulerConfig;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config file")]
    ReadFailed,
    #[error("failed to write config file")]
    WriteFailed,
    #[error("failed to parse config file")]
    ParseFailed,
    #[error("no usable config path (set XDG_CONFIG_HOME or HOME)")]
    ConfigPathUnavailable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseSection,
    pub probe: ProbeSection,
    pub scheduler: SchedulerSection,
    pub server: ServerSection,
    pub auth: AuthSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSection {
    pub samples: u32,
    pub interval_ms: u64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSection {
    pub period_secs: u64,
    /// Absent means unbounded fan-out per run
    pub max_concurrent: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    pub sessions: Vec<Session>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseSection::default(),
            probe: ProbeSection::default(),
            scheduler: SchedulerSection::default(),
            server: ServerSection::default(),
            auth: AuthSection::default(),
        }
    }
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self { path: "hostpulse.db".into() }
    }
}

impl Default for ProbeSection {
    fn default() -> Self {
        Self { samples: 5, interval_ms: 200, timeout_secs: 5 }
    }
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self { period_secs: 3, max_concurrent: None }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { bind: "0.0.0.0".into(), port: 8080 }
    }
}

impl Config {
    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            samples: self.probe.samples,
            interval: Duration::from_millis(self.probe.interval_ms),
            timeout: Duration::from_secs(self.probe.timeout_secs),
        }
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            period: Duration::from_secs(self.scheduler.period_secs),
            probe_timeout: Duration::from_secs(self.probe.timeout_secs),
            max_concurrent: self.scheduler.max_concurrent,
        }
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

/// Get default config path ($XDG_CONFIG_HOME/hostpulse/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, Error> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(Error::ConfigPathUnavailable);
    };

    Ok(path.join("hostpulse/config.toml"))
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
            writeln!(f, "    {label}: {value}")
        };

        writeln!(f, "Current Internal Configuration State:")?;
        writeln!(f, "  Database")?;
        write_indented(f, "Path", &self.database.path)?;
        writeln!(f, "  Probe")?;
        write_indented(f, "Samples", &self.probe.samples)?;
        write_indented(f, "Interval (ms)", &self.probe.interval_ms)?;
        write_indented(f, "Timeout (s)", &self.probe.timeout_secs)?;
        writeln!(f, "  Scheduler")?;
        write_indented(f, "Period (s)", &self.scheduler.period_secs)?;
        match self.scheduler.max_concurrent {
            Some(bound) => write_indented(f, "Max Concurrent", &bound)?,
            None => write_indented(f, "Max Concurrent", &"unbounded")?,
        }
        writeln!(f, "  Server")?;
        write_indented(f, "Bind Address", &self.server.bind)?;
        write_indented(f, "Port", &self.server.port)?;
        writeln!(f, "  Auth")?;
        write_indented(f, "Sessions", &self.auth.sessions.len())?;

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/hostpulse/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    ///
    /// ```rust,ignore
    /// let cfg = config::Config::from_config(None::<&path::Path>)?;
    /// println!("{}", cfg);
    /// ```
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
    pub fn write_config(&self, path: &std::path::Path) -> Result<(), Error> {
        let config_str: String = toml::to_string_pretty(self).map_err(|_err| Error::ParseFailed)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|_err| Error::WriteFailed)?;
        }

        std::fs::write(path, config_str).map_err(|_err| Error::WriteFailed)
    }
}
