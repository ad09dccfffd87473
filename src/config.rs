use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::report::ReportFormat;
use crate::system::collector::CollectorConfig;
use crate::system::files::DEFAULT_LARGEST_FILES;
use crate::system::host::DEFAULT_PROBE_ADDRESS;
use crate::system::process::DEFAULT_TOP_PROCESSES;

pub const SCAN_ROOT_ENV: &str = "HOSTPULSE_SCAN_ROOT";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub sampling: SamplingConfig,
    pub network: NetworkConfig,
    pub colors: ColorsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub scan_root: Option<PathBuf>,
    pub refresh_rate_ms: u64,
    /// 0 disables the timeout.
    pub collect_timeout_ms: u64,
    pub format: ReportFormat,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            scan_root: None,
            refresh_rate_ms: 5000,
            collect_timeout_ms: 0,
            format: ReportFormat::Markdown,
        }
    }
}

/// `top_processes` and `largest_files` may lower the report limits but
/// never raise them past 3 and 5.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub cpu_interval_ms: u64,
    pub top_processes: usize,
    pub largest_files: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            cpu_interval_ms: 1000,
            top_processes: DEFAULT_TOP_PROCESSES,
            largest_files: DEFAULT_LARGEST_FILES,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub probe_address: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            probe_address: DEFAULT_PROBE_ADDRESS.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub heat_low: String,
    pub heat_mid: String,
    pub heat_high: String,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        ColorsConfig {
            heat_low: "#2d5a27".to_string(),
            heat_mid: "#b5890a".to_string(),
            heat_high: "#a12e2e".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "warn".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// An explicit scan root from the environment beats the file.
    pub fn apply_scan_root_override(&mut self, value: Option<OsString>) {
        if let Some(value) = value
            && !value.is_empty()
        {
            self.general.scan_root = Some(PathBuf::from(value));
        }
    }

    /// Configured root, falling back to the home directory.
    pub fn resolved_scan_root(&self) -> Option<PathBuf> {
        self.general.scan_root.clone().or_else(dirs::home_dir)
    }

    pub fn collect_timeout(&self) -> Option<Duration> {
        match self.general.collect_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    pub fn collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            scan_root: self.resolved_scan_root(),
            cpu_interval: Duration::from_millis(self.sampling.cpu_interval_ms),
            top_processes: self.sampling.top_processes.min(DEFAULT_TOP_PROCESSES),
            largest_files: self.sampling.largest_files.min(DEFAULT_LARGEST_FILES),
            probe_address: self.network.probe_address.clone(),
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hostpulse").join("config.toml"))
}

/// File layer plus the environment layer. CLI flags are applied on top by
/// the binary.
pub fn load_config() -> Config {
    let mut config = match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    };
    config.apply_scan_root_override(std::env::var_os(SCAN_ROOT_ENV));
    config
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}
