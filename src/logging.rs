use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use color_eyre::eyre::{Result, eyre};
use tracing::Level;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

const LEVELS: [Level; 5] = [
    Level::ERROR,
    Level::WARN,
    Level::INFO,
    Level::DEBUG,
    Level::TRACE,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
    /// Nothing is installed. Used by the dashboard when no log file is given.
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: Level,
    pub json: bool,
    pub target: LogTarget,
}

pub fn parse_level(s: &str) -> Option<Level> {
    match s.trim().to_ascii_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

/// Each `-v` moves one step towards `TRACE`.
pub fn raise_level(base: Level, steps: u8) -> Level {
    let start = LEVELS.iter().position(|l| *l == base).unwrap_or(1);
    let idx = (start + steps as usize).min(LEVELS.len() - 1);
    LEVELS[idx]
}

pub fn init_tracing(settings: &LogSettings) -> Result<()> {
    let writer = match &settings.target {
        LogTarget::Disabled => return Ok(()),
        LogTarget::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogTarget::File(path) => {
            ensure_parent_dir(path)?;
            let file = File::options().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
    };
    let ansi = settings.target == LogTarget::Stderr;

    let builder = tracing_subscriber::fmt()
        .with_max_level(settings.level)
        .with_target(false)
        .with_writer(writer);

    let installed = if settings.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.with_ansi(ansi).finish())
    };
    installed.map_err(|e| eyre!("failed to set tracing subscriber: {e}"))
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_level_names() {
        assert_eq!(parse_level("warn"), Some(Level::WARN));
        assert_eq!(parse_level(" DEBUG "), Some(Level::DEBUG));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn verbosity_saturates_at_trace() {
        assert_eq!(raise_level(Level::WARN, 0), Level::WARN);
        assert_eq!(raise_level(Level::WARN, 1), Level::INFO);
        assert_eq!(raise_level(Level::WARN, 2), Level::DEBUG);
        assert_eq!(raise_level(Level::ERROR, 9), Level::TRACE);
    }

    #[test]
    fn disabled_target_installs_nothing() {
        let settings = LogSettings {
            level: Level::INFO,
            json: false,
            target: LogTarget::Disabled,
        };
        assert!(init_tracing(&settings).is_ok());
    }
}
