use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use super::error::CollectError;
use super::files::FileSummary;
use super::host::HostInfo;
use super::process::ProcessSample;
use super::resources::{CpuInfo, MemoryInfo};

/// Output of one sub-collector: its value, or the structural failure that
/// kept it from producing one.
#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
    Available(T),
    Unavailable(CollectError),
}

impl<T> Section<T> {
    pub fn from_result(result: Result<T, CollectError>) -> Self {
        match result {
            Ok(value) => Section::Available(value),
            Err(err) => Section::Unavailable(err),
        }
    }

    pub fn available(&self) -> Option<&T> {
        match self {
            Section::Available(value) => Some(value),
            Section::Unavailable(_) => None,
        }
    }

    pub fn error(&self) -> Option<&CollectError> {
        match self {
            Section::Available(_) => None,
            Section::Unavailable(err) => Some(err),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Section::Available(_))
    }
}

impl<T: Serialize> Serialize for Section<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Section", 2)?;
        match self {
            Section::Available(value) => {
                state.serialize_field("status", "available")?;
                state.serialize_field("data", value)?;
            }
            Section::Unavailable(err) => {
                state.serialize_field("status", "unavailable")?;
                state.serialize_field("reason", &err.to_string())?;
            }
        }
        state.end()
    }
}

/// One immutable capture of host health. Built once by the collector and
/// never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Stamped after every sub-collector has finished.
    pub timestamp: DateTime<Local>,
    #[serde(serialize_with = "lossy_opt_path")]
    pub scan_root: Option<PathBuf>,
    pub host: Section<HostInfo>,
    pub cpu: Section<CpuInfo>,
    pub memory: Section<MemoryInfo>,
    pub top_processes: Section<Vec<ProcessSample>>,
    pub files: Section<FileSummary>,
}

impl Snapshot {
    /// `(section name, error)` for every section that is unavailable.
    pub fn failures(&self) -> Vec<(&'static str, &CollectError)> {
        [
            ("host", self.host.error()),
            ("cpu", self.cpu.error()),
            ("memory", self.memory.error()),
            ("top_processes", self.top_processes.error()),
            ("files", self.files.error()),
        ]
        .into_iter()
        .filter_map(|(name, err)| err.map(|e| (name, e)))
        .collect()
    }

    pub fn first_failure(&self) -> Option<&CollectError> {
        self.failures().into_iter().next().map(|(_, err)| err)
    }

    pub fn is_complete(&self) -> bool {
        self.failures().is_empty()
    }
}

pub(crate) fn duration_secs<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(d.as_secs())
}

pub(crate) fn lossy_path<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}

fn lossy_opt_path<S: Serializer>(path: &Option<PathBuf>, serializer: S) -> Result<S::Ok, S::Error> {
    match path {
        Some(p) => serializer.serialize_some(&p.to_string_lossy()),
        None => serializer.serialize_none(),
    }
}
