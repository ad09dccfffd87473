use std::thread;
use std::time::Duration;

use serde::Serialize;
use sysinfo::{
    MINIMUM_CPU_UPDATE_INTERVAL, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System,
};

use super::classify::Tier;
use super::error::CollectError;
use crate::format::round_1;

pub const DEFAULT_TOP_PROCESSES: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    Sleeping,
    Stopped,
    Zombie,
    Dead,
    Other,
}

impl From<ProcessStatus> for ProcessState {
    fn from(status: ProcessStatus) -> Self {
        match status {
            ProcessStatus::Run => ProcessState::Running,
            ProcessStatus::Sleep | ProcessStatus::Idle => ProcessState::Sleeping,
            ProcessStatus::Stop => ProcessState::Stopped,
            ProcessStatus::Zombie => ProcessState::Zombie,
            ProcessStatus::Dead => ProcessState::Dead,
            _ => ProcessState::Other,
        }
    }
}

/// Raw per-process reading before ranking.
#[derive(Clone, Debug)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub memory_bytes: u64,
    pub cpu_percent: f32,
    pub status: ProcessState,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcessSample {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f64,
    pub mem_percent: f64,
    pub cpu_tier: Tier,
    pub mem_tier: Tier,
}

impl ProcessSample {
    pub fn new(pid: u32, name: String, cpu_percent: f64, mem_percent: f64) -> Self {
        ProcessSample {
            pid,
            name,
            cpu_percent,
            mem_percent,
            cpu_tier: Tier::classify(cpu_percent),
            mem_tier: Tier::classify(mem_percent),
        }
    }
}

fn is_live(p: &ProcessInfo) -> bool {
    !matches!(p.status, ProcessState::Zombie | ProcessState::Dead)
}

/// Drop zombies and idle processes, then order by CPU then memory, both
/// descending. The sort is stable, so remaining ties keep input order.
pub fn rank_processes(
    processes: Vec<ProcessInfo>,
    total_memory: u64,
    limit: usize,
) -> Vec<ProcessSample> {
    let mut ranked: Vec<ProcessSample> = processes
        .into_iter()
        .filter(is_live)
        .filter_map(|p| {
            let cpu = round_1(p.cpu_percent as f64);
            let mem = if total_memory > 0 {
                round_1(p.memory_bytes as f64 / total_memory as f64 * 100.0)
            } else {
                0.0
            };
            if cpu == 0.0 && mem == 0.0 {
                return None;
            }
            Some(ProcessSample::new(p.pid, p.name, cpu, mem))
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.cpu_percent
            .total_cmp(&a.cpu_percent)
            .then_with(|| b.mem_percent.total_cmp(&a.mem_percent))
    });
    ranked.truncate(limit);
    ranked
}

/// Sample every visible process across `interval` and keep the top `limit`.
///
/// Processes that exit or deny access between the two refreshes simply drop
/// out. An empty process table is structural.
pub fn sample_processes(
    interval: Duration,
    limit: usize,
) -> Result<Vec<ProcessSample>, CollectError> {
    let _span = tracing::debug_span!("processes.rank", limit).entered();

    let refresh_kind = ProcessRefreshKind::nothing().with_memory().with_cpu();
    let mut sys = System::new();
    sys.refresh_memory();
    sys.refresh_processes_specifics(ProcessesToUpdate::All, true, refresh_kind);
    thread::sleep(interval.max(MINIMUM_CPU_UPDATE_INTERVAL));
    sys.refresh_processes_specifics(ProcessesToUpdate::All, true, refresh_kind);

    if sys.processes().is_empty() {
        return Err(CollectError::ProcessTableUnavailable);
    }

    let mut flat: Vec<ProcessInfo> = sys
        .processes()
        .iter()
        .map(|(pid, process)| ProcessInfo {
            pid: pid.as_u32(),
            name: process.name().to_string_lossy().to_string(),
            memory_bytes: process.memory(),
            cpu_percent: process.cpu_usage(),
            status: process.status().into(),
        })
        .collect();
    flat.sort_unstable_by_key(|p| p.pid);

    tracing::debug!(visible = flat.len(), "process table sampled");
    Ok(rank_processes(flat, sys.total_memory(), limit))
}
