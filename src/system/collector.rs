use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread::{self, Scope, ScopedJoinHandle};
use std::time::Duration;

use chrono::Local;

use super::error::CollectError;
use super::files::{self, DEFAULT_LARGEST_FILES};
use super::host::{self, DEFAULT_PROBE_ADDRESS};
use super::process::{self, DEFAULT_TOP_PROCESSES};
use super::resources::{self, CpuInfo, DEFAULT_SAMPLE_INTERVAL, MemoryInfo};
use super::snapshot::{Section, Snapshot};

#[derive(Debug, Clone, PartialEq)]
pub struct CollectorConfig {
    /// `None` when no scan root could be determined; the file section
    /// then reports `ScanRootUnknown`.
    pub scan_root: Option<PathBuf>,
    pub cpu_interval: Duration,
    pub top_processes: usize,
    pub largest_files: usize,
    pub probe_address: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        CollectorConfig {
            scan_root: dirs::home_dir(),
            cpu_interval: DEFAULT_SAMPLE_INTERVAL,
            top_processes: DEFAULT_TOP_PROCESSES,
            largest_files: DEFAULT_LARGEST_FILES,
            probe_address: DEFAULT_PROBE_ADDRESS.to_string(),
        }
    }
}

/// Assembles snapshots. Every call samples the OS from scratch.
///
/// Clones share one timeout worker slot, so at most one detached
/// collection runs at a time.
#[derive(Debug, Clone, Default)]
pub struct Collector {
    config: CollectorConfig,
    worker: Arc<AtomicBool>,
}

impl Collector {
    pub fn new(config: CollectorConfig) -> Self {
        Collector {
            config,
            worker: Arc::default(),
        }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// True while a worker started by
    /// [`collect_with_timeout`](Self::collect_with_timeout) is still running.
    pub fn worker_running(&self) -> bool {
        self.worker.load(Ordering::Acquire)
    }

    /// Run every sub-collector in parallel and assemble the results.
    ///
    /// Never fails as a whole. A sub-collector that errors or panics leaves
    /// its section `Unavailable` while the others are still filled in.
    pub fn collect(&self) -> Snapshot {
        let span = tracing::debug_span!("collector.collect");
        let _entered = span.enter();
        let cfg = &self.config;

        let (host, resources, top_processes, files) = thread::scope(|s| {
            let host = spawn_section(s, "host", || Ok(host::probe_host(&cfg.probe_address)));
            let resources = spawn_section(s, "resources", || {
                Ok(resources::probe_resources(cfg.cpu_interval))
            });
            let processes = spawn_section(s, "processes", || {
                process::sample_processes(cfg.cpu_interval, cfg.top_processes)
            });
            let files = spawn_section(s, "files", || match &cfg.scan_root {
                Some(root) => files::scan(root, cfg.largest_files),
                None => Err(CollectError::ScanRootUnknown),
            });
            (
                join_section(host, "host"),
                join_section(resources, "resources"),
                join_section(processes, "processes"),
                join_section(files, "files"),
            )
        });

        let (cpu, memory) = split_resources(resources);

        let snapshot = Snapshot {
            timestamp: Local::now(),
            scan_root: cfg.scan_root.clone(),
            host,
            cpu,
            memory,
            top_processes,
            files,
        };
        for (section, err) in snapshot.failures() {
            tracing::debug!(section, error = %err, "section unavailable");
        }
        snapshot
    }

    /// Like [`collect`](Self::collect), but any unavailable section turns
    /// the whole call into that section's error.
    pub fn collect_strict(&self) -> Result<Snapshot, CollectError> {
        let snapshot = self.collect();
        match snapshot.first_failure() {
            Some(err) => Err(err.clone()),
            None => Ok(snapshot),
        }
    }

    /// Collect on a worker thread and give up after `timeout`.
    ///
    /// An overrun yields `TimedOut`, never a partial snapshot. The worker
    /// is left to finish on its own and its result is dropped. Until it
    /// does, further calls fail fast with `StillRunning`.
    pub fn collect_with_timeout(&self, timeout: Duration) -> Result<Snapshot, CollectError> {
        let slot = WorkerSlot::claim(&self.worker).ok_or(CollectError::StillRunning)?;
        let (tx, rx) = mpsc::sync_channel(1);
        let collector = self.clone();
        thread::Builder::new()
            .name("hostpulse-collect".into())
            .spawn(move || {
                let snapshot = collector.collect();
                drop(slot);
                let _ = tx.send(snapshot);
            })
            .map_err(|err| CollectError::Spawn(err.to_string()))?;

        match rx.recv_timeout(timeout) {
            Ok(snapshot) => Ok(snapshot),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "collection timed out"
                );
                Err(CollectError::TimedOut(timeout))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(CollectError::CollectorPanicked("collector"))
            }
        }
    }
}

/// Held by the detached worker; released on drop, including on panic.
struct WorkerSlot(Arc<AtomicBool>);

impl WorkerSlot {
    fn claim(flag: &Arc<AtomicBool>) -> Option<Self> {
        let claimed = flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire);
        claimed.ok().map(|_| WorkerSlot(Arc::clone(flag)))
    }
}

impl Drop for WorkerSlot {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

type Handle<'scope, T> = Result<ScopedJoinHandle<'scope, Result<T, CollectError>>, CollectError>;

fn spawn_section<'scope, 'env, T, F>(
    scope: &'scope Scope<'scope, 'env>,
    name: &'static str,
    work: F,
) -> Handle<'scope, T>
where
    T: Send + 'scope,
    F: FnOnce() -> Result<T, CollectError> + Send + 'scope,
{
    let span = tracing::Span::current();
    thread::Builder::new()
        .name(format!("collect-{name}"))
        .spawn_scoped(scope, move || span.in_scope(work))
        .map_err(|err| CollectError::Spawn(err.to_string()))
}

fn join_section<T>(handle: Handle<'_, T>, name: &'static str) -> Section<T> {
    let result = handle.and_then(|h| {
        h.join().unwrap_or_else(|_| {
            tracing::error!(collector = name, "sub-collector panicked");
            Err(CollectError::CollectorPanicked(name))
        })
    });
    Section::from_result(result)
}

fn split_resources(
    section: Section<(CpuInfo, MemoryInfo)>,
) -> (Section<CpuInfo>, Section<MemoryInfo>) {
    match section {
        Section::Available((cpu, memory)) => (Section::Available(cpu), Section::Available(memory)),
        Section::Unavailable(err) => (Section::Unavailable(err.clone()), Section::Unavailable(err)),
    }
}
