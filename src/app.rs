use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::Action;
use crate::config::Config;
use crate::system::collector::Collector;
use crate::system::error::CollectError;
use crate::system::snapshot::Snapshot;
use crate::ui::theme::{HeatOverrides, Theme};

const STATUS_TTL: Duration = Duration::from_secs(3);

/// One collection under an optional deadline.
pub fn run_collection(
    collector: &Collector,
    timeout: Option<Duration>,
) -> Result<Snapshot, CollectError> {
    match timeout {
        Some(timeout) => collector.collect_with_timeout(timeout),
        None => Ok(collector.collect()),
    }
}

/// Owned copy of everything one background collection needs.
pub struct CollectJob {
    collector: Collector,
    timeout: Option<Duration>,
}

impl CollectJob {
    pub fn run(self) -> Result<Snapshot, CollectError> {
        run_collection(&self.collector, self.timeout)
    }
}

pub struct App {
    pub running: bool,
    collector: Collector,
    timeout: Option<Duration>,
    /// Most recent successful snapshot. Replaced wholesale, never patched.
    pub snapshot: Option<Snapshot>,
    pub collecting: bool,
    pub collections: u64,
    pub theme: Theme,
    pub status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(config: &Config, collector: Collector) -> Self {
        let heat_overrides = HeatOverrides::from_config(&config.colors);
        App {
            running: true,
            collector,
            timeout: config.collect_timeout(),
            snapshot: None,
            collecting: false,
            collections: 0,
            theme: Theme::from_config(&heat_overrides),
            status_message: None,
        }
    }

    /// Claim the single in-flight slot. Returns the work to run off the
    /// event loop, or `None` if a collection is already running.
    pub fn begin_collect(&mut self) -> Option<CollectJob> {
        if self.collecting {
            tracing::debug!("collection already in flight; skipping tick");
            return None;
        }
        self.collecting = true;
        Some(CollectJob {
            collector: self.collector.clone(),
            timeout: self.timeout,
        })
    }

    pub fn on_collected(&mut self, result: Result<Snapshot, CollectError>) {
        self.collecting = false;
        match result {
            Ok(snapshot) => {
                self.collections += 1;
                let failures = snapshot.failures().len();
                self.status_message = if failures > 0 {
                    let message = format!("{failures} section(s) unavailable");
                    Some((message, Instant::now()))
                } else {
                    None
                };
                self.snapshot = Some(snapshot);
            }
            Err(err) => {
                tracing::warn!(error = %err, "watch collection failed");
                self.status_message = Some((format!("Collection failed: {err}"), Instant::now()));
            }
        }
    }

    pub fn expire_status(&mut self) {
        if let Some((_, created)) = &self.status_message
            && created.elapsed() >= STATUS_TTL
        {
            self.status_message = None;
        }
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        // Ctrl+C always quits
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('r') => Action::Refresh,
            _ => Action::None,
        }
    }

    /// Apply `action`. Refresh is scheduled by the caller, which owns the
    /// runtime.
    pub fn dispatch(&mut self, action: Action) {
        if action == Action::Quit {
            self.running = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::collector::CollectorConfig;

    fn test_app() -> App {
        let collector = Collector::new(CollectorConfig {
            scan_root: None,
            cpu_interval: Duration::from_millis(1),
            probe_address: "127.0.0.1:9".to_string(),
            ..CollectorConfig::default()
        });
        App::new(&Config::default(), collector)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn quit_keys() {
        let app = test_app();
        assert_eq!(app.map_key(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(app.map_key(key(KeyCode::Esc)), Action::Quit);
        assert_eq!(
            app.map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
        assert_eq!(app.map_key(key(KeyCode::Char('c'))), Action::None);
        assert_eq!(app.map_key(key(KeyCode::Char('r'))), Action::Refresh);
    }

    #[test]
    fn dispatch_quit_stops_app() {
        let mut app = test_app();
        app.dispatch(Action::Refresh);
        assert!(app.running);
        app.dispatch(Action::Quit);
        assert!(!app.running);
    }

    #[test]
    fn only_one_collection_in_flight() {
        let mut app = test_app();
        assert!(app.begin_collect().is_some());
        assert!(app.collecting);
        assert!(app.begin_collect().is_none());

        app.on_collected(Err(CollectError::TimedOut(Duration::from_secs(1))));
        assert!(!app.collecting);
        assert!(app.snapshot.is_none());
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert!(msg.contains("timed out"));
        assert!(app.begin_collect().is_some());
    }

    #[test]
    fn timed_out_walk_blocks_the_next_tick() {
        let collector = Collector::new(CollectorConfig {
            scan_root: None,
            cpu_interval: Duration::from_millis(600),
            probe_address: "127.0.0.1:9".to_string(),
            ..CollectorConfig::default()
        });
        let mut config = Config::default();
        config.general.collect_timeout_ms = 5;
        let mut app = App::new(&config, collector);

        let job = app.begin_collect().unwrap();
        app.on_collected(job.run());
        assert!(app.collector.worker_running());

        let job = app.begin_collect().unwrap();
        let result = job.run();
        assert_eq!(result.as_ref().unwrap_err(), &CollectError::StillRunning);
        app.on_collected(result);
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert!(msg.contains("still running"));
    }

    #[test]
    fn completed_job_replaces_snapshot() {
        let mut app = test_app();
        let job = app.begin_collect().unwrap();
        let result = job.run();
        app.on_collected(result);
        let snapshot = app.snapshot.as_ref().unwrap();
        assert_eq!(snapshot.files.error(), Some(&CollectError::ScanRootUnknown));
        assert_eq!(app.collections, 1);
        assert!(app.status_message.is_some());
    }
}
