use std::fs;
use std::time::{Duration, Instant};

use chrono::Local;
use ratatui::Terminal;
use ratatui::backend::TestBackend;

use crate::app::App;
use crate::config::Config;
use crate::system::collector::{Collector, CollectorConfig};
use crate::system::error::CollectError;
use crate::system::files;
use crate::system::host::{HostInfo, LoadPercent};
use crate::system::process::ProcessSample;
use crate::system::resources::{CpuInfo, MemoryInfo};
use crate::system::snapshot::{Section, Snapshot};
use crate::ui::theme::Theme;
use crate::ui::{header, statusbar};

fn buffer_to_string(buf: &ratatui::buffer::Buffer) -> String {
    let area = buf.area;
    let mut out = String::new();
    for y in 0..area.height {
        for x in 0..area.width {
            let cell = buf.cell((x, y)).unwrap();
            out.push_str(cell.symbol());
        }
        if y + 1 < area.height {
            out.push('\n');
        }
    }
    out
}

fn render_to_string<F>(width: u16, height: u16, draw: F) -> String
where
    F: FnOnce(&mut ratatui::Frame),
{
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(draw).unwrap();
    let buf = terminal.backend().buffer();
    buffer_to_string(buf)
}

fn test_host() -> HostInfo {
    HostInfo {
        hostname: Some("build-box".to_string()),
        os: Some("Linux 6.8.0".to_string()),
        os_long: None,
        boot_time: None,
        uptime: Duration::from_secs(90_061),
        uptime_clamped: false,
        user_count: Some(2),
        ip_address: None,
        load: Some(LoadPercent {
            one: 25.0,
            five: 12.5,
            fifteen: 5.0,
        }),
    }
}

fn test_app() -> App {
    let collector = Collector::new(CollectorConfig {
        scan_root: None,
        ..CollectorConfig::default()
    });
    App::new(&Config::default(), collector)
}

fn sample_snapshot(dir: &std::path::Path) -> Snapshot {
    fs::write(dir.join("report.pdf"), vec![0u8; 2048]).unwrap();
    fs::write(dir.join("notes.txt"), vec![0u8; 10]).unwrap();
    Snapshot {
        timestamp: Local::now(),
        scan_root: Some(dir.to_path_buf()),
        host: Section::Available(test_host()),
        cpu: Section::Available(CpuInfo::from_samples(55.0, &[10.0, 95.0], 3200)),
        memory: Section::Available(MemoryInfo::from_bytes(8 << 30, 2 << 30)),
        top_processes: Section::Available(vec![
            ProcessSample::new(101, "rustc".to_string(), 88.0, 4.5),
            ProcessSample::new(7, "postgres".to_string(), 3.0, 20.0),
        ]),
        files: Section::from_result(files::scan(dir, 5)),
    }
}

#[test]
fn empty_app_shows_waiting_message() {
    let app = test_app();
    let out = render_to_string(100, 30, |frame| super::draw(frame, &app));
    assert!(out.contains("Collecting first snapshot"));
    assert!(out.contains("Quit"));
    assert!(out.contains("Refresh"));
}

#[test]
fn full_dashboard_renders_every_panel() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app();
    app.snapshot = Some(sample_snapshot(dir.path()));

    let out = render_to_string(140, 30, |frame| super::draw(frame, &app));
    assert!(out.contains("hostpulse"));
    assert!(out.contains("build-box"));
    assert!(out.contains("up 1 day, 1:01:01"));
    let load_shown = out.contains("load 25/13/5%") || out.contains("load 25/12/5%");
    assert!(load_shown);
    assert!(out.contains("ip unavailable"));
    assert!(out.contains("55% of 2 cores @ 3200 MHz"));
    assert!(out.contains("2/8 GB (25%)"));
    assert!(out.contains("rustc"));
    assert!(out.contains("88.0%"));
    assert!(out.contains("core  1  95.0%"));
    assert!(out.contains(".pdf"));
    assert!(out.contains(".txt"));
    assert!(out.contains("50.00%"));
    assert!(out.contains("1. report.pdf"));
    assert!(out.contains("2. notes.txt"));
}

#[test]
fn unavailable_sections_render_reason() {
    let dir = tempfile::tempdir().unwrap();
    let mut snapshot = sample_snapshot(dir.path());
    snapshot.top_processes = Section::Unavailable(CollectError::ProcessTableUnavailable);
    snapshot.files = Section::Unavailable(CollectError::ScanRootUnknown);
    let mut app = test_app();
    app.snapshot = Some(snapshot);

    let out = render_to_string(140, 30, |frame| super::draw(frame, &app));
    assert!(out.contains("unavailable: process table is unavailable"));
    assert!(out.contains("unavailable: scan root could not"));
    assert!(!out.contains("rustc"));
}

#[test]
fn header_reports_missing_host() {
    let dir = tempfile::tempdir().unwrap();
    let mut snapshot = sample_snapshot(dir.path());
    snapshot.host = Section::Unavailable(CollectError::CollectorPanicked("host"));
    let theme = Theme::dark();
    let out = render_to_string(100, 3, |frame| {
        header::render(frame, frame.area(), &snapshot, &theme)
    });
    assert!(out.contains("host unavailable: host collector panicked"));
}

#[test]
fn statusbar_prefers_status_message() {
    let theme = Theme::dark();
    let message = ("Collection failed: timed out".to_string(), Instant::now());
    let out = render_to_string(80, 1, |frame| {
        statusbar::render(frame, frame.area(), None, true, Some(&message), &theme)
    });
    assert!(out.contains("Collection failed"));
    assert!(!out.contains("Quit"));
}

#[test]
fn statusbar_shows_in_flight_collection() {
    let theme = Theme::dark();
    let out = render_to_string(80, 1, |frame| {
        statusbar::render(frame, frame.area(), None, true, None, &theme)
    });
    assert!(out.contains("collecting"));
}
