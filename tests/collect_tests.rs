use std::fs;
use std::time::Duration;

use hostpulse::report::{render_html, render_json, render_markdown};
use hostpulse::system::files::FileCategory;
use hostpulse::system::{CollectError, Collector, CollectorConfig};

fn collector_for(root: Option<std::path::PathBuf>) -> Collector {
    Collector::new(CollectorConfig {
        scan_root: root,
        cpu_interval: Duration::from_millis(250),
        probe_address: "127.0.0.1:9".to_string(),
        ..CollectorConfig::default()
    })
}

#[test]
fn live_collection_fills_every_engine_section() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("script.py"), vec![0u8; 100]).unwrap();
    fs::write(dir.path().join("blob.bin"), vec![0u8; 300]).unwrap();

    let snapshot = collector_for(Some(dir.path().to_path_buf())).collect();

    let cpu = snapshot.cpu.available().expect("cpu section");
    assert_eq!(cpu.per_core.len(), cpu.core_count);
    let memory = snapshot.memory.available().expect("memory section");
    assert!(memory.used_bytes <= memory.total_bytes);

    let files = snapshot.files.available().expect("files section");
    assert_eq!(files.total_files(), 2);
    assert_eq!(files.category(FileCategory::Py).total_bytes, 100);
    assert_eq!(files.category(FileCategory::Other).total_bytes, 300);
    let largest: Vec<&str> = files
        .largest_files()
        .iter()
        .map(|f| f.display_name.as_str())
        .collect();
    assert_eq!(largest, vec!["blob.bin", "script.py"]);

    if let Some(procs) = snapshot.top_processes.available() {
        assert!(procs.len() <= 3);
    }
}

#[test]
fn degraded_snapshot_still_renders_everywhere() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing");
    let snapshot = collector_for(Some(missing.clone())).collect();
    assert_eq!(
        snapshot.files.error(),
        Some(&CollectError::ScanRootMissing(missing))
    );

    let markdown = render_markdown(&snapshot);
    assert!(markdown.contains("_Unavailable: scan root"));
    assert!(render_html(&snapshot).contains("class=\"unavailable\""));
    let json = render_json(&snapshot).unwrap();
    let json: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(json["files"]["status"], "unavailable");
    assert_eq!(json["cpu"]["status"], "available");
}

#[test]
fn strict_collection_surfaces_structural_failure() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    fs::write(&file, "x").unwrap();

    let err = collector_for(Some(file.clone())).collect_strict().unwrap_err();
    assert_eq!(err, CollectError::ScanRootNotDirectory(file));
}
