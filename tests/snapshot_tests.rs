use std::fs;
use std::path::Path;

use hostpulse::system::files::{FileSummary, scan};
use hostpulse::system::process::{ProcessInfo, ProcessState, rank_processes};
use insta::assert_debug_snapshot;

fn write(root: &Path, rel: &str, size: usize) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, vec![b'.'; size]).unwrap();
}

type Normalized = (u64, Vec<(&'static str, u64, u64, f64)>, Vec<(String, u64)>);

// Drops the tempdir path so the snapshot is machine independent.
fn normalized(summary: &FileSummary) -> Normalized {
    let rows = summary
        .non_empty_rows()
        .into_iter()
        .map(|r| {
            (
                r.category.label(),
                r.count,
                r.total_bytes,
                r.percent_of_total_files,
            )
        })
        .collect();
    let largest = summary
        .largest_files()
        .iter()
        .map(|f| (f.display_name.clone(), f.size_bytes))
        .collect();
    (summary.total_files(), rows, largest)
}

#[test]
fn deterministic_scan_snapshot_from_fixture_tree() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.txt", 10);
    write(dir.path(), "b/c.py", 100);
    write(dir.path(), "b/d.PY", 100);
    write(dir.path(), "e.log", 40);

    let summary = scan(dir.path(), 5).unwrap();
    assert_debug_snapshot!("scan_normalized", normalized(&summary));
}

fn mock_process(pid: u32, name: &str, cpu: f32, memory_bytes: u64) -> ProcessInfo {
    ProcessInfo {
        pid,
        name: name.to_string(),
        memory_bytes,
        cpu_percent: cpu,
        status: ProcessState::Running,
    }
}

#[test]
fn ranking_invariants_hold_on_mixed_table() {
    let mut zombie = mock_process(5, "defunct", 99.0, 0);
    zombie.status = ProcessState::Zombie;
    let processes = vec![
        mock_process(1, "init", 0.0, 0),
        mock_process(2, "db", 12.0, 300_000),
        mock_process(3, "web", 12.0, 500_000),
        mock_process(4, "batch", 40.0, 10_000),
        zombie,
        mock_process(6, "cron", 0.1, 0),
    ];

    let ranked = rank_processes(processes, 1_000_000, 3);
    let pids: Vec<u32> = ranked.iter().map(|p| p.pid).collect();

    // Zombie and all-zero entries never appear.
    assert_eq!(pids, vec![4, 3, 2]);
    assert_eq!(ranked[1].mem_percent, 50.0);
}

#[test]
fn largest_files_are_bounded_and_ordered() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..12 {
        let rel = format!("d{}/f{i:02}.zip", i % 4);
        write(dir.path(), &rel, (i % 5 + 1) * 10);
    }

    let summary = scan(dir.path(), 5).unwrap();
    let sizes: Vec<u64> = summary
        .largest_files()
        .iter()
        .map(|f| f.size_bytes)
        .collect();
    assert_eq!(sizes.len(), 5);
    assert!(sizes.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(sizes[0], 50);
    assert_eq!(summary.total_files(), 12);
}
