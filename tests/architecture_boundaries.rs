use std::fs;
use std::path::{Path, PathBuf};

fn manifest_dir() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
}

/// Every `.rs` file under `src/<subdir>`, as `(relative path, contents)`.
fn sources(subdir: &str) -> Vec<(String, String)> {
    let mut files = Vec::new();
    let mut stack: Vec<PathBuf> = vec![manifest_dir().join("src").join(subdir)];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for path in entries.flatten().map(|e| e.path()) {
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                let contents = fs::read_to_string(&path).unwrap_or_default();
                let rel = path
                    .strip_prefix(manifest_dir())
                    .unwrap_or(&path)
                    .to_string_lossy()
                    .replace('\\', "/");
                files.push((rel, contents));
            }
        }
    }
    files.sort();
    files
}

fn offenders<'a>(files: &'a [(String, String)], allowed: &[&str], needle: &str) -> Vec<&'a str> {
    let is_allowed = |path: &str| allowed.iter().any(|prefix| path.starts_with(prefix));
    files
        .iter()
        .filter(|(path, _)| !is_allowed(path))
        .filter(|(_, contents)| contents.contains(needle))
        .map(|(path, _)| path.as_str())
        .collect()
}

#[test]
fn engine_does_not_depend_on_presentation() {
    let engine = sources("system");
    for needle in [
        "crate::ui",
        "crate::report",
        "crate::app",
        "ratatui",
        "crossterm",
    ] {
        let hits = offenders(&engine, &[], needle);
        assert!(hits.is_empty(), "`{needle}` used by the engine in {hits:?}");
    }
}

#[test]
fn filesystem_and_classifier_stay_os_agnostic() {
    let engine = sources("system");
    let pure: Vec<(String, String)> = engine
        .into_iter()
        .filter(|(path, _)| {
            path.ends_with("system/files.rs") || path.ends_with("system/classify.rs")
        })
        .collect();
    assert_eq!(pure.len(), 2);
    for needle in ["sysinfo", "super::platform"] {
        let hits = offenders(&pure, &[], needle);
        assert!(hits.is_empty(), "`{needle}` used in {hits:?}");
    }
}

#[test]
fn only_the_collector_spawns_threads() {
    let engine = sources("system");
    let hits = offenders(&engine, &["src/system/collector.rs"], "spawn");
    assert!(hits.is_empty(), "threads spawned in {hits:?}");
}

#[test]
fn ui_reads_snapshots_not_platform_queries() {
    let ui = sources("ui");
    for needle in ["crate::system::platform", "sysinfo"] {
        let hits = offenders(&ui, &[], needle);
        assert!(hits.is_empty(), "`{needle}` used by the UI in {hits:?}");
    }
}

#[test]
fn os_specific_code_lives_in_platform() {
    let all = sources("");
    for needle in ["target_os", "libc::"] {
        let hits = offenders(&all, &["src/system/platform/"], needle);
        assert!(hits.is_empty(), "`{needle}` outside platform/: {hits:?}");
    }
}
