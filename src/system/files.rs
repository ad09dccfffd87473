//! Recursive filesystem composition scan.
//!
//! One depth-first pass over a directory tree produces per-extension
//! counts and byte totals plus the K largest files seen. Memory use is
//! bounded by the K retained entries and the directory stack, not by the
//! number of files.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use super::error::CollectError;
use super::snapshot::lossy_path;
use crate::format::round_2;

pub const DEFAULT_LARGEST_FILES: usize = 5;

/// The closed set of tracked extensions plus the catch-all bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileCategory {
    Txt,
    Py,
    Pdf,
    Jpg,
    Png,
    Html,
    Css,
    Js,
    Log,
    Zip,
    Other,
}

impl FileCategory {
    pub const ALL: [FileCategory; 11] = [
        FileCategory::Txt,
        FileCategory::Py,
        FileCategory::Pdf,
        FileCategory::Jpg,
        FileCategory::Png,
        FileCategory::Html,
        FileCategory::Css,
        FileCategory::Js,
        FileCategory::Log,
        FileCategory::Zip,
        FileCategory::Other,
    ];

    /// Number of real extensions, excluding `Other`.
    pub const TRACKED: usize = Self::ALL.len() - 1;

    pub fn label(self) -> &'static str {
        match self {
            FileCategory::Txt => ".txt",
            FileCategory::Py => ".py",
            FileCategory::Pdf => ".pdf",
            FileCategory::Jpg => ".jpg",
            FileCategory::Png => ".png",
            FileCategory::Html => ".html",
            FileCategory::Css => ".css",
            FileCategory::Js => ".js",
            FileCategory::Log => ".log",
            FileCategory::Zip => ".zip",
            FileCategory::Other => "OTHER",
        }
    }

    /// `ext` is given without the leading dot; matching ignores ASCII case.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "txt" => FileCategory::Txt,
            "py" => FileCategory::Py,
            "pdf" => FileCategory::Pdf,
            "jpg" => FileCategory::Jpg,
            "png" => FileCategory::Png,
            "html" => FileCategory::Html,
            "css" => FileCategory::Css,
            "js" => FileCategory::Js,
            "log" => FileCategory::Log,
            "zip" => FileCategory::Zip,
            _ => FileCategory::Other,
        }
    }

    /// Dotfiles such as `.bashrc` have no extension and land in `Other`.
    pub fn of_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(FileCategory::Other)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl Serialize for FileCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryStat {
    pub count: u64,
    pub total_bytes: u64,
}

impl CategoryStat {
    /// Share of `total_files`, 2 decimals; 0 when nothing was scanned.
    pub fn percent_of(&self, total_files: u64) -> f64 {
        if total_files == 0 {
            return 0.0;
        }
        round_2(self.count as f64 / total_files as f64 * 100.0)
    }
}

/// One accumulator slot per `FileCategory`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTotals {
    slots: [CategoryStat; FileCategory::ALL.len()],
}

impl CategoryTotals {
    pub fn record(&mut self, category: FileCategory, size: u64) {
        let slot = &mut self.slots[category.index()];
        slot.count += 1;
        slot.total_bytes = slot.total_bytes.saturating_add(size);
    }

    pub fn get(&self, category: FileCategory) -> CategoryStat {
        self.slots[category.index()]
    }

    pub fn total_count(&self) -> u64 {
        self.slots.iter().map(|s| s.count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FileCategory, CategoryStat)> + '_ {
        FileCategory::ALL.iter().map(|&c| (c, self.get(c)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LargestFile {
    pub display_name: String,
    #[serde(serialize_with = "lossy_path")]
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl LargestFile {
    fn new(path: PathBuf, size_bytes: u64) -> Self {
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        LargestFile {
            display_name,
            path,
            size_bytes,
        }
    }
}

struct Ranked {
    size: u64,
    seq: u64,
    path: PathBuf,
}

// Greater means "ranks higher": bigger size, then earlier sequence.
impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.size
            .cmp(&other.size)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

/// Size-bounded min-heap of the largest files offered so far.
///
/// Among equal sizes the first one offered wins.
pub struct TopFiles {
    capacity: usize,
    next_seq: u64,
    heap: BinaryHeap<Reverse<Ranked>>,
}

impl TopFiles {
    pub fn new(capacity: usize) -> Self {
        TopFiles {
            capacity,
            next_seq: 0,
            heap: BinaryHeap::with_capacity(capacity + 1),
        }
    }

    pub fn offer(&mut self, path: &Path, size: u64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        if self.capacity == 0 {
            return;
        }
        if self.heap.len() == self.capacity {
            // A later file of equal size ranks below the incumbent.
            if let Some(Reverse(worst)) = self.heap.peek()
                && size <= worst.size
            {
                return;
            }
            self.heap.pop();
        }
        self.heap.push(Reverse(Ranked {
            size,
            seq,
            path: path.to_path_buf(),
        }));
    }

    /// Largest first.
    pub fn into_sorted(self) -> Vec<LargestFile> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(r)| LargestFile::new(r.path, r.size))
            .collect()
    }
}

/// Outcome of stat-ing one directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryProbe {
    File(u64),
    Directory,
    NotFound,
    PermissionDenied,
    /// Sockets, fifos, devices and symlinks to directories.
    NotAFile,
    Unreadable,
}

impl EntryProbe {
    fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => EntryProbe::NotFound,
            io::ErrorKind::PermissionDenied => EntryProbe::PermissionDenied,
            _ => EntryProbe::Unreadable,
        }
    }

    pub fn of_entry(entry: &fs::DirEntry) -> Self {
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(err) => return Self::from_io(&err),
        };
        if file_type.is_dir() {
            return EntryProbe::Directory;
        }
        // Symlinks count with their target's size but are never descended.
        let metadata = if file_type.is_symlink() {
            fs::metadata(entry.path())
        } else {
            entry.metadata()
        };
        match metadata {
            Ok(meta) if meta.is_file() => EntryProbe::File(meta.len()),
            Ok(_) => EntryProbe::NotAFile,
            Err(err) => Self::from_io(&err),
        }
    }
}

/// Result of one scan. Percentages are derived on read, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSummary {
    scan_root: PathBuf,
    totals: CategoryTotals,
    largest_files: Vec<LargestFile>,
    skipped_entries: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryRow {
    pub category: FileCategory,
    pub count: u64,
    pub total_bytes: u64,
    pub percent_of_total_files: f64,
}

impl FileSummary {
    pub fn scan_root(&self) -> &Path {
        &self.scan_root
    }

    pub fn total_files(&self) -> u64 {
        self.totals.total_count()
    }

    pub fn category(&self, category: FileCategory) -> CategoryStat {
        self.totals.get(category)
    }

    /// All eleven categories, zero counts included, in `FileCategory::ALL` order.
    pub fn rows(&self) -> Vec<CategoryRow> {
        let total = self.total_files();
        self.totals
            .iter()
            .map(|(category, stat)| CategoryRow {
                category,
                count: stat.count,
                total_bytes: stat.total_bytes,
                percent_of_total_files: stat.percent_of(total),
            })
            .collect()
    }

    pub fn non_empty_rows(&self) -> Vec<CategoryRow> {
        self.rows().into_iter().filter(|r| r.count > 0).collect()
    }

    pub fn largest_files(&self) -> &[LargestFile] {
        &self.largest_files
    }

    /// Entries that vanished or could not be read during the walk.
    pub fn skipped_entries(&self) -> u64 {
        self.skipped_entries
    }
}

impl Serialize for FileSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FileSummary", 6)?;
        state.serialize_field("scan_root", &self.scan_root.to_string_lossy())?;
        state.serialize_field("total_files", &self.total_files())?;
        state.serialize_field("tracked_extensions", &FileCategory::TRACKED)?;
        state.serialize_field("categories", &self.rows())?;
        state.serialize_field("largest_files", &self.largest_files)?;
        state.serialize_field("skipped_entries", &self.skipped_entries)?;
        state.end()
    }
}

struct Walk {
    totals: CategoryTotals,
    top: TopFiles,
    skipped: u64,
}

impl Walk {
    fn visit_dir(&mut self, dir: &Path, stack: &mut Vec<PathBuf>) -> io::Result<()> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            match entry {
                Ok(entry) => entries.push(entry),
                Err(_) => self.skipped += 1,
            }
        }
        entries.sort_by_key(|e| e.file_name());

        let mut subdirs = Vec::new();
        for entry in &entries {
            match EntryProbe::of_entry(entry) {
                EntryProbe::File(size) => {
                    let path = entry.path();
                    self.totals.record(FileCategory::of_path(&path), size);
                    self.top.offer(&path, size);
                }
                EntryProbe::Directory => subdirs.push(entry.path()),
                EntryProbe::NotAFile => {}
                EntryProbe::NotFound | EntryProbe::PermissionDenied | EntryProbe::Unreadable => {
                    self.skipped += 1;
                }
            }
        }
        // Reversed so the first name is popped, and fully walked, first.
        stack.extend(subdirs.into_iter().rev());
        Ok(())
    }
}

/// Walk `root` depth-first and aggregate every regular file beneath it.
///
/// Only problems with `root` itself are errors. Anything that goes wrong
/// below it is counted in `skipped_entries` and the walk continues.
pub fn scan(root: &Path, largest_files: usize) -> Result<FileSummary, CollectError> {
    let _span = tracing::debug_span!("files.scan", root = %root.display()).entered();

    let meta = fs::metadata(root).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => CollectError::ScanRootMissing(root.to_path_buf()),
        _ => CollectError::ScanRootUnreadable {
            path: root.to_path_buf(),
            reason: err.to_string(),
        },
    })?;
    if !meta.is_dir() {
        return Err(CollectError::ScanRootNotDirectory(root.to_path_buf()));
    }

    let mut walk = Walk {
        totals: CategoryTotals::default(),
        top: TopFiles::new(largest_files),
        skipped: 0,
    };
    let mut stack = Vec::new();
    walk.visit_dir(root, &mut stack)
        .map_err(|err| CollectError::ScanRootUnreadable {
            path: root.to_path_buf(),
            reason: err.to_string(),
        })?;

    while let Some(dir) = stack.pop() {
        if let Err(err) = walk.visit_dir(&dir, &mut stack) {
            tracing::trace!(dir = %dir.display(), error = %err, "skipping directory");
            walk.skipped += 1;
        }
    }

    let summary = FileSummary {
        scan_root: root.to_path_buf(),
        totals: walk.totals,
        largest_files: walk.top.into_sorted(),
        skipped_entries: walk.skipped,
    };
    tracing::debug!(
        files = summary.total_files(),
        skipped = summary.skipped_entries,
        "filesystem scan finished"
    );
    Ok(summary)
}
