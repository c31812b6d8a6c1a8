//! Ingestion orchestrator: extract → derive → write → upsert, one file at a time.

use crate::core::extract::{LapWithPoints, laps_date, parse_file};
use crate::core::sink::{RecordSink, SinkContext};
use crate::errors::{AppError, AppResult};
use crate::models::record::Mode;
use crate::models::{RecordBatch, RecordKind};
use crate::ui::messages::{error, info, success, warning};
use crate::utils::path::{SANITIZED_FILENAME, sanitize_source_name, validate_safe_path};
use std::fs;
use std::path::{Path, PathBuf};

/// Extension (case-insensitive) picked up in directory mode.
pub const TCX_EXTENSION: &str = "tcx";

/// One successful (sink, kind) write.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchOutcome {
    pub sink: &'static str,
    pub kind: RecordKind,
    pub target: String,
    pub written: usize,
}

/// One failed (sink, kind) write; the other branches still ran.
#[derive(Debug)]
pub struct BranchFailure {
    pub sink: &'static str,
    pub kind: RecordKind,
    pub error: AppError,
}

#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub source_file: String,
    pub date: String,
    pub laps: usize,
    pub trackpoints: usize,
    pub branches: Vec<BranchOutcome>,
    pub failures: Vec<BranchFailure>,
}

impl FileReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of a whole run (single file or directory).
#[derive(Debug, Default)]
pub struct IngestSummary {
    pub files: Vec<FileReport>,
    /// Files whose ingestion was abandoned (unreadable, malformed).
    pub failed: Vec<(PathBuf, AppError)>,
}

impl IngestSummary {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty() || self.files.iter().any(|f| !f.is_complete())
    }
}

/// Runs the configured branches against every registered sink.
///
/// Sinks are used in registration order, so registering the workbook first
/// gives the write-then-upsert ordering. A sink that fails for one kind
/// stops the later sinks for that kind only.
pub struct Ingestor<'a> {
    mode: Mode,
    sinks: Vec<&'a mut dyn RecordSink>,
}

impl<'a> Ingestor<'a> {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            sinks: Vec::new(),
        }
    }

    pub fn with_sink(mut self, sink: &'a mut dyn RecordSink) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Ingest every input in order; a failing file never stops the others.
    pub fn run(&mut self, inputs: &[PathBuf]) -> IngestSummary {
        let mut summary = IngestSummary::default();

        for path in inputs {
            info(format!("Processing {}", path.display()));
            match self.ingest_file(path) {
                Ok(report) => {
                    for f in &report.failures {
                        error(format!(
                            "{} {} write failed for '{}': {}",
                            f.sink,
                            f.kind.as_str(),
                            report.source_file,
                            f.error
                        ));
                    }
                    if report.is_complete() {
                        success(format!(
                            "{} laps / {} trackpoints stored from '{}'",
                            report.laps, report.trackpoints, report.source_file
                        ));
                    }
                    summary.files.push(report);
                }
                Err(e) => {
                    error(format!("Skipping '{}': {e}", path.display()));
                    summary.failed.push((path.clone(), e));
                }
            }
        }

        summary
    }

    /// Ingest one file. Extraction failures abort the file; sink failures
    /// are collected per branch.
    pub fn ingest_file(&mut self, path: &Path) -> AppResult<FileReport> {
        let laps = parse_file(path)?;
        let date = laps_date(&laps);

        let source_file = sanitize_source_name(path);
        if source_file == SANITIZED_FILENAME {
            warning(format!(
                "Unsafe file name '{}', storing records as '{SANITIZED_FILENAME}'",
                path.display()
            ));
        }

        let batches: Vec<RecordBatch> = self
            .mode
            .kinds()
            .iter()
            .map(|kind| build_batch(*kind, &laps))
            .collect();

        let ctx = SinkContext {
            date: &date,
            source_file: &source_file,
        };

        let mut branches = Vec::new();
        let mut failures = Vec::new();

        // Each kind is a linear chain over the sinks: a failing sink ends
        // that kind's chain, the other kind still runs.
        for batch in &batches {
            let kind = batch.kind();
            for sink in self.sinks.iter_mut() {
                match sink.persist(batch, &ctx) {
                    Ok(written) => branches.push(BranchOutcome {
                        sink: sink.name(),
                        kind,
                        target: sink.target(kind, &ctx),
                        written,
                    }),
                    Err(error) => {
                        failures.push(BranchFailure {
                            sink: sink.name(),
                            kind,
                            error,
                        });
                        break;
                    }
                }
            }
        }

        Ok(FileReport {
            path: path.to_path_buf(),
            source_file,
            date,
            laps: laps.len(),
            trackpoints: laps.iter().map(|l| l.trackpoints.len()).sum(),
            branches,
            failures,
        })
    }
}

fn build_batch(kind: RecordKind, laps: &[LapWithPoints]) -> RecordBatch {
    match kind {
        RecordKind::Summary => RecordBatch::Summary(laps.iter().map(|l| l.lap.clone()).collect()),
        RecordKind::Detail => RecordBatch::Detail(
            laps.iter()
                .flat_map(|l| l.trackpoints.iter().cloned())
                .collect(),
        ),
    }
}

/// Resolve the input argument into the list of files to ingest.
///
/// A file is returned as-is. A directory yields its `.tcx` files (any case),
/// sorted; entries with unsafe names are skipped with a warning.
pub fn collect_inputs(input: &Path) -> AppResult<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(AppError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("input path '{}' does not exist", input.display()),
        )));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(input)? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warning(format!("Cannot read entry in '{}': {e}", input.display()));
                continue;
            }
        };

        let path = entry.path();
        let has_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(TCX_EXTENSION));
        if !has_ext || !path.is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if !validate_safe_path(&name) {
            warning(format!("Skipping unsafe path '{}'", path.display()));
            continue;
        }

        files.push(path);
    }

    files.sort();
    Ok(files)
}
