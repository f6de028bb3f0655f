//! Reads upload files and validates them chunk by chunk.

use anyhow::{Context, Result};
use battlemap_core::config::IngestConfig;
use battlemap_core::{BatchReport, BattleRecord, ChunkedValidator, IngestSummary, parse_batch};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// One validated upload file.
#[derive(Debug)]
pub struct FileUpload {
    pub path: PathBuf,
    pub size: u64,
    pub report: BatchReport,
    /// Validation stopped early; `report` only covers the completed chunks.
    pub cancelled: bool,
}

#[derive(Debug, Default)]
pub struct UploadOutcome {
    pub uploads: Vec<FileUpload>,
    /// Files that could not be read or were not a record list.
    pub failures: Vec<(PathBuf, String)>,
    /// Files never opened because the run was interrupted first.
    pub skipped: Vec<PathBuf>,
    /// Ctrl-C arrived at any point while loading.
    pub interrupted: bool,
}

impl UploadOutcome {
    pub fn into_records(self) -> Vec<BattleRecord> {
        self.uploads
            .into_iter()
            .flat_map(|upload| upload.report.into_records())
            .collect()
    }

    pub fn summary(&self, max_reasons: usize) -> IngestSummary {
        let mut total = IngestSummary::default();
        for upload in &self.uploads {
            let summary = upload.report.summary(max_reasons);
            total.loaded += summary.loaded;
            total.failed += summary.failed;
            total.out_of_bounds += summary.out_of_bounds;
            for reason in summary.reasons {
                if total.reasons.len() < max_reasons {
                    total
                        .reasons
                        .push(format!("{}: {}", upload.path.display(), reason));
                }
            }
        }
        total
    }

    /// True when the loaded records may not cover every input file.
    pub fn was_cancelled(&self) -> bool {
        self.interrupted || !self.skipped.is_empty() || self.uploads.iter().any(|u| u.cancelled)
    }
}

/// Ctrl-C handling for one loading run.
///
/// The first Ctrl-C while loading sets `cancelled`, which is checked between
/// chunks. A second Ctrl-C, or any Ctrl-C after the guard is dropped, exits
/// the process: tokio never restores the default SIGINT action.
struct CancelGuard {
    cancelled: Arc<AtomicBool>,
    loading: Arc<AtomicBool>,
}

impl CancelGuard {
    fn install() -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let loading = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&cancelled);
        let active = Arc::clone(&loading);
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if active.load(Ordering::SeqCst) && !flag.swap(true, Ordering::SeqCst) {
                    eprintln!("Interrupted, keeping records validated so far (Ctrl-C again to quit)");
                    tracing::warn!("Interrupted, keeping records validated so far");
                    continue;
                }
                tracing::warn!("Interrupted, exiting");
                std::process::exit(130);
            }
        });
        Self { cancelled, loading }
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.loading.store(false, Ordering::SeqCst);
    }
}

fn progress_bar(len: usize, path: &Path, quiet: u8) -> ProgressBar {
    if quiet > 0 {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    let style = ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar.set_message(file_label(path));
    bar
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

async fn load_file(
    path: &Path,
    ingest: &IngestConfig,
    cancelled: &AtomicBool,
    quiet: u8,
) -> Result<FileUpload> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {:?}", path))?;
    let items = parse_batch(&text).with_context(|| format!("Failed to parse {:?}", path))?;

    let bar = progress_bar(items.len(), path, quiet);
    let mut validator = ChunkedValidator::new(&items, ingest.chunk_size)
        .with_options(ingest.validation_options());
    let mut stopped = false;
    while !validator.is_finished() {
        if cancelled.load(Ordering::SeqCst) {
            stopped = true;
            break;
        }
        if let Some(progress) = validator.next_chunk() {
            bar.set_position(progress.processed as u64);
            let failed = validator.report().errors.len();
            if failed > 0 {
                bar.set_message(format!("{} ({} failed)", file_label(path), failed));
            }
        }
        tokio::task::yield_now().await;
    }
    bar.finish_and_clear();

    Ok(FileUpload {
        path: path.to_path_buf(),
        size: text.len() as u64,
        report: validator.into_report(),
        cancelled: stopped,
    })
}

/// Load every file in order. A file that fails to read or parse is recorded
/// in `failures` and the rest still load.
pub async fn load_files(files: &[PathBuf], ingest: &IngestConfig, quiet: u8) -> UploadOutcome {
    let guard = CancelGuard::install();
    load_files_until(files, ingest, &guard.cancelled, quiet).await
}

/// Same as [`load_files`], stopping between chunks once `cancelled` is set.
/// Files not reached are listed in `skipped`.
async fn load_files_until(
    files: &[PathBuf],
    ingest: &IngestConfig,
    cancelled: &AtomicBool,
    quiet: u8,
) -> UploadOutcome {
    let mut outcome = UploadOutcome::default();

    for (i, path) in files.iter().enumerate() {
        if cancelled.load(Ordering::SeqCst) {
            outcome.skipped.extend_from_slice(&files[i..]);
            break;
        }
        match load_file(path, ingest, cancelled, quiet).await {
            Ok(upload) => {
                if quiet == 0 {
                    tracing::info!(
                        "{:?} ({} bytes): {}",
                        upload.path,
                        upload.size,
                        upload.report.summary(0)
                    );
                }
                outcome.uploads.push(upload);
            }
            Err(e) => {
                if quiet < 2 {
                    tracing::warn!("{:#}", e);
                }
                outcome.failures.push((path.clone(), format!("{:#}", e)));
            }
        }
    }

    outcome.interrupted = cancelled.load(Ordering::SeqCst);
    if outcome.interrupted && quiet < 2 {
        tracing::warn!(
            "Load interrupted: {} files loaded, {} skipped",
            outcome.uploads.len(),
            outcome.skipped.len()
        );
    }
    outcome
}
