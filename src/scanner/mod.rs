//! Media library scanner.
//!
//! This module turns a directory tree into a list of media file records
//! with minimal re-probing: files already present in a prior snapshot and
//! unmodified since their last probe are reused without touching ffprobe.
//! Probing runs on a bounded pool of workers pulling from a shared queue,
//! with live progress reporting and cooperative cancellation.

pub mod prober;
pub mod walker;

pub use prober::{FfprobeProber, StreamProbe};

use crate::library::{MediaFileRecord, Snapshot};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Default number of concurrent probe workers.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Progress callback for scan operations.
pub type ProgressCallback = Box<dyn Fn(ScanProgress) + Send + Sync>;

/// Scan lifecycle states. Forward-only within one run:
/// idle → scanning → {completed | cancelled | error}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    #[default]
    Idle,
    Scanning,
    Completed,
    Cancelled,
    Error,
}

/// A per-file scan failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanFileError {
    pub path: PathBuf,
    pub error: String,
}

/// Scan progress snapshot, emitted on every state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanProgress {
    pub status: ScanStatus,
    pub current_file: Option<PathBuf>,
    pub processed_count: usize,
    pub total_count: Option<usize>,
    pub error_count: usize,
    pub skipped_count: usize,
    pub errors: Vec<ScanFileError>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl ScanProgress {
    fn start() -> Self {
        Self {
            status: ScanStatus::Scanning,
            current_file: None,
            processed_count: 0,
            total_count: None,
            error_count: 0,
            skipped_count: 0,
            errors: Vec::new(),
            started_at: Utc::now(),
            completed_at: None,
            error_message: None,
        }
    }
}

/// Final result of a scan.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Records in completion order; callers must not rely on ordering
    /// being stable across runs.
    pub records: Vec<MediaFileRecord>,
    /// The terminal progress snapshot.
    pub progress: ScanProgress,
}

/// Errors from the scan orchestration itself (per-file probe failures are
/// reported in [`ScanProgress::errors`], not here).
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("a scan is already running")]
    AlreadyRunning,

    #[error("scan task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Scanner options.
pub struct ScanOptions {
    /// Number of concurrent probe workers.
    pub concurrency: usize,
    /// Invoked with a fresh progress snapshot on every state change.
    pub on_progress: Option<ProgressCallback>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            on_progress: None,
        }
    }
}

/// Cancels a scanner's in-flight scan from another task.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Request cooperative cancellation. Workers observe the flag between
    /// queue dequeues; a probe already in flight runs to completion.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

/// Incremental directory scanner with a bounded concurrent probe pool.
///
/// One scanner owns one scan slot: a second `scan` call while one is
/// running fails with [`ScanError::AlreadyRunning`], and starting a new
/// scan resets any cancellation request left over from the previous run.
pub struct Scanner {
    prober: Arc<dyn StreamProbe>,
    concurrency: usize,
    on_progress: Option<Arc<dyn Fn(ScanProgress) + Send + Sync>>,
    running: AtomicBool,
    cancel: Arc<AtomicBool>,
}

impl Scanner {
    /// Create a scanner around the given prober.
    pub fn new(prober: Arc<dyn StreamProbe>, options: ScanOptions) -> Self {
        Self {
            prober,
            concurrency: options.concurrency,
            on_progress: options.on_progress.map(Arc::from),
            running: AtomicBool::new(false),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation of the in-flight scan.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Handle for cancelling from another task.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            flag: self.cancel.clone(),
        }
    }

    /// Scan `root`, reusing `snapshot` entries for files whose modification
    /// time has not advanced past their last probe. Pass an empty snapshot
    /// for a full scan.
    pub async fn scan(&self, root: &Path, snapshot: Snapshot) -> Result<ScanOutcome, ScanError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ScanError::AlreadyRunning);
        }
        let _slot = ScanSlot(&self.running);

        // A new scan supersedes any stale cancellation request
        self.cancel.store(false, Ordering::SeqCst);

        info!("Scanning directory: {:?}", root);

        let state = Arc::new(ScanState {
            queue: Mutex::new(VecDeque::new()),
            progress: Mutex::new(ScanProgress::start()),
            records: Mutex::new(Vec::new()),
            on_progress: self.on_progress.clone(),
        });

        // Enumerate candidates off the async workers
        let walk_root = root.to_path_buf();
        let walk_cancel = self.cancel.clone();
        let files =
            tokio::task::spawn_blocking(move || walker::find_media_files(&walk_root, &walk_cancel))
                .await?;

        state.progress.lock().total_count = Some(files.len());
        state.emit();

        if self.cancel.load(Ordering::SeqCst) {
            let progress = state.finish(ScanStatus::Cancelled, None);
            return Ok(ScanOutcome {
                records: Vec::new(),
                progress,
            });
        }

        state.queue.lock().extend(files);

        let snapshot = Arc::new(snapshot);
        let workers = self.concurrency.max(1);
        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let state = state.clone();
            let prober = self.prober.clone();
            let snapshot = snapshot.clone();
            let cancel = self.cancel.clone();
            handles.push(tokio::spawn(run_worker(state, prober, snapshot, cancel)));
        }
        for handle in handles {
            handle.await?;
        }

        let records = std::mem::take(&mut *state.records.lock());

        let error_count = state.progress.lock().error_count;
        let (status, message) = if self.cancel.load(Ordering::SeqCst) {
            (ScanStatus::Cancelled, None)
        } else if records.is_empty() && error_count > 0 {
            (
                ScanStatus::Error,
                Some(format!("all {} files failed to scan", error_count)),
            )
        } else {
            (ScanStatus::Completed, None)
        };
        let progress = state.finish(status, message);

        info!(
            "Scan finished: {:?}, {} records, {} skipped, {} errors",
            status,
            records.len(),
            progress.skipped_count,
            progress.error_count
        );

        Ok(ScanOutcome { records, progress })
    }
}

/// Clears the scanner's running flag when a scan ends, however it ends.
struct ScanSlot<'a>(&'a AtomicBool);

impl Drop for ScanSlot<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// State shared between the probe workers of one scan.
struct ScanState {
    queue: Mutex<VecDeque<PathBuf>>,
    progress: Mutex<ScanProgress>,
    records: Mutex<Vec<MediaFileRecord>>,
    on_progress: Option<Arc<dyn Fn(ScanProgress) + Send + Sync>>,
}

impl ScanState {
    fn emit(&self) {
        if let Some(callback) = &self.on_progress {
            let snapshot = self.progress.lock().clone();
            callback(snapshot);
        }
    }

    fn finish(&self, status: ScanStatus, error_message: Option<String>) -> ScanProgress {
        let final_progress = {
            let mut progress = self.progress.lock();
            progress.status = status;
            progress.completed_at = Some(Utc::now());
            progress.current_file = None;
            progress.error_message = error_message;
            progress.clone()
        };
        self.emit();
        final_progress
    }
}

enum Processed {
    Reused(MediaFileRecord),
    Probed(MediaFileRecord),
}

async fn run_worker(
    state: Arc<ScanState>,
    prober: Arc<dyn StreamProbe>,
    snapshot: Arc<Snapshot>,
    cancel: Arc<AtomicBool>,
) {
    loop {
        if cancel.load(Ordering::SeqCst) {
            return;
        }
        let Some(path) = state.queue.lock().pop_front() else {
            return;
        };

        state.progress.lock().current_file = Some(path.clone());

        match process_file(&path, prober.as_ref(), &snapshot).await {
            Ok(Processed::Reused(record)) => {
                state.records.lock().push(record);
                state.progress.lock().skipped_count += 1;
            }
            Ok(Processed::Probed(record)) => {
                state.records.lock().push(record);
            }
            Err(e) => {
                warn!("Failed to scan file {:?}: {:#}", path, e);
                let mut progress = state.progress.lock();
                progress.error_count += 1;
                progress.errors.push(ScanFileError {
                    path: path.clone(),
                    error: format!("{:#}", e),
                });
            }
        }

        state.progress.lock().processed_count += 1;
        state.emit();
    }
}

async fn process_file(
    path: &Path,
    prober: &dyn StreamProbe,
    snapshot: &Snapshot,
) -> anyhow::Result<Processed> {
    if let Some(entry) = snapshot.get(path) {
        let metadata = tokio::fs::metadata(path).await?;
        let mtime: DateTime<Utc> = metadata.modified()?.into();

        // Unmodified since the last probe: reuse the stored record verbatim
        if mtime <= entry.scanned_at {
            return Ok(Processed::Reused(entry.record.clone()));
        }

        let info = prober.probe(path).await?;
        let mut record = MediaFileRecord::from_probe(info);
        // The id follows the path string across rescans
        record.id = entry.record.id;
        return Ok(Processed::Probed(record));
    }

    let info = prober.probe(path).await?;
    Ok(Processed::Probed(MediaFileRecord::from_probe(info)))
}
