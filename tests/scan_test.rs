//! Scanner integration tests
//!
//! Drive the incremental scan scheduler with injected stub probers over
//! real temp directory trees: full scans, snapshot reuse, failure
//! isolation, cancellation, and the single-flight guard.

use anyhow::Result;
use archivist::library::{MediaFileRecord, Snapshot, SnapshotEntry};
use archivist::scanner::{
    CancelHandle, ScanError, ScanOptions, ScanProgress, ScanStatus, Scanner, StreamProbe,
};
use archivist_av::MediaInfo;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ===== Stub probers =====

fn stub_info(path: &Path) -> MediaInfo {
    MediaInfo {
        path: path.to_path_buf(),
        size_bytes: 1024,
        container: "matroska,webm".to_string(),
        duration_secs: Some(60.0),
        bitrate: Some(1_000_000),
        video_streams: vec![],
        audio_streams: vec![],
        subtitle_streams: vec![],
    }
}

/// Returns canned metadata and counts invocations.
struct StubProber {
    calls: AtomicUsize,
}

impl StubProber {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamProbe for StubProber {
    async fn probe(&self, path: &Path) -> Result<MediaInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(stub_info(path))
    }
}

/// Fails for paths whose filename contains the marker.
struct FailingProber {
    marker: &'static str,
}

#[async_trait]
impl StreamProbe for FailingProber {
    async fn probe(&self, path: &Path) -> Result<MediaInfo> {
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        if self.marker.is_empty() || name.contains(self.marker) {
            anyhow::bail!("probe failed for {}", name);
        }
        Ok(stub_info(path))
    }
}

/// Panics when invoked; proves a path was never probed.
struct PanicProber;

#[async_trait]
impl StreamProbe for PanicProber {
    async fn probe(&self, path: &Path) -> Result<MediaInfo> {
        panic!("probe must not be called for {:?}", path);
    }
}

/// Requests cancellation from inside the first probe.
struct CancellingProber {
    handle: Mutex<Option<CancelHandle>>,
}

#[async_trait]
impl StreamProbe for CancellingProber {
    async fn probe(&self, path: &Path) -> Result<MediaInfo> {
        if let Some(handle) = &*self.handle.lock() {
            handle.cancel();
        }
        Ok(stub_info(path))
    }
}

/// Parks inside the probe until released, so a scan can be held in flight.
struct BlockingProber {
    started: tokio::sync::Notify,
    release: tokio::sync::Notify,
}

#[async_trait]
impl StreamProbe for BlockingProber {
    async fn probe(&self, path: &Path) -> Result<MediaInfo> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(stub_info(path))
    }
}

// ===== Helpers =====

fn touch(path: &Path) {
    fs::write(path, b"x").unwrap();
}

fn options(concurrency: usize) -> ScanOptions {
    ScanOptions {
        concurrency,
        on_progress: None,
    }
}

fn snapshot_entry(record: &MediaFileRecord) -> SnapshotEntry {
    SnapshotEntry {
        scanned_at: record.scanned_at,
        record: record.clone(),
    }
}

// ===== Tests =====

#[tokio::test]
async fn test_full_scan_probes_every_media_file() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    touch(&root.join("a.mkv"));
    touch(&root.join("notes.txt"));
    fs::create_dir(root.join("season1")).unwrap();
    touch(&root.join("season1/b.mp4"));
    fs::create_dir(root.join(".hidden")).unwrap();
    touch(&root.join(".hidden/c.mkv"));

    let prober = StubProber::new();
    let scanner = Scanner::new(prober.clone(), options(4));

    let outcome = scanner.scan(root, Snapshot::new()).await.unwrap();

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(prober.calls(), 2);
    assert_eq!(outcome.progress.status, ScanStatus::Completed);
    assert_eq!(outcome.progress.total_count, Some(2));
    assert_eq!(outcome.progress.processed_count, 2);
    assert_eq!(outcome.progress.skipped_count, 0);
    assert_eq!(outcome.progress.error_count, 0);

    // Every record was probed within the scan window
    let completed_at = outcome.progress.completed_at.unwrap();
    for record in &outcome.records {
        assert!(record.scanned_at >= outcome.progress.started_at);
        assert!(record.scanned_at <= completed_at);
    }
}

#[tokio::test]
async fn test_unmodified_files_are_reused_without_probing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.mkv");
    touch(&path);

    // Snapshot newer than the file's mtime, with margin for coarse
    // filesystem timestamps
    let mut prior = MediaFileRecord::from_probe(stub_info(&path));
    prior.scanned_at = Utc::now() + Duration::minutes(1);

    let mut snapshot = Snapshot::new();
    snapshot.insert(path.clone(), snapshot_entry(&prior));

    let scanner = Scanner::new(Arc::new(PanicProber), options(2));
    let outcome = scanner.scan(dir.path(), snapshot).await.unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].id, prior.id);
    assert_eq!(outcome.records[0].scanned_at, prior.scanned_at);
    assert_eq!(outcome.progress.skipped_count, 1);
    assert_eq!(outcome.progress.processed_count, 1);
    assert_eq!(outcome.progress.status, ScanStatus::Completed);
}

#[tokio::test]
async fn test_modified_file_is_reprobed_and_keeps_its_id() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.mkv");
    touch(&path);

    // Snapshot older than the file's mtime forces a reprobe
    let mut prior = MediaFileRecord::from_probe(stub_info(&path));
    prior.scanned_at = Utc::now() - Duration::hours(1);

    let mut snapshot = Snapshot::new();
    snapshot.insert(path.clone(), snapshot_entry(&prior));

    let prober = StubProber::new();
    let scanner = Scanner::new(prober.clone(), options(2));
    let outcome = scanner.scan(dir.path(), snapshot).await.unwrap();

    assert_eq!(prober.calls(), 1);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].id, prior.id);
    assert!(outcome.records[0].scanned_at > prior.scanned_at);
    assert_eq!(outcome.progress.skipped_count, 0);
}

#[tokio::test]
async fn test_probe_failures_are_isolated_per_file() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    touch(&root.join("good.mkv"));
    touch(&root.join("bad.mkv"));

    let scanner = Scanner::new(Arc::new(FailingProber { marker: "bad" }), options(4));
    let outcome = scanner.scan(root, Snapshot::new()).await.unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].filename, "good.mkv");
    assert_eq!(outcome.progress.error_count, 1);
    assert_eq!(outcome.progress.errors.len(), 1);
    assert_eq!(outcome.progress.errors[0].path, root.join("bad.mkv"));
    assert_eq!(outcome.progress.processed_count, 2);
    // One probe failure does not fail the scan
    assert_eq!(outcome.progress.status, ScanStatus::Completed);
}

#[tokio::test]
async fn test_accounting_adds_up_with_mixed_outcomes() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let reused = root.join("reused.mkv");
    touch(&reused);
    touch(&root.join("fresh.mkv"));
    touch(&root.join("bad.mkv"));

    let mut prior = MediaFileRecord::from_probe(stub_info(&reused));
    prior.scanned_at = Utc::now() + Duration::minutes(1);
    let mut snapshot = Snapshot::new();
    snapshot.insert(reused.clone(), snapshot_entry(&prior));

    let scanner = Scanner::new(Arc::new(FailingProber { marker: "bad" }), options(2));
    let outcome = scanner.scan(root, snapshot).await.unwrap();

    let progress = &outcome.progress;
    let probed = outcome.records.len() - progress.skipped_count;
    assert_eq!(progress.total_count, Some(3));
    assert_eq!(
        progress.skipped_count + probed + progress.error_count,
        progress.processed_count
    );
    assert_eq!(progress.processed_count, 3);
    assert_eq!(progress.skipped_count, 1);
    assert_eq!(progress.error_count, 1);
}

#[tokio::test]
async fn test_total_failure_escalates_to_error_status() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    touch(&root.join("a.mkv"));
    touch(&root.join("b.mkv"));

    let scanner = Scanner::new(Arc::new(FailingProber { marker: "" }), options(4));
    let outcome = scanner.scan(root, Snapshot::new()).await.unwrap();

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.progress.status, ScanStatus::Error);
    assert_eq!(outcome.progress.error_count, 2);
    let message = outcome.progress.error_message.unwrap();
    assert!(message.contains('2'), "unexpected message: {}", message);
}

#[tokio::test]
async fn test_empty_directory_completes_with_zero_total() {
    let dir = tempfile::tempdir().unwrap();

    let scanner = Scanner::new(Arc::new(PanicProber), options(4));
    let outcome = scanner.scan(dir.path(), Snapshot::new()).await.unwrap();

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.progress.status, ScanStatus::Completed);
    assert_eq!(outcome.progress.total_count, Some(0));
    assert_eq!(outcome.progress.processed_count, 0);
}

#[tokio::test]
async fn test_cancellation_mid_scan_is_terminal_and_partial() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    touch(&root.join("a.mkv"));
    touch(&root.join("b.mkv"));
    touch(&root.join("c.mkv"));

    let prober = Arc::new(CancellingProber {
        handle: Mutex::new(None),
    });
    // One worker makes the cancellation point deterministic: the first
    // probe cancels, the worker exits before dequeuing again
    let scanner = Scanner::new(prober.clone(), options(1));
    *prober.handle.lock() = Some(scanner.cancel_handle());

    let outcome = scanner.scan(root, Snapshot::new()).await.unwrap();

    assert_eq!(outcome.progress.status, ScanStatus::Cancelled);
    assert_eq!(outcome.progress.total_count, Some(3));
    assert!(outcome.progress.processed_count <= 3);
    assert!(outcome.progress.processed_count < 3);
    assert!(outcome.progress.completed_at.is_some());
}

#[tokio::test]
async fn test_second_scan_is_rejected_while_one_runs() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    touch(&root.join("a.mkv"));

    let prober = Arc::new(BlockingProber {
        started: tokio::sync::Notify::new(),
        release: tokio::sync::Notify::new(),
    });
    let scanner = Arc::new(Scanner::new(prober.clone(), options(1)));

    let background = {
        let scanner = scanner.clone();
        let root = root.clone();
        tokio::spawn(async move { scanner.scan(&root, Snapshot::new()).await })
    };

    // Wait until the first scan is inside a probe, then try to start another
    prober.started.notified().await;
    let err = scanner.scan(&root, Snapshot::new()).await.unwrap_err();
    assert!(matches!(err, ScanError::AlreadyRunning));

    prober.release.notify_one();
    let outcome = background.await.unwrap().unwrap();
    assert_eq!(outcome.progress.status, ScanStatus::Completed);

    // The slot is free again afterwards
    let prober = StubProber::new();
    let scanner = Scanner::new(prober, options(1));
    let outcome = scanner.scan(&root, Snapshot::new()).await.unwrap();
    assert_eq!(outcome.progress.status, ScanStatus::Completed);
}

#[tokio::test]
async fn test_progress_events_are_monotonic() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    for name in ["a.mkv", "b.mkv", "c.mkv", "d.mkv"] {
        touch(&root.join(name));
    }

    let events: Arc<Mutex<Vec<ScanProgress>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let scanner = Scanner::new(
        StubProber::new(),
        ScanOptions {
            concurrency: 2,
            on_progress: Some(Box::new(move |progress| {
                sink.lock().push(progress);
            })),
        },
    );

    let outcome = scanner.scan(root, Snapshot::new()).await.unwrap();
    assert_eq!(outcome.progress.status, ScanStatus::Completed);

    let events = events.lock();
    assert!(!events.is_empty());
    let mut last = 0;
    for event in events.iter() {
        assert!(event.processed_count >= last);
        last = event.processed_count;
    }
    let terminal = events.last().unwrap();
    assert_eq!(terminal.status, ScanStatus::Completed);
    assert_eq!(terminal.processed_count, 4);
    assert!(terminal.current_file.is_none());
}
