//! Timing scopes and the sync debug log.
//!
//! Scopes report through `tracing` when enabled with `--perf`. The debug log
//! is a plain timestamped file of sync events (echo verdicts, channel traffic,
//! watcher activity) switched on with `--sync-debug-log`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

static TIMING: AtomicBool = AtomicBool::new(false);
static SYNC_LOG: LazyLock<Mutex<Option<SyncLog>>> = LazyLock::new(|| Mutex::new(None));

/// Open debug log file and the instant its timestamps count from.
#[derive(Debug)]
struct SyncLog {
    opened: Instant,
    out: BufWriter<File>,
}

impl SyncLog {
    fn create(path: &Path) -> std::io::Result<Self> {
        let mut out = BufWriter::new(File::create(path)?);
        writeln!(out, "velvet sync debug log start")?;
        out.flush()?;
        Ok(Self {
            opened: Instant::now(),
            out,
        })
    }

    fn append(&mut self, name: &str, detail: &str) {
        let at_ms = self.opened.elapsed().as_secs_f64() * 1000.0;
        // A failing debug log never interrupts sync
        let _ = writeln!(self.out, "[{at_ms:>10.3} ms] {name}: {detail}");
        let _ = self.out.flush();
    }
}

fn sync_log() -> MutexGuard<'static, Option<SyncLog>> {
    SYNC_LOG.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Guard returned by [`scope`]; reports elapsed time when dropped.
#[derive(Debug)]
pub struct Scope {
    name: &'static str,
    started: Instant,
}

impl Drop for Scope {
    fn drop(&mut self) {
        if is_enabled() {
            let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
            tracing::info!(target: "velvet::perf", scope = self.name, elapsed_ms, "perf");
        }
    }
}

pub fn set_enabled(enabled: bool) {
    TIMING.store(enabled, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    TIMING.load(Ordering::Relaxed)
}

/// Time the enclosing block.
pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        started: Instant::now(),
    }
}

/// Start writing the sync debug log to `path`, or stop with `None`.
///
/// # Errors
///
/// Returns an error if the log file cannot be created or written.
pub fn set_debug_log_path(path: Option<&Path>) -> std::io::Result<()> {
    let next = path.map(SyncLog::create).transpose()?;
    *sync_log() = next;
    Ok(())
}

pub fn is_debug_log_enabled() -> bool {
    sync_log().is_some()
}

/// Record one sync event: always as a `velvet::sync` trace, and in the debug
/// log file when one is open.
pub fn log_event(name: &str, detail: impl AsRef<str>) {
    let detail = detail.as_ref();
    tracing::trace!(target: "velvet::sync", event = name, detail);
    if let Some(log) = sync_log().as_mut() {
        log.append(name, detail);
    }
}
