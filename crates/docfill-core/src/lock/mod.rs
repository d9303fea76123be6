//! Advisory file locks for the catalog index
//!
//! Writers take an exclusive lock, readers a shared one, on a sidecar lock
//! file next to the data they protect. Acquisition polls with exponential
//! backoff until a deadline.

mod error;
mod guard;

pub use error::LockError;
pub use guard::LockGuard;

use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

#[cfg(test)]
mod tests;

const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(10);
const MAX_RETRY_DELAY: Duration = Duration::from_millis(500);
const SLOW_LOCK_THRESHOLD: Duration = Duration::from_secs(2);

/// Kind of lock to take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Many holders at once; excludes `Exclusive`
    Shared,
    /// Single holder
    Exclusive,
}

/// Acquire a lock on `lock_path`, waiting at most `timeout`
///
/// The lock file and its parent directories are created when missing. The
/// lock is released when the returned guard is dropped.
///
/// # Examples
///
/// ```no_run
/// use docfill_core::lock::{acquire, LockMode};
/// use std::time::Duration;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let guard = acquire(".docfill/catalog.lock".as_ref(), LockMode::Exclusive, Duration::from_secs(30))?;
/// // update catalog.json
/// drop(guard);
/// # Ok(())
/// # }
/// ```
pub fn acquire(lock_path: &Path, mode: LockMode, timeout: Duration) -> Result<LockGuard, LockError> {
    let io_error = |operation: &'static str| {
        move |source: std::io::Error| LockError::Io {
            source,
            path: lock_path.to_path_buf(),
            operation,
        }
    };

    if let Some(parent) = lock_path.parent() {
        fs::create_dir_all(parent).map_err(io_error("create parent directories"))?;
    }

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)
        .map_err(io_error("open lock file"))?;

    let start = Instant::now();
    let mut delay = INITIAL_RETRY_DELAY;
    let mut reported = false;

    loop {
        let attempt = match mode {
            LockMode::Shared => FileExt::try_lock_shared(&file),
            LockMode::Exclusive => FileExt::try_lock_exclusive(&file),
        };

        match attempt {
            Ok(()) => {
                return Ok(LockGuard {
                    file,
                    path: lock_path.to_path_buf(),
                    mode,
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                let elapsed = start.elapsed();
                if elapsed >= timeout {
                    return Err(LockError::Timeout {
                        path: lock_path.to_path_buf(),
                        waited: elapsed,
                    });
                }
                if !reported && elapsed >= SLOW_LOCK_THRESHOLD {
                    tracing::info!(path = %lock_path.display(), ?mode, "waiting for lock");
                    reported = true;
                }
                thread::sleep(delay.min(timeout.saturating_sub(elapsed)));
                delay = (delay * 2).min(MAX_RETRY_DELAY);
            }
            Err(e) => return Err(io_error("acquire lock")(e)),
        }
    }
}
