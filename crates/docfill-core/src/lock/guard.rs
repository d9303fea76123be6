use super::LockMode;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Held lock; released when dropped (closing the descriptor drops the
/// advisory lock)
#[derive(Debug)]
pub struct LockGuard {
    pub(crate) file: File,
    pub(crate) path: PathBuf,
    pub(crate) mode: LockMode,
}

impl LockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = fs2::FileExt::unlock(&self.file) {
            tracing::debug!(path = %self.path.display(), error = %e, "explicit unlock failed");
        }
    }
}
