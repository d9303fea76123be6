use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LockError {
    #[error("timed out after {waited:?} waiting for lock on {}", path.display())]
    Timeout { path: PathBuf, waited: Duration },

    #[error("failed to {operation} for {}: {source}", path.display())]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
        operation: &'static str,
    },
}
