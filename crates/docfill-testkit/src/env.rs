//! Environment isolation utilities for testing
//!
//! Tests that read or write process environment variables (for example the
//! `DOCFILL_SOFFICE` override or `PATH` lookups) must be serialized.

use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

/// Static mutex to serialize tests that modify environment variables
pub static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Run `f` with an isolated HOME and the given environment overrides
///
/// Each `(name, value)` pair sets `name` to `value`, or removes it when `value`
/// is `None`. All touched variables (and HOME) are restored afterwards.
///
/// # Examples
///
/// ```no_run
/// use docfill_testkit::with_isolated_env;
///
/// with_isolated_env(&[("DOCFILL_SOFFICE", None), ("PATH", Some(""))], |_home| {
///     // soffice cannot be resolved in here
/// });
/// ```
pub fn with_isolated_env<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce(&Path) -> R,
{
    let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| {
        // Only serializes access; nothing to repair after a panic
        poisoned.into_inner()
    });

    let mut saved: Vec<(String, Option<String>)> = vars
        .iter()
        .map(|(name, _)| (name.to_string(), std::env::var(name).ok()))
        .collect();
    saved.push(("HOME".to_string(), std::env::var("HOME").ok()));

    let fake_home = TempDir::new().unwrap();

    // SAFETY: We hold ENV_LOCK, ensuring no other test is modifying env vars concurrently.
    unsafe {
        std::env::set_var("HOME", fake_home.path());
        for (name, value) in vars {
            match value {
                Some(value) => std::env::set_var(name, value),
                None => std::env::remove_var(name),
            }
        }
    }

    let result = f(fake_home.path());

    // SAFETY: We still hold ENV_LOCK, ensuring exclusive access to env vars.
    unsafe {
        for (name, value) in saved {
            match value {
                Some(value) => std::env::set_var(&name, value),
                None => std::env::remove_var(&name),
            }
        }
    }

    result
}
