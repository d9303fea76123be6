//! Tests for the substitution engine
//!
//! Organized by concern: run-level scanning first, then whole documents.

use super::*;

// Test helper functions
mod helpers;

mod split_runs;
