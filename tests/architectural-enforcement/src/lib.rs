//! Architectural Enforcement Integration Tests
//!
//! Source-level checks over the workspace:
//! - No sleep() calls in production code outside the timer service
//! - The client core stays free of surface dependencies
//!
//! The checks live under `tests/`; this library only locates the workspace.

use std::path::PathBuf;

/// Workspace root, resolved from this package's manifest directory
pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}
