use crate::error::{Result, StrideError};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const STRIDE_DIR: &str = ".stride";

/// Entries below [`STRIDE_DIR`].
pub const SPRINTS_DIR: &str = "sprints";
pub const CONFIG_FILE: &str = "config.yaml";
pub const ANALYTICS_FILE: &str = "analytics.json";

// ---------------------------------------------------------------------------
// Sprint document names
// ---------------------------------------------------------------------------

pub const PROPOSAL_MD: &str = "proposal.md";
pub const PLAN_MD: &str = "plan.md";
pub const DESIGN_MD: &str = "design.md";
pub const IMPLEMENTATION_MD: &str = "implementation.md";
pub const RETROSPECTIVE_MD: &str = "retrospective.md";
pub const PROJECT_MD: &str = "project.md";

/// Files whose modification times feed the analytics checksum, in order.
pub const CHECKSUM_FILES: [&str; 4] = [PROJECT_MD, PLAN_MD, IMPLEMENTATION_MD, RETROSPECTIVE_MD];

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn stride_dir(root: &Path) -> PathBuf {
    root.join(STRIDE_DIR)
}

pub fn sprints_dir(root: &Path) -> PathBuf {
    stride_dir(root).join(SPRINTS_DIR)
}

pub fn sprint_dir(root: &Path, id: &str) -> PathBuf {
    sprints_dir(root).join(id)
}

pub fn config_path(root: &Path) -> PathBuf {
    stride_dir(root).join(CONFIG_FILE)
}

pub fn analytics_path(root: &Path) -> PathBuf {
    stride_dir(root).join(ANALYTICS_FILE)
}

// ---------------------------------------------------------------------------
// Sprint id validation
// ---------------------------------------------------------------------------

/// A sprint id names exactly one directory under `.stride/sprints`.
pub fn validate_sprint_id(id: &str) -> Result<()> {
    let bad = id.is_empty()
        || id == "."
        || id == ".."
        || id.contains('/')
        || id.contains('\\')
        || id.contains('\0');
    if bad {
        return Err(StrideError::InvalidSprintId(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
