use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional project settings from `.stride/config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrideConfig {
    #[serde(default)]
    pub project: String,
    /// Implementation log entries attached to a detailed sprint view.
    #[serde(default = "default_recent_log_limit")]
    pub recent_log_limit: usize,
    /// Folder-name prefix selected by the analytics scan.
    #[serde(default = "default_analytics_prefix")]
    pub analytics_prefix: String,
}

fn default_recent_log_limit() -> usize {
    5
}

fn default_analytics_prefix() -> String {
    "sprint-".to_string()
}

impl Default for StrideConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            recent_log_limit: default_recent_log_limit(),
            analytics_prefix: default_analytics_prefix(),
        }
    }
}

impl StrideConfig {
    /// Load the config, falling back to defaults when the file is absent.
    ///
    /// An empty `project` is filled with the root directory name.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        let mut config = if path.exists() {
            let data = std::fs::read_to_string(&path)?;
            if data.trim().is_empty() {
                Self::default()
            } else {
                serde_yaml::from_str(&data)?
            }
        } else {
            Self::default()
        };

        if config.project.is_empty() {
            config.project = root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "project".to_string());
        }
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
