use std::path::{Path, PathBuf};

/// Resolve the stride project root.
///
/// Priority:
/// 1. `--root` flag / `STRIDE_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.stride/`
/// 3. Walk upward from `cwd` looking for `.git/`
/// 4. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_marker(&cwd, ".stride")
        .or_else(|| find_marker(&cwd, ".git"))
        .unwrap_or(cwd)
}

/// Nearest ancestor of `start` (inclusive) containing a `marker` directory.
fn find_marker(start: &Path, marker: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(marker).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_stride_dir_from_subdirectory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".stride")).unwrap();
        let subdir = dir.path().join("src/deep");
        std::fs::create_dir_all(&subdir).unwrap();

        assert_eq!(find_marker(&subdir, ".stride").as_deref(), Some(dir.path()));
    }

    #[test]
    fn stride_marker_beats_git() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        let project = dir.path().join("app");
        std::fs::create_dir_all(project.join(".stride")).unwrap();

        assert_eq!(find_marker(&project, ".stride").as_deref(), Some(project.as_path()));
        assert_eq!(find_marker(&project, ".git").as_deref(), Some(dir.path()));
    }
}
