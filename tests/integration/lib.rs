//! Shared helpers for the nodekeys integration tests.

use std::path::{Path, PathBuf};

/// Mode bits (permission part only) of `path`.
#[cfg(unix)]
pub fn mode_of(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o777)
        .unwrap_or_else(|e| panic!("metadata for {}: {e}", path.display()))
}

/// Sorted file names directly inside `dir`.
pub fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("read_dir {}: {e}", dir.display()))
        .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// The node data directory used by the scenario tests.
pub fn node_dir(root: &Path) -> PathBuf {
    root.join("data").join("node1")
}
