//! Assertions over the mirrored tree

use std::collections::BTreeSet;
use std::path::Path;
use walkdir::WalkDir;

/// Every regular file below `root`, as `/`-joined paths relative to it
pub fn files_under(root: &Path) -> BTreeSet<String> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            e.path().strip_prefix(root).ok().map(|rel| {
                rel.components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/")
            })
        })
        .collect()
}

/// Data files only: skips dot-files such as the day manifest
pub fn data_files_under(root: &Path) -> BTreeSet<String> {
    files_under(root)
        .into_iter()
        .filter(|p| !p.rsplit('/').next().unwrap_or("").starts_with('.'))
        .collect()
}
