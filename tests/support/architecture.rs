//! Source scanning helpers for layering contracts.

use std::fs;
use std::path::{Path, PathBuf};

/// One matching source line: (path relative to the crate root, line number, text).
pub type Hit = (String, usize, String);

fn crate_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn display_path(path: &Path) -> String {
    path.strip_prefix(crate_root())
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn rust_sources(dir: &Path) -> Vec<PathBuf> {
    let mut pending = vec![dir.to_path_buf()];
    let mut sources = Vec::new();

    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir)
            .unwrap_or_else(|e| panic!("failed to read dir {}: {e}", dir.display()));
        for entry in entries {
            let path = entry
                .unwrap_or_else(|e| panic!("failed to read dir entry: {e}"))
                .path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                sources.push(path);
            }
        }
    }

    sources.sort();
    sources
}

/// Every line under `relative_dir` containing any of `patterns`.
pub fn find_lines_containing(relative_dir: &str, patterns: &[&str]) -> Vec<Hit> {
    rust_sources(&crate_root().join(relative_dir))
        .into_iter()
        .flat_map(|file| {
            let content = fs::read_to_string(&file)
                .unwrap_or_else(|e| panic!("failed to read {}: {e}", file.display()));
            let shown = display_path(&file);
            content
                .lines()
                .enumerate()
                .filter(|(_, line)| patterns.iter().any(|p| line.contains(p)))
                .map(|(idx, line)| (shown.clone(), idx + 1, line.to_string()))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Like [`find_lines_containing`], skipping the listed files.
pub fn find_lines_containing_except_files(
    relative_dir: &str,
    patterns: &[&str],
    allowed_relative_files: &[&str],
) -> Vec<Hit> {
    find_lines_containing(relative_dir, patterns)
        .into_iter()
        .filter(|(path, _, _)| !allowed_relative_files.contains(&path.as_str()))
        .collect()
}
