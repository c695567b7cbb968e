use std::path::Path;

use walkdir::WalkDir;

use super::model::ExecutableCandidate;

/// File name suffixes offered as launch targets. Matched case-sensitively.
pub const EXECUTABLE_SUFFIXES: [&str; 5] = [".exe", ".bat", ".sh", ".appimage", ".app"];

pub fn is_executable_name(file_name: &str) -> bool {
    EXECUTABLE_SUFFIXES
        .iter()
        .any(|suffix| file_name.ends_with(suffix))
}

/// Walk `install_root` and collect every file with an executable suffix,
/// in traversal order. Unreadable entries are skipped; an empty result is
/// left for the user to resolve by hand.
pub fn locate(install_root: &Path) -> Vec<ExecutableCandidate> {
    WalkDir::new(install_root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let display_name = entry.file_name().to_str()?.to_string();
            if !is_executable_name(&display_name) {
                return None;
            }
            let absolute_path = std::path::absolute(entry.path())
                .unwrap_or_else(|_| entry.path().to_path_buf());
            Some(ExecutableCandidate {
                display_name,
                absolute_path,
            })
        })
        .collect()
}
