use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::Local;

/// Last path component, used for the prompt. Falls back to the full path
/// when there is no file name (e.g. a drive root).
pub fn folder_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Append a timestamped line to the crash log. Failures are swallowed; the
/// log must never take the shell down with it.
pub fn debug_log(log_path: &Path, msg: &str) {
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(log_path) {
        let _ = writeln!(f, "[{}] {}", Local::now().format("%Y-%m-%d %H:%M:%S"), msg);
    }
}
