use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::utils::config::PackagePaths;

/// Sibling temp path a file is staged into before being renamed over `dest`.
/// `dir/name` → `dir/.name.<pkg>.tmp`.
pub fn temp_path_for(dest: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(dest.file_name().unwrap_or_else(|| dest.as_os_str()));
    name.push(PackagePaths::get().temp_suffix());
    dest.parent().unwrap_or(Path::new(".")).join(name)
}

/// Remove a leftover staging file, ignoring errors (it may never have been created).
pub fn remove_temp(temp_path: &Path) {
    let _ = std::fs::remove_file(temp_path);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_is_hidden_sibling() {
        let t = temp_path_for(Path::new("/a/b/file.txt"));
        assert_eq!(t, PathBuf::from("/a/b/.file.txt.dirclone.tmp"));
    }
}
