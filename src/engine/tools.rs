//! Path and filter utilities

use std::path::{Path, PathBuf};

/// Convert absolute path to relative path from base
pub fn path_relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|p| p.to_path_buf())
}

/// Returns true if the path should be included in the walk (not the root, not excluded).
/// Patterns are matched against the file name and against the full path.
pub fn should_include_in_walk(path: &Path, root: &Path, exclude_patterns: &[String]) -> bool {
    if path == root {
        return false;
    }
    if exclude_patterns.is_empty() {
        return true;
    }
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return true,
    };
    let path_str = path.to_str().unwrap_or("");
    !exclude_patterns
        .iter()
        .any(|pattern| glob_match(pattern, name) || glob_match(pattern, path_str))
}

/// Glob matching with `*` and `?`. Every other character, `!` included, is literal.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    glob_match_chars(&p, &t)
}

fn glob_match_chars(p: &[char], t: &[char]) -> bool {
    match p.split_first() {
        None => t.is_empty(),
        Some(('*', rest)) => {
            if rest.is_empty() {
                return true; // trailing * matches everything
            }
            (0..=t.len()).any(|i| glob_match_chars(rest, &t[i..]))
        }
        Some(('?', rest)) => !t.is_empty() && glob_match_chars(rest, &t[1..]),
        Some((c, rest)) => t.first() == Some(c) && glob_match_chars(rest, &t[1..]),
    }
}

/// Check if mtime has changed beyond tolerance window
pub fn mtime_changed(new_mtime: i64, old_mtime: i64, tolerance_ns: i64) -> bool {
    let mtime_diff = (new_mtime - old_mtime).abs();
    mtime_diff > tolerance_ns
}

/// Mtime window in whole seconds to nanoseconds. `u32::MAX` seconds still fits in an `i64`.
pub fn window_secs_to_ns(secs: u32) -> i64 {
    i64::from(secs) * 1_000_000_000
}

/// True if the process is running with effective uid 0 (e.g. via sudo).
#[cfg(unix)]
pub fn running_as_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
pub fn running_as_root() -> bool {
    false
}

/// Quote a path for the shell-style lines printed in report mode.
pub fn shell_quote(path: &Path) -> String {
    format!("'{}'", path.display().to_string().replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_in_middle() {
        assert!(glob_match("a*c", "abbbc"));
        assert!(glob_match("a*c", "ac"));
        assert!(!glob_match("a*c", "abd"));
    }

    #[test]
    fn largest_window_does_not_overflow() {
        assert_eq!(window_secs_to_ns(2), 2_000_000_000);
        assert_eq!(window_secs_to_ns(u32::MAX), 4_294_967_295_000_000_000);
    }

    #[test]
    fn bang_is_literal() {
        assert!(!glob_match("!foo", "foo"));
        assert!(glob_match("!foo", "!foo"));
    }

    #[test]
    fn quote_escapes_single_quotes() {
        assert_eq!(shell_quote(Path::new("/a/it's")), r"'/a/it'\''s'");
        assert_eq!(shell_quote(Path::new("/a b")), "'/a b'");
    }
}
