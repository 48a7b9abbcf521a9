use dirclone::engine::{
    glob_match, hash_equals, mtime_changed, path_relative_to, should_include_in_walk,
};
use dirclone::utils::{PackagePaths, temp_path_for};
use std::path::PathBuf;

// --- path_relative_to ---

#[test]
fn test_path_relative_under_base() {
    let base = PathBuf::from("/foo/bar");
    let path = PathBuf::from("/foo/bar/baz/qux");
    assert_eq!(
        path_relative_to(&path, &base),
        Some(PathBuf::from("baz/qux"))
    );
}

#[test]
fn test_path_relative_not_under_base() {
    let base = PathBuf::from("/foo/bar");
    let path = PathBuf::from("/other/qux");
    assert_eq!(path_relative_to(&path, &base), None);
}

#[test]
fn test_path_relative_path_equals_base() {
    let base = PathBuf::from("/foo/bar");
    let path = PathBuf::from("/foo/bar");
    assert_eq!(path_relative_to(&path, &base), Some(PathBuf::new()));
}

// --- mtime_changed ---

#[test]
fn test_mtime_changed_same_mtime() {
    let t = 1_000_000_000i64;
    assert!(!mtime_changed(t, t, 0));
    assert!(!mtime_changed(t, t, 100));
}

#[test]
fn test_mtime_changed_within_window() {
    let old = 1_000_000_000i64;
    let window = 50i64;
    assert!(!mtime_changed(old + 50, old, window));
    assert!(!mtime_changed(old - 50, old, window));
}

#[test]
fn test_mtime_changed_outside_window() {
    let old = 1_000_000_000i64;
    let window = 50i64;
    assert!(mtime_changed(old + 51, old, window));
    assert!(mtime_changed(old - 51, old, window));
}

// --- hash_equals ---

#[test]
fn test_hash_equals_none_none() {
    assert!(hash_equals(&None, &None));
}

#[test]
fn test_hash_equals_some_some() {
    let a = [1u8; 32];
    let mut b = [1u8; 32];
    assert!(hash_equals(&Some(a), &Some(b)));
    b[0] = 2;
    assert!(!hash_equals(&Some(a), &Some(b)));
}

#[test]
fn test_hash_equals_one_side_missing() {
    assert!(!hash_equals(&None, &Some([0u8; 32])));
    assert!(!hash_equals(&Some([0u8; 32]), &None));
}

// --- glob_match / should_include_in_walk ---

#[test]
fn test_glob_match_literal() {
    assert!(glob_match("node_modules", "node_modules"));
    assert!(!glob_match("node_modules", "node_module"));
}

#[test]
fn test_glob_match_star() {
    assert!(glob_match("*.log", "foo.log"));
    assert!(glob_match("*.log", ".log"));
    assert!(!glob_match("*.log", "foo.log.txt"));
    assert!(glob_match("node_*", "node_modules"));
}

#[test]
fn test_glob_match_question_mark() {
    assert!(glob_match("file?.txt", "file1.txt"));
    assert!(!glob_match("file?.txt", "file.txt"));
}

#[test]
fn test_should_include_root_excluded() {
    let root = PathBuf::from("/foo");
    assert!(!should_include_in_walk(&root, &root, &[]));
}

#[test]
fn test_should_include_exclude_pattern_name() {
    let root = PathBuf::from("/foo");
    let path = PathBuf::from("/foo/node_modules");
    assert!(!should_include_in_walk(
        &path,
        &root,
        &["node_modules".to_string()]
    ));
}

#[test]
fn test_should_include_exclude_pattern_glob() {
    let root = PathBuf::from("/foo");
    let path = PathBuf::from("/foo/bar/baz.log");
    assert!(!should_include_in_walk(&path, &root, &["*.log".to_string()]));
}

#[test]
fn test_should_include_not_excluded() {
    let root = PathBuf::from("/foo");
    let path = PathBuf::from("/foo/bar/baz.txt");
    assert!(should_include_in_walk(
        &path,
        &root,
        &["*.log".to_string(), "node_modules".to_string()]
    ));
}

#[test]
fn test_default_excludes_skip_temp_files() {
    let root = PathBuf::from("/foo");
    let temp = temp_path_for(&root.join("bar.txt"));
    let defaults = PackagePaths::get().default_exclude_patterns();
    assert!(!should_include_in_walk(&temp, &root, &defaults));
    assert!(!should_include_in_walk(&root.join(".zfs"), &root, &defaults));
    assert!(should_include_in_walk(&root.join("bar.txt"), &root, &defaults));
}
