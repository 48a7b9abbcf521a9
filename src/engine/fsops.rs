//! Filesystem primitives used by the apply strategy: clone one entry, remove one entry.
//!
//! [`clone_entry`] duplicates a single entry including its metadata. It does not recurse: a
//! directory is created (or reused) and gets the source's ownership, permissions, xattrs and
//! timestamps; its children are separate operations. Fifos, sockets and device nodes are
//! recreated, not read.

use filetime::{FileTime, set_file_times, set_symlink_file_times};
use log::{debug, warn};
use std::fs::{self, Metadata};
use std::io::{self, ErrorKind};
use std::path::Path;

use crate::EntryKind;
use crate::engine::tools::running_as_root;
use crate::pipeline::metadata::{entry_kind, stat};
use crate::utils::{remove_temp, temp_path_for};

/// Attempts to create parents after the first failure.
const PARENT_RETRIES: usize = 3;

/// Duplicate `src` at `dst`: file bytes, directory, symlink or special file, plus ownership
/// (root only), permissions, extended attributes and timestamps. Missing parents of `dst` are created and an
/// existing `dst` of another kind is replaced.
pub fn clone_entry(dst: &Path, src: &Path, follow_links: bool) -> io::Result<()> {
    let meta = stat(src, follow_links)?;
    let kind = entry_kind(&meta);

    make_parents(dst)?;
    clear_conflicting(dst, kind)?;

    match kind {
        EntryKind::Dir => match fs::create_dir(dst) {
            Err(e) if e.kind() != ErrorKind::AlreadyExists => return Err(e),
            _ => {}
        },
        EntryKind::File => {
            let tmp = temp_path_for(dst);
            if let Err(e) = stage_file(src, &tmp, &meta) {
                remove_temp(&tmp);
                return Err(e);
            }
            if let Err(e) = fs::rename(&tmp, dst) {
                remove_temp(&tmp);
                return Err(e);
            }
            return Ok(());
        }
        EntryKind::Symlink => {
            let target = fs::read_link(src)?;
            let tmp = temp_path_for(dst);
            remove_temp(&tmp);
            make_symlink(&target, &tmp)?;
            if let Err(e) = fs::rename(&tmp, dst) {
                remove_temp(&tmp);
                return Err(e);
            }
        }
        EntryKind::Other => {
            let tmp = temp_path_for(dst);
            remove_temp(&tmp);
            make_special(&tmp, &meta)?;
            if let Err(e) = fs::rename(&tmp, dst) {
                remove_temp(&tmp);
                return Err(e);
            }
        }
    }
    copy_metadata(src, dst, &meta, kind)
}

/// Delete `path`, recursively when `recursive`. A path that is already gone counts as removed.
pub fn remove_entry(path: &Path, recursive: bool) -> io::Result<()> {
    let res = if recursive {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match res {
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
            debug!("{}: already removed", path.display());
            Ok(())
        }
        other => other,
    }
}

/// Create the missing parents of `dst`. The nearest existing ancestor may be a file or link
/// the source has a directory for; it is removed first. Another worker may be replacing the
/// same ancestor, so creation is retried a few times.
fn make_parents(dst: &Path) -> io::Result<()> {
    let Some(parent) = dst.parent() else {
        return Ok(());
    };
    let mut last = match fs::create_dir_all(parent) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };
    for _ in 0..PARENT_RETRIES {
        if let Some(b) = parent_blocker(parent)
            && let Err(e) = remove_entry(b, false)
        {
            debug!("{}: can't remove: {}", b.display(), e);
        }
        match fs::create_dir_all(parent) {
            Ok(()) => return Ok(()),
            Err(e) => last = e,
        }
    }
    Err(last)
}

/// Nearest existing ancestor of `parent` when it is not a directory.
fn parent_blocker(parent: &Path) -> Option<&Path> {
    parent
        .ancestors()
        .find(|a| fs::symlink_metadata(a).is_ok())
        .filter(|a| !fs::metadata(a).is_ok_and(|m| m.is_dir()))
}

/// Make room for an entry of `kind` at `dst`. A directory that stays a directory is kept.
fn clear_conflicting(dst: &Path, kind: EntryKind) -> io::Result<()> {
    let existing = match fs::symlink_metadata(dst) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    let existing_kind = entry_kind(&existing);
    match (existing_kind, kind) {
        (EntryKind::Dir, EntryKind::Dir) => Ok(()),
        (EntryKind::Dir, _) => remove_entry(dst, true),
        (_, EntryKind::Dir) => match remove_entry(dst, false) {
            // a child's copy already put a directory here
            Err(_) if fs::symlink_metadata(dst).is_ok_and(|m| m.is_dir()) => Ok(()),
            other => other,
        },
        // files, links and special files are replaced by rename
        _ => Ok(()),
    }
}

/// Copy file bytes into `tmp` and give it the source's metadata, so the rename publishes a
/// finished file.
fn stage_file(src: &Path, tmp: &Path, meta: &Metadata) -> io::Result<()> {
    remove_temp(tmp);
    fs::copy(src, tmp)?;
    copy_metadata(src, tmp, meta, EntryKind::File)
}

/// Ownership goes first: `chown` clears the setuid and setgid bits.
fn copy_metadata(src: &Path, dst: &Path, meta: &Metadata, kind: EntryKind) -> io::Result<()> {
    let is_link = kind == EntryKind::Symlink;
    if kind != EntryKind::Other {
        copy_xattrs(src, dst, is_link);
    }
    copy_ownership(dst, meta)?;
    if !is_link {
        fs::set_permissions(dst, meta.permissions())?;
    }
    let atime = FileTime::from_last_access_time(meta);
    let mtime = FileTime::from_last_modification_time(meta);
    if is_link {
        set_symlink_file_times(dst, atime, mtime)
    } else {
        set_file_times(dst, atime, mtime)
    }
}

#[cfg(unix)]
fn make_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

/// Recreate a fifo, socket or device node. Device nodes need root.
#[cfg(unix)]
fn make_special(path: &Path, meta: &Metadata) -> io::Result<()> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;
    use std::os::unix::fs::{FileTypeExt, MetadataExt};

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| io::Error::new(ErrorKind::InvalidInput, "path contains interior NUL"))?;
    let mode = meta.mode() as libc::mode_t;
    let rc = if meta.file_type().is_fifo() {
        unsafe { libc::mkfifo(c_path.as_ptr(), mode & 0o7777) }
    } else {
        unsafe { libc::mknod(c_path.as_ptr(), mode, meta.rdev() as libc::dev_t) }
    };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn make_special(path: &Path, _meta: &Metadata) -> io::Result<()> {
    Err(io::Error::new(
        ErrorKind::Unsupported,
        format!("{}: special files are not cloned on this platform", path.display()),
    ))
}

#[cfg(not(unix))]
fn make_symlink(target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        ErrorKind::Unsupported,
        format!("{}: symlinks are not cloned on this platform", target.display()),
    ))
}

/// Ownership is only changed when running as root; other users can't give files away.
#[cfg(unix)]
fn copy_ownership(dst: &Path, meta: &Metadata) -> io::Result<()> {
    use std::os::unix::fs::MetadataExt;
    if !running_as_root() {
        return Ok(());
    }
    std::os::unix::fs::lchown(dst, Some(meta.uid()), Some(meta.gid()))
}

#[cfg(not(unix))]
fn copy_ownership(_dst: &Path, _meta: &Metadata) -> io::Result<()> {
    let _ = running_as_root();
    Ok(())
}

/// Best effort: a destination filesystem without xattr support must not fail the copy.
/// Links are skipped; Linux refuses `user.*` attributes on symlinks.
#[cfg(unix)]
fn copy_xattrs(src: &Path, dst: &Path, is_link: bool) {
    if !xattr::SUPPORTED_PLATFORM || is_link {
        return;
    }
    let names = match xattr::list_deref(src) {
        Ok(names) => names,
        Err(e) => {
            debug!("{}: can't list xattrs: {}", src.display(), e);
            return;
        }
    };
    for name in names {
        match xattr::get_deref(src, &name) {
            Ok(Some(value)) => {
                if let Err(e) = xattr::set(dst, &name, &value) {
                    warn!(
                        "{}: can't set xattr {}: {}",
                        dst.display(),
                        name.to_string_lossy(),
                        e
                    );
                }
            }
            Ok(None) => {}
            Err(e) => debug!(
                "{}: can't read xattr {}: {}",
                src.display(),
                name.to_string_lossy(),
                e
            ),
        }
    }
}

#[cfg(not(unix))]
fn copy_xattrs(_src: &Path, _dst: &Path, _is_link: bool) {}
