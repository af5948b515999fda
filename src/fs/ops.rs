use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use util::PathEncodingError;

use super::Error;

/// Copy `src` to `tgt`. Directories are copied as a whole tree;
/// symlinks are recreated rather than followed.
pub fn copy(src: &Path, tgt: &Path) -> Result<()> {
    if src.is_symlink() {
        symlink(&fs::read_link(src)?, tgt)?;
    } else if src.is_file() {
        fs::copy(src, tgt)?;
    } else if src.is_dir() {
        copy_tree(src, tgt)?;
    } else {
        return Err(unknown(src)?.into());
    }
    Ok(())
}

/// Copy a directory tree, walking it with an explicit stack of (src, tgt) pairs.
/// Links that point inside `src_root` are rewritten to point inside `tgt_root`.
fn copy_tree(src_root: &Path, tgt_root: &Path) -> Result<()> {
    let mut pending: Vec<(PathBuf, PathBuf)> = vec![(src_root.into(), tgt_root.into())];
    while let Some((src_dir, tgt_dir)) = pending.pop() {
        fs::create_dir_all(&tgt_dir)?;
        for entry in fs::read_dir(&src_dir)? {
            let entry = entry?;
            let ty = entry.file_type()?;
            let from = entry.path();
            let to = tgt_dir.join(entry.file_name());
            if ty.is_symlink() {
                let link = fs::read_link(&from)?;
                let link = match link.strip_prefix(src_root) {
                    Ok(rel) => tgt_root.join(rel),
                    Err(_) => link,
                };
                symlink(&link, &to)?;
            } else if ty.is_dir() {
                pending.push((from, to));
            } else if ty.is_file() {
                fs::copy(&from, &to)?;
            } else {
                return Err(unknown(&from)?.into());
            }
        }
    }
    Ok(())
}

fn unknown(path: &Path) -> Result<Error, PathEncodingError> {
    Ok(Error::UnknownPathType(
        path.to_str().ok_or(PathEncodingError)?.to_owned(),
    ))
}

/// Symlink the given `link` to `tgt`; works for unix and windows.
pub fn symlink(tgt: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    std::os::unix::fs::symlink(tgt, link)?;

    #[cfg(windows)]
    if tgt.is_dir() {
        std::os::windows::fs::symlink_dir(tgt, link)?;
    } else {
        std::os::windows::fs::symlink_file(tgt, link)?;
    }
    Ok(())
}

/// Add execute bits wherever read bits are set (like `chmod +x` under a 022 umask).
pub fn set_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        let mode = perms.mode();
        perms.set_mode(mode | ((mode & 0o444) >> 2));
        fs::set_permissions(path, perms)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
