use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use util::PathEncodingError;

/// Utility fns
mod ops;

/// Defines fns for creating common paths in the run directory
mod paths;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Path is neither file nor dir: {0}")]
    UnknownPathType(String),
    #[error("Specified run directory \"{0}\" is not a directory")]
    NotDirectory(String),
    #[error("Can't write \"{0}\": it is outside the run directory")]
    NotWhitelisted(String),
}

/// All file operations in the crate should go through this struct.
///
/// Every write checks that the path in question is inside the run directory,
/// otherwise it will not be performed. The tools we shell out to (tar, git, make,
/// the editor) are not subject to this rule.
#[derive(Debug)]
pub struct Fs {
    /// The directory we are allowed to modify
    run_dir: PathBuf,
}

impl Fs {
    /// Create a new `Fs` rooted at the given run directory.
    pub fn new(run_dir: &Path) -> Self {
        Self {
            run_dir: run_dir.to_path_buf(),
        }
    }

    /// The (canonical, once `ensure_run_dir_exists` has been called) run directory.
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Check whether the run dir exists, and create it if not.
    pub fn ensure_run_dir_exists(&mut self, verbose: bool) -> Result<()> {
        if !self.run_dir.exists() {
            eprintln!("Run directory {:?} doesn't exist. Creating.", self.run_dir);
            fs::create_dir_all(&self.run_dir).context("creating run directory")?;
        } else if !self.run_dir.is_dir() {
            return Err(Error::NotDirectory(
                self.run_dir.to_str().ok_or(PathEncodingError)?.to_string(),
            )
            .into());
        } else if verbose {
            eprintln!("Using existing run directory {:?}.", self.run_dir);
        }

        self.run_dir = self.run_dir.canonicalize()?;
        Ok(())
    }

    /// Check if path exists on disk.
    pub fn exists<T: AsRef<Path>>(&self, path: T) -> bool {
        let path = path.as_ref();
        path.exists() || path.is_symlink()
    }

    /// Check if path exists and is a directory (following symlinks).
    pub fn is_dir<T: AsRef<Path>>(&self, path: T) -> bool {
        path.as_ref().is_dir()
    }

    /// Check if path exists and is a regular file (following symlinks).
    pub fn is_file<T: AsRef<Path>>(&self, path: T) -> bool {
        path.as_ref().is_file()
    }

    /// Create a file, and return a writable `File` handle.
    pub fn create_file<T: AsRef<Path>>(&self, path: T) -> Result<fs::File> {
        let path = path.as_ref();
        self.check_whitelist(path)?;
        let f = fs::File::create(path).with_context(|| format!("creating {path:?}"))?;
        Ok(f)
    }

    /// Write entire str to a file, replacing it if it exists.
    pub fn write_file<T: AsRef<Path>>(&self, path: T, text: &str) -> Result<()> {
        let path = path.as_ref();
        self.check_whitelist(path)?;
        fs::write(path, text).with_context(|| format!("writing {path:?}"))?;
        Ok(())
    }

    /// Append a single line to a file, creating it if needed.
    pub fn append_line<T: AsRef<Path>>(&self, path: T, line: &str) -> Result<()> {
        let path = path.as_ref();
        self.check_whitelist(path)?;
        let mut f = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening {path:?} for append"))?;
        writeln!(f, "{line}").with_context(|| format!("appending to {path:?}"))?;
        Ok(())
    }

    /// Make a file executable by everyone who can read it.
    pub fn set_executable<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        let path = path.as_ref();
        self.check_whitelist(path)?;
        ops::set_executable(path).with_context(|| format!("making {path:?} executable"))
    }

    /// Copy `src` to `tgt`, recursively if `src` is a directory.
    pub fn copy<T: AsRef<Path>, U: AsRef<Path>>(&self, src: T, tgt: U) -> Result<()> {
        let (src, tgt) = (src.as_ref(), tgt.as_ref());
        self.check_whitelist(tgt)?;
        ops::copy(src, tgt).with_context(|| format!("copying {src:?} to {tgt:?}"))?;
        Ok(())
    }

    /// Recursively delete a directory.
    pub fn remove_dir<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        let path = path.as_ref();
        self.check_whitelist(path)?;
        fs::remove_dir_all(path).with_context(|| format!("removing {path:?}"))
    }

    fn is_whitelisted<T: AsRef<Path>>(&self, path: T) -> bool {
        path.as_ref().starts_with(&self.run_dir)
    }

    fn check_whitelist(&self, path: &Path) -> Result<()> {
        if !self.is_whitelisted(path) {
            Err(Error::NotWhitelisted(path.to_str().ok_or(PathEncodingError)?.to_owned()).into())
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_creates_missing_run_dir() -> Result<()> {
        let dir = tempdir()?;
        let run = dir.path().join("a/b");
        let mut fs = Fs::new(&run);
        fs.ensure_run_dir_exists(false)?;
        assert!(run.is_dir());
        assert_eq!(fs.run_dir(), run.canonicalize()?);
        Ok(())
    }

    #[test]
    fn test_run_dir_must_be_dir() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("file");
        std::fs::write(&file, "")?;
        let err = Fs::new(&file).ensure_run_dir_exists(false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::NotDirectory(_))
        ));
        Ok(())
    }

    #[test]
    fn test_refuses_writes_outside_run_dir() -> Result<()> {
        let dir = tempdir()?;
        let run = dir.path().join("run");
        let mut fs = Fs::new(&run);
        fs.ensure_run_dir_exists(false)?;

        let outside = dir.path().canonicalize()?.join("outside.txt");
        let err = fs.write_file(&outside, "nope").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::NotWhitelisted(_))
        ));
        assert!(!outside.exists());

        fs.write_file(fs.run_dir().join("inside.txt"), "ok")?;
        assert!(fs.run_dir().join("inside.txt").exists());
        Ok(())
    }

    #[test]
    fn test_remove_dir_stays_inside_run_dir() -> Result<()> {
        let dir = tempdir()?;
        let mut fs = Fs::new(&dir.path().join("run"));
        fs.ensure_run_dir_exists(false)?;
        let partial = fs.run_dir().join("gizmo/.git");
        std::fs::create_dir_all(&partial)?;
        fs.remove_dir(fs.run_dir().join("gizmo"))?;
        assert!(!fs.run_dir().join("gizmo").exists());
        assert!(fs.run_dir().exists());

        let sibling = dir.path().canonicalize()?.join("other");
        std::fs::create_dir_all(&sibling)?;
        assert!(fs.remove_dir(&sibling).is_err());
        assert!(sibling.exists());
        Ok(())
    }

    #[test]
    fn test_append_line() -> Result<()> {
        let dir = tempdir()?;
        let mut fs = Fs::new(dir.path());
        fs.ensure_run_dir_exists(false)?;
        let path = fs.run_dir().join("Makefile.systype");
        fs.append_line(&path, "# local systypes")?;
        fs.append_line(&path, "SYSTYPE=\"Frontera\"")?;
        assert_eq!(
            std::fs::read_to_string(&path)?,
            "# local systypes\nSYSTYPE=\"Frontera\"\n"
        );
        Ok(())
    }
}
