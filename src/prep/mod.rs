use std::path::PathBuf;
use std::process::ExitStatus;

/// Source tarball detection
mod archive;
pub use archive::Archive;

/// Config and parameter files the user edits
mod editable;
pub use editable::EditableFile;

/// Getting the GIZMO source into the run directory
mod source;
pub use source::SourceFetcher;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Found more than one source archive, don't know which to use: {0:?}")]
    AmbiguousArchives(Vec<PathBuf>),
    #[error("Extracting {0:?} failed ({1})")]
    ExtractFailed(PathBuf, ExitStatus),
    #[error("Archive {0:?} did not contain the source directory {1:?}")]
    ArchiveMissingSource(PathBuf, PathBuf),
    #[error("External source path {0:?} is not a directory")]
    ExternalSourceMissing(PathBuf),
    #[error("External source path {0:?} contains the run directory; copying it would copy into itself")]
    ExternalSourceContainsRunDir(PathBuf),
    #[error("No source directory at {0:?} and build is skipped: nothing to run")]
    NothingToRun(PathBuf),
    #[error("SYSTYPE is not set; set it (or pass --systype) to a machine type from Makefile.systype")]
    SystypeUnset,
    #[error("Could not clone GIZMO from {0} or {1}")]
    CloneFailed(String, String),
    #[error("Editor exited unsuccessfully ({0})")]
    EditorFailed(ExitStatus),
}
