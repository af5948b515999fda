use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use super::Error;

/// An external tool that starts a multi-process (MPI) program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launcher {
    /// TACC systems
    Ibrun,
    /// Cray ALPS
    Aprun,
    /// SLURM
    Srun,
    /// Generic MPI
    Mpirun,
}

impl Launcher {
    /// Probe order: site-specific job launchers first, generic `mpirun` last.
    pub const PRIORITY: [Launcher; 4] = [
        Launcher::Ibrun,
        Launcher::Aprun,
        Launcher::Srun,
        Launcher::Mpirun,
    ];

    /// Name of the executable to look for.
    pub fn program(self) -> &'static str {
        match self {
            Self::Ibrun => "ibrun",
            Self::Aprun => "aprun",
            Self::Srun => "srun",
            Self::Mpirun => "mpirun",
        }
    }

    /// Flag used to pass the number of MPI processes.
    pub fn procs_flag(self) -> &'static str {
        match self {
            Self::Ibrun | Self::Aprun | Self::Srun => "-n",
            Self::Mpirun => "-np",
        }
    }

    /// Flag used to pass threads per process, for launchers that take one.
    /// The others only see `OMP_NUM_THREADS`.
    pub fn threads_flag(self) -> Option<&'static str> {
        match self {
            Self::Aprun => Some("-d"),
            Self::Srun => Some("--cpus-per-task"),
            Self::Ibrun | Self::Mpirun => None,
        }
    }

    /// Find the first available launcher in `search_path` (formatted like `$PATH`).
    /// Returns the launcher and the full path of its executable.
    pub fn probe(search_path: &OsStr) -> Result<(Launcher, PathBuf), Error> {
        let dirs: Vec<PathBuf> = std::env::split_paths(search_path).collect();
        for launcher in Self::PRIORITY {
            for dir in &dirs {
                let candidate = dir.join(launcher.program());
                if is_executable(&candidate) {
                    log::debug!("found launcher {launcher} at {candidate:?}");
                    return Ok((launcher, candidate));
                }
            }
            log::trace!("launcher {launcher} not found");
        }
        let names: Vec<&str> = Self::PRIORITY.iter().map(|l| l.program()).collect();
        Err(Error::NoLauncher(names.join(", ")))
    }
}

impl fmt::Display for Launcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// True if `path` is a regular file the current user could execute.
pub fn is_executable(path: &Path) -> bool {
    let Ok(meta) = path.metadata() else {
        return false;
    };
    if !meta.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        meta.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}
