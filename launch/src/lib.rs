/// Launcher enumeration and probing
mod launcher;
pub use launcher::{is_executable, Launcher};

/// The command line that starts the simulation binary
mod line;
pub use line::{LaunchLine, RestartFlag};

/// SLURM submission scripts
mod script;
pub use script::{parse_job_id, shell_quote, BatchJob, BatchScriptBuilder};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("no MPI launcher found on PATH (looked for {0})")]
    NoLauncher(String),
}
