/// Runs the build tool
mod build;
pub use build::Builder;

/// Runs the simulation locally or through the batch scheduler
mod job_runner;
pub use job_runner::JobRunner;

/// Run a subprocess
mod run_cmd;
pub use run_cmd::{command_from, describe, run_captured, run_foreground, run_logged};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Empty command string: '{0}'")]
    EmptyCommand(String),
    #[error("Build failed ({0})")]
    BuildFailed(std::process::ExitStatus),
    #[error("Executable not found: {0:?}")]
    MissingExecutable(std::path::PathBuf),
    #[error("Executable is not runnable (missing execute permission?): {0:?}")]
    NotExecutable(std::path::PathBuf),
    #[error("Simulation exited unsuccessfully ({0})")]
    RunFailed(std::process::ExitStatus),
    #[error("Job submission failed ({0}): {1}")]
    SubmitFailed(std::process::ExitStatus, String),
}
