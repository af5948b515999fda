use std::ffi::OsString;
use std::path::Path;

use crate::script::shell_quote;
use crate::Launcher;

/// Positional flag GIZMO reads after the parameter file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartFlag {
    /// Start from initial conditions.
    Fresh,
    /// Resume from the restart files of a previous run.
    Restart,
}

impl RestartFlag {
    pub fn from_restart(restart: bool) -> Self {
        if restart {
            Self::Restart
        } else {
            Self::Fresh
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fresh => "0",
            Self::Restart => "1",
        }
    }
}

/// Everything needed to start the simulation binary under a launcher.
#[derive(Debug)]
pub struct LaunchLine<'a> {
    pub launcher: Launcher,
    /// launcher executable: the probed path for local runs, the bare name in batch scripts
    pub program: &'a Path,
    pub procs: u32,
    pub threads: u32,
    pub exec: &'a Path,
    pub params: &'a Path,
    pub restart: RestartFlag,
}

impl LaunchLine<'_> {
    /// Arguments to pass to `program`, in order.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(7);
        args.push(self.launcher.procs_flag().into());
        args.push(self.procs.to_string().into());
        if let Some(flag) = self.launcher.threads_flag() {
            args.push(flag.into());
            args.push(self.threads.to_string().into());
        }
        args.push(self.exec.into());
        args.push(self.params.into());
        args.push(self.restart.as_str().into());
        args
    }

    /// The same command as a single shell line, for batch scripts and logging.
    pub fn to_shell(&self) -> String {
        let mut line = shell_quote(&self.program.to_string_lossy()).into_owned();
        for arg in self.args() {
            line.push(' ');
            line.push_str(&shell_quote(&arg.to_string_lossy()));
        }
        line
    }
}
