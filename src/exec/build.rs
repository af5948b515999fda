use std::process::Command;

use anyhow::Result;

use crate::fs::Fs;
use crate::settings::Settings;
use crate::ui::Ui;

use super::{command_from, describe, run_foreground, Error};

/// Invokes the build tool in the source directory.
pub struct Builder<'a> {
    settings: &'a Settings,
    fs: &'a Fs,
}

impl<'a> Builder<'a> {
    pub fn new(settings: &'a Settings, fs: &'a Fs) -> Self {
        Self { settings, fs }
    }

    /// `make CONFIG=<config> EXEC=<exec> -j <n>`, run in the source directory.
    pub fn command(&self) -> Result<Command, Error> {
        let s = self.settings;
        let mut cmd = command_from(&s.tools.make)?;
        cmd.arg(format!("CONFIG={}", s.config))
            .arg(format!("EXEC={}", s.exec))
            .arg("-j")
            .arg(s.build_jobs.to_string())
            .current_dir(self.fs.source_dir(s));
        Ok(cmd)
    }

    /// Run the build, failing if the build tool does.
    pub fn build(&self, ui: &mut Ui) -> Result<()> {
        let mut cmd = self.command()?;
        ui.command(&describe(&cmd));

        ui.start_timer();
        let status = run_foreground(&mut cmd)?;
        ui.print_elapsed("Build");

        if !status.success() {
            return Err(Error::BuildFailed(status).into());
        }
        log::info!("built {}", self.settings.exec);
        Ok(())
    }
}
