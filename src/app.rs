use anyhow::{Context, Result};
use colored::Colorize;

use crate::exec::{Builder, JobRunner};
use crate::fs::Fs;
use crate::prep::{EditableFile, SourceFetcher};
use crate::settings::Settings;
use crate::ui::Ui;

/// This struct actually runs the command-line app.
///
/// Stages run strictly in order and the first failure ends the run:
/// acquire source, configure + build (unless skipped), prepare parameters, launch.
pub struct App {
    /// Interpreted command line settings
    settings: Settings,
    /// Filesystem interface
    fs: Fs,
    /// User interface
    ui: Ui,
}

impl App {
    /// Create a new `App` that prompts on stdin.
    pub fn new(settings: Settings) -> Self {
        let ui = Ui::new(&settings);
        Self::with_ui(settings, ui)
    }

    /// Create a new `App` with the given `Ui`.
    pub fn with_ui(settings: Settings, ui: Ui) -> Self {
        let fs = Fs::new(&settings.run_dir);
        Self { settings, fs, ui }
    }

    /// Run the whole pipeline.
    pub fn run(mut self) -> Result<()> {
        if self.ui.verbose {
            eprintln!("Using run directory {:?}", self.settings.run_dir);
        }
        self.fs.ensure_run_dir_exists(self.ui.verbose)?;
        log::debug!("settings: {:?}", self.settings);

        self.ui.stage("Acquiring GIZMO source");
        let origin = SourceFetcher::new(&self.settings, &self.fs, &self.ui)
            .fetch()
            .context("while acquiring GIZMO source")?;
        log::info!("source: {origin:?}");

        if self.settings.skip_build {
            self.ui.verbose_msg("Skipping build configuration and build");
        } else {
            self.ui.stage("Configuring build");
            EditableFile::config(&self.fs, &self.settings)
                .prepare(&self.fs, &self.settings, &self.ui)
                .context("while preparing build configuration")?;

            self.ui.stage("Building");
            Builder::new(&self.settings, &self.fs)
                .build(&mut self.ui)
                .context("while building GIZMO")?;
        }

        self.ui.stage("Preparing parameter file");
        EditableFile::params(&self.fs, &self.settings)
            .prepare(&self.fs, &self.settings, &self.ui)
            .context("while preparing parameter file")?;

        if self.settings.is_batch() {
            self.ui.stage("Writing batch script");
        } else {
            self.ui.stage("Launching");
        }
        JobRunner::new(&self.settings, &self.fs)
            .run(&mut self.ui)
            .context("while launching GIZMO")?;

        eprintln!("\n{}.", "Done".green());
        Ok(())
    }
}
