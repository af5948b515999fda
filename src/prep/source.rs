use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::exec::{command_from, describe, run_foreground};
use crate::fs::Fs;
use crate::settings::Settings;
use crate::ui::Ui;

use super::{Archive, Error};

/// How the source directory came to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOrigin {
    /// Already present; nothing was done.
    Existing,
    /// Unpacked from a tarball in the run directory.
    Extracted(PathBuf),
    /// Copied from the external source path.
    Copied(PathBuf),
    /// Cloned from a remote repository.
    Cloned(String),
}

/// Makes sure the GIZMO source directory exists in the run directory.
///
/// Tries, in order: an existing directory, a single tarball, the external source
/// path, and finally a fresh clone. Each step only runs if all earlier ones found
/// nothing, so running twice never re-extracts, re-copies or re-clones.
pub struct SourceFetcher<'a> {
    settings: &'a Settings,
    fs: &'a Fs,
    ui: &'a Ui,
}

impl<'a> SourceFetcher<'a> {
    pub fn new(settings: &'a Settings, fs: &'a Fs, ui: &'a Ui) -> Self {
        Self { settings, fs, ui }
    }

    pub fn fetch(&self) -> Result<SourceOrigin> {
        let source_dir = self.fs.source_dir(self.settings);

        if self.fs.is_dir(&source_dir) {
            self.ui
                .verbose_msg(&format!("Using existing source directory {source_dir:?}"));
            return Ok(SourceOrigin::Existing);
        }

        if let Some(archive) = Archive::find(self.fs, self.settings)? {
            self.extract(&archive)?;
            return Ok(SourceOrigin::Extracted(archive.path));
        }

        if let Some(external) = &self.settings.external_source {
            eprintln!("Copying source from {external:?}");
            if !self.fs.is_dir(external) {
                return Err(Error::ExternalSourceMissing(external.clone()).into());
            }
            // the run dir is canonical already:
            let canonical = external
                .canonicalize()
                .with_context(|| format!("resolving {external:?}"))?;
            if self.fs.run_dir().starts_with(&canonical) {
                return Err(Error::ExternalSourceContainsRunDir(external.clone()).into());
            }
            self.fs
                .copy(external, &source_dir)
                .context("while copying external source")?;
            return Ok(SourceOrigin::Copied(external.clone()));
        }

        if self.settings.skip_build {
            return Err(Error::NothingToRun(source_dir).into());
        }

        let url = self.clone_source()?;
        Ok(SourceOrigin::Cloned(url))
    }

    fn extract(&self, archive: &Archive) -> Result<()> {
        let mut cmd = command_from(&self.settings.tools.tar)?;
        cmd.arg(archive.compression.tar_flags())
            .arg(&archive.path)
            .arg("-C")
            .arg(self.fs.run_dir());
        self.ui.command(&describe(&cmd));

        let status = run_foreground(&mut cmd)?;
        if !status.success() {
            return Err(Error::ExtractFailed(archive.path.clone(), status).into());
        }

        let source_dir = self.fs.source_dir(self.settings);
        if !self.fs.is_dir(&source_dir) {
            return Err(Error::ArchiveMissingSource(archive.path.clone(), source_dir).into());
        }
        Ok(())
    }

    /// Clone the repository the user picks, falling back to the other one.
    /// Returns the url that worked.
    fn clone_source(&self) -> Result<String> {
        // checked up front so we never clone a tree we can't build:
        let systype = self.settings.systype.as_deref().ok_or(Error::SystypeUnset)?;

        let repos = &self.settings.repos;
        let private = self
            .ui
            .confirm("Do you have access to the private GIZMO repository?")?;
        let (first, second) = if private {
            (&repos.private, &repos.public)
        } else {
            (&repos.public, &repos.private)
        };

        let url = if self.try_clone(first)? {
            first
        } else {
            eprintln!("{} {first}; trying {second}", "Clone failed from".yellow());
            if self.try_clone(second)? {
                second
            } else {
                return Err(Error::CloneFailed(first.clone(), second.clone()).into());
            }
        };

        let systype_file = self.fs.systype_file(self.settings);
        self.fs
            .append_line(&systype_file, &format!("SYSTYPE=\"{systype}\""))
            .context("while recording system type")?;
        log::info!("appended SYSTYPE={systype} to {systype_file:?}");

        Ok(url.clone())
    }

    fn try_clone(&self, url: &str) -> Result<bool> {
        let mut cmd = command_from(&self.settings.tools.git)?;
        cmd.arg("clone")
            .arg(url)
            .arg(&self.settings.source_dir)
            .current_dir(self.fs.run_dir());
        self.ui.command(&describe(&cmd));

        let status = run_foreground(&mut cmd)?;
        let source_dir = self.fs.source_dir(self.settings);
        if status.success() && self.fs.is_dir(&source_dir) {
            return Ok(true);
        }
        // a failed clone can leave a partial tree that would block the next attempt:
        if self.fs.exists(&source_dir) {
            log::info!("removing partial clone {source_dir:?}");
            self.fs
                .remove_dir(&source_dir)
                .context("while removing partial clone")?;
        }
        Ok(false)
    }
}
