use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::exec::{command_from, describe, run_foreground};
use crate::fs::Fs;
use crate::settings::Settings;
use crate::ui::Ui;

use super::Error;

/// Where an editable file's contents came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The file was already there and was left alone.
    Existing,
    /// Copied from the template.
    Template,
    /// No template; created empty.
    Blank,
}

/// A text file the user gets to edit before we continue
/// (the build configuration or the runtime parameters).
#[derive(Debug)]
pub struct EditableFile {
    pub path: PathBuf,
    pub template: PathBuf,
    /// what to call it in messages
    pub label: &'static str,
}

impl EditableFile {
    pub fn config(fs: &Fs, settings: &Settings) -> Self {
        Self {
            path: fs.config_file(settings),
            template: fs.config_template(settings),
            label: "build configuration",
        }
    }

    pub fn params(fs: &Fs, settings: &Settings) -> Self {
        Self {
            path: fs.params_file(settings),
            template: fs.params_template(settings),
            label: "parameter file",
        }
    }

    /// Make sure the file exists, then let the user edit it (unless `--no-edit`).
    pub fn prepare(&self, fs: &Fs, settings: &Settings, ui: &Ui) -> Result<Origin> {
        let origin = self
            .materialize(fs)
            .with_context(|| format!("while creating {} {:?}", self.label, self.path))?;
        if settings.edit {
            self.edit(settings, ui)?;
        } else {
            ui.verbose_msg(&format!("Not editing {:?}", self.path));
        }
        Ok(origin)
    }

    /// Never overwrites: an existing file wins over the template,
    /// and the template wins over an empty file.
    pub fn materialize(&self, fs: &Fs) -> Result<Origin> {
        if fs.exists(&self.path) {
            log::debug!("using existing {} {:?}", self.label, self.path);
            Ok(Origin::Existing)
        } else if fs.is_file(&self.template) {
            eprintln!("Creating {:?} from template {:?}", self.path, self.template);
            fs.copy(&self.template, &self.path)?;
            Ok(Origin::Template)
        } else {
            eprintln!("No template found at {:?}; creating empty {:?}", self.template, self.path);
            fs.create_file(&self.path)?;
            Ok(Origin::Blank)
        }
    }

    /// Open the file in the user's editor and wait for it to exit.
    pub fn edit(&self, settings: &Settings, ui: &Ui) -> Result<()> {
        let mut cmd = command_from(&settings.tools.editor)?;
        cmd.arg(&self.path);
        ui.command(&describe(&cmd));
        let status = run_foreground(&mut cmd)
            .with_context(|| format!("while editing {}", self.label))?;
        if !status.success() {
            return Err(Error::EditorFailed(status).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Args;
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    fn setup(dir: &std::path::Path) -> Result<(Settings, Fs)> {
        let settings: Settings = Args::try_parse_from(["gizmo", "--no-edit"])?.try_into()?;
        let mut fs = Fs::new(dir);
        fs.ensure_run_dir_exists(false)?;
        fs::create_dir_all(fs.source_dir(&settings))?;
        Ok((settings, fs))
    }

    #[test]
    fn test_copies_template() -> Result<()> {
        let dir = tempdir()?;
        let (settings, fs) = setup(dir.path())?;
        fs::write(fs.config_template(&settings), "#HYDRO_MESHLESS_FINITE_MASS\n")?;

        let file = EditableFile::config(&fs, &settings);
        assert_eq!(file.materialize(&fs)?, Origin::Template);
        assert_eq!(
            fs::read_to_string(&file.path)?,
            "#HYDRO_MESHLESS_FINITE_MASS\n"
        );
        Ok(())
    }

    #[test]
    fn test_creates_blank_without_template() -> Result<()> {
        let dir = tempdir()?;
        let (settings, fs) = setup(dir.path())?;

        let file = EditableFile::params(&fs, &settings);
        assert_eq!(file.materialize(&fs)?, Origin::Blank);
        assert_eq!(fs::read_to_string(&file.path)?, "");
        Ok(())
    }

    #[test]
    fn test_never_overwrites_existing() -> Result<()> {
        let dir = tempdir()?;
        let (settings, fs) = setup(dir.path())?;
        fs::write(fs.params_template(&settings), "TimeMax 10\n")?;
        fs::write(fs.params_file(&settings), "TimeMax 1\n")?;

        let file = EditableFile::params(&fs, &settings);
        assert_eq!(file.prepare(&fs, &settings, &quiet_ui(&settings))?, Origin::Existing);
        assert_eq!(fs::read_to_string(&file.path)?, "TimeMax 1\n");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_editor_is_fatal() -> Result<()> {
        let dir = tempdir()?;
        let (mut settings, fs) = setup(dir.path())?;
        settings.edit = true;
        settings.tools.editor = "false".to_owned();

        let file = EditableFile::params(&fs, &settings);
        let err = file.prepare(&fs, &settings, &quiet_ui(&settings)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::EditorFailed(_))
        ));
        Ok(())
    }

    fn quiet_ui(settings: &Settings) -> Ui {
        Ui::with_input(settings, Box::new(std::io::empty()))
    }
}
