use std::path::{Path, PathBuf};

use crate::settings::Settings;

use super::Fs;

/// Utility fns for making the paths of every file the pipeline touches.
/// All of them are rooted at the run directory.
impl Fs {
    /// $RUN/gizmo
    pub fn source_dir(&self, s: &Settings) -> PathBuf {
        self.run_dir.join(&s.source_dir)
    }

    /// $RUN/gizmo.<ext>
    pub fn archive(&self, s: &Settings, ext: &str) -> PathBuf {
        self.run_dir.join(format!("{}.{ext}", s.source_dir))
    }

    /// $RUN/gizmo/Makefile.systype
    pub fn systype_file(&self, s: &Settings) -> PathBuf {
        self.source_dir(s).join("Makefile.systype")
    }

    /// $RUN/gizmo/Config.sh
    pub fn config_file(&self, s: &Settings) -> PathBuf {
        self.source_dir(s).join(&s.config)
    }

    /// $RUN/gizmo/Template_Config.sh
    pub fn config_template(&self, s: &Settings) -> PathBuf {
        self.source_dir(s).join(&s.config_template)
    }

    /// $RUN/gizmo/GIZMO
    pub fn executable(&self, s: &Settings) -> PathBuf {
        self.source_dir(s).join(&s.exec)
    }

    /// $RUN/params.txt
    pub fn params_file(&self, s: &Settings) -> PathBuf {
        self.in_run_dir(&s.params)
    }

    /// $RUN/Template_params.txt, or the template path itself if absolute
    pub fn params_template(&self, s: &Settings) -> PathBuf {
        self.in_run_dir(&s.params_template)
    }

    /// $RUN/submit_<job>.sh
    pub fn submit_script(&self, s: &Settings) -> PathBuf {
        self.run_dir.join(format!("submit_{}.sh", s.job_name))
    }

    /// $RUN/<job>.out
    pub fn stdout_log(&self, s: &Settings) -> PathBuf {
        self.run_dir.join(format!("{}.out", s.job_name))
    }

    /// $RUN/<job>.err
    pub fn stderr_log(&self, s: &Settings) -> PathBuf {
        self.run_dir.join(format!("{}.err", s.job_name))
    }

    // `join` keeps absolute paths as they are:
    fn in_run_dir<T: AsRef<Path>>(&self, file: T) -> PathBuf {
        self.run_dir.join(file)
    }
}
