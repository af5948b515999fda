use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use colored::Colorize;

use launch::{
    is_executable, parse_job_id, BatchJob, BatchScriptBuilder, LaunchLine, Launcher, RestartFlag,
};

use crate::fs::Fs;
use crate::settings::Settings;
use crate::ui::Ui;

use super::{command_from, describe, run_captured, run_logged, Error};

/// `JobRunner` starts the built executable.
///
/// With no nodes requested it runs the launcher in the foreground, logging
/// to `<job>.out`/`<job>.err` in the run directory. Otherwise it writes a
/// SLURM script `submit_<job>.sh` and offers to submit it; the script is
/// left on disk either way so it can be resubmitted by hand.
pub struct JobRunner<'a> {
    settings: &'a Settings,
    fs: &'a Fs,
}

impl<'a> JobRunner<'a> {
    pub fn new(settings: &'a Settings, fs: &'a Fs) -> Self {
        Self { settings, fs }
    }

    pub fn run(&self, ui: &mut Ui) -> Result<()> {
        let exec = self.check_executable()?;
        let search_path = self.settings.launcher_search_path();
        let (launcher, program) = Launcher::probe(&search_path)?;
        ui.verbose_msg(&format!("Using launcher {launcher} at {program:?}"));

        if self.settings.is_batch() {
            // compute nodes resolve the launcher from their own PATH:
            let line = self.launch_line(launcher, Path::new(launcher.program()), &exec);
            let script = self.write_batch_script(&line)?;
            self.maybe_submit(&script, ui)
        } else {
            let line = self.launch_line(launcher, &program, &exec);
            self.run_local(&line, ui)
        }
    }

    /// The executable must be a file we can run.
    pub fn check_executable(&self) -> Result<PathBuf, Error> {
        let exec = self.fs.executable(self.settings);
        if !self.fs.is_file(&exec) {
            Err(Error::MissingExecutable(exec))
        } else if !is_executable(&exec) {
            Err(Error::NotExecutable(exec))
        } else {
            Ok(exec)
        }
    }

    pub fn launch_line<'b>(
        &'b self,
        launcher: Launcher,
        program: &'b Path,
        exec: &'b Path,
    ) -> LaunchLine<'b> {
        LaunchLine {
            launcher,
            program,
            procs: self.settings.procs,
            threads: self.settings.threads,
            exec,
            params: Path::new(&self.settings.params),
            restart: RestartFlag::from_restart(self.settings.restart),
        }
    }

    /// Write `submit_<job>.sh` and return its path.
    pub fn write_batch_script(&self, line: &LaunchLine) -> Result<PathBuf> {
        let s = self.settings;
        let stdout = format!("{}.out", s.job_name);
        let stderr = format!("{}.err", s.job_name);
        let job = BatchJob {
            name: &s.job_name,
            partition: s.partition.as_deref(),
            account: s.account.as_deref(),
            nodes: s.nodes,
            tasks_per_node: s.procs_per_node,
            threads: s.threads,
            time: &s.time,
            stdout: &stdout,
            stderr: &stderr,
        };

        let mut strbuf = String::with_capacity(1024);
        BatchScriptBuilder::new(&mut strbuf).write_script(
            &job,
            &s.modules,
            self.fs.run_dir(),
            line,
        );

        let script = self.fs.submit_script(s);
        self.fs
            .write_file(&script, &strbuf)
            .context("while writing batch script")?;
        self.fs.set_executable(&script)?;
        log::info!("wrote batch script {script:?}");
        eprintln!("{} {:?}", "Wrote batch script".green(), script);
        Ok(script)
    }

    fn maybe_submit(&self, script: &Path, ui: &Ui) -> Result<()> {
        if !ui.confirm("Submit the job now?")? {
            eprintln!(
                "Not submitting. Run `{} {}` to submit later.",
                self.settings.tools.sbatch,
                script.display()
            );
            return Ok(());
        }
        let job_id = self.submit(script, ui)?;
        match job_id {
            Some(id) => ui.success(&format!("Submitted job {id}")),
            None => ui.success("Submitted job"),
        }
        Ok(())
    }

    /// Hand the script to `sbatch`; returns the job id if sbatch reported one.
    pub fn submit(&self, script: &Path, ui: &Ui) -> Result<Option<String>> {
        let mut cmd = command_from(&self.settings.tools.sbatch)?;
        cmd.arg(script).current_dir(self.fs.run_dir());
        ui.command(&describe(&cmd));

        let out = run_captured(&mut cmd)?;
        let stdout = String::from_utf8_lossy(&out.stdout);
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr).trim().to_owned();
            return Err(Error::SubmitFailed(out.status, stderr).into());
        }
        Ok(parse_job_id(&stdout).map(str::to_owned))
    }

    fn run_local(&self, line: &LaunchLine, ui: &mut Ui) -> Result<()> {
        let mut cmd = Command::new(line.program);
        cmd.args(line.args())
            .current_dir(self.fs.run_dir())
            .env("OMP_NUM_THREADS", self.settings.threads.to_string());
        ui.command(&line.to_shell());

        ui.start_timer();
        let status = run_logged(
            &mut cmd,
            &self.fs.stdout_log(self.settings),
            &self.fs.stderr_log(self.settings),
            self.fs,
            ui.verbose,
        )?;
        ui.print_elapsed("Run");

        if !status.success() {
            return Err(Error::RunFailed(status).into());
        }
        ui.success("Run finished");
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

    fn setup(dir: &Path, argv: &[&str]) -> Result<(Settings, Fs)> {
        let mut full = vec!["gizmo"];
        full.extend_from_slice(argv);
        let settings: Settings = Args::try_parse_from(full)?.try_into()?;
        let mut fs = Fs::new(dir);
        fs.ensure_run_dir_exists(false)?;
        fs::create_dir_all(fs.source_dir(&settings))?;
        Ok((settings, fs))
    }

    #[cfg(unix)]
    #[test]
    fn test_executable_without_permission() -> Result<()> {
        let dir = tempdir()?;
        let (settings, fs) = setup(dir.path(), &[])?;
        fs::write(fs.executable(&settings), "")?;

        let runner = JobRunner::new(&settings, &fs);
        assert!(matches!(
            runner.check_executable(),
            Err(Error::NotExecutable(_))
        ));
        Ok(())
    }

    #[test]
    fn test_launch_line_uses_settings() -> Result<()> {
        let dir = tempdir()?;
        let (settings, fs) = setup(
            dir.path(),
            &["-n", "12", "-t", "3", "-r", "-p", "disk.param"],
        )?;
        let runner = JobRunner::new(&settings, &fs);
        let exec = fs.executable(&settings);
        let line = runner.launch_line(Launcher::Aprun, Path::new("aprun"), &exec);

        assert_eq!(
            line.to_shell(),
            format!("aprun -n 12 -d 3 {} disk.param 1", exec.display())
        );
        Ok(())
    }

    #[test]
    fn test_batch_script_written_to_run_dir() -> Result<()> {
        let dir = tempdir()?;
        let (settings, fs) = setup(dir.path(), &["-n", "8", "-N", "2", "-J", "box"])?;
        let runner = JobRunner::new(&settings, &fs);
        let exec = fs.executable(&settings);
        let line = runner.launch_line(Launcher::Srun, Path::new("srun"), &exec);

        let script = runner.write_batch_script(&line)?;
        assert_eq!(script, fs.run_dir().join("submit_box.sh"));
        let text = fs::read_to_string(&script)?;
        assert!(text.contains("#SBATCH --ntasks-per-node=4\n"));
        assert!(text.contains("#SBATCH --output=box.out\n"));
        Ok(())
    }
}
