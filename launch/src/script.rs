use std::borrow::Cow;
use std::path::Path;

use crate::LaunchLine;

/// Scheduling parameters for a SLURM job.
#[derive(Debug)]
pub struct BatchJob<'a> {
    pub name: &'a str,
    pub partition: Option<&'a str>,
    pub account: Option<&'a str>,
    pub nodes: u32,
    pub tasks_per_node: u32,
    pub threads: u32,
    /// wall time, passed through to `--time` as given
    pub time: &'a str,
    /// file names for the scheduler's stdout and stderr capture
    pub stdout: &'a str,
    pub stderr: &'a str,
}

/// Utility for building the contents of a `submit_<job>.sh` script.
/// Note that it modifies a String reference held internally;
/// read that String to get the script's contents.
#[derive(Debug)]
pub struct BatchScriptBuilder<'a> {
    strbuf: &'a mut String,
}

impl<'a> BatchScriptBuilder<'a> {
    pub fn new(strbuf: &'a mut String) -> Self {
        Self { strbuf }
    }
}

impl BatchScriptBuilder<'_> {
    /// Write a whole script: directives, environment, launch line and accounting query.
    pub fn write_script(
        &mut self,
        job: &BatchJob,
        modules: &[String],
        run_dir: &Path,
        launch: &LaunchLine,
    ) {
        self.write_prefix();
        self.write_directives(job);
        self.write_modules(modules);
        self.write_env(job.threads);
        self.write_cd(run_dir);
        self.write_launch(launch);
        self.write_accounting();
    }

    /// shebang line
    pub fn write_prefix(&mut self) {
        self.strbuf.clear();
        self.strbuf.push_str("#!/bin/bash\n");
    }

    pub fn write_directives(&mut self, job: &BatchJob) {
        self.write_directive("job-name", job.name);
        if let Some(partition) = job.partition {
            self.write_directive("partition", partition);
        }
        if let Some(account) = job.account {
            self.write_directive("account", account);
        }
        self.write_directive("nodes", &job.nodes.to_string());
        self.write_directive("ntasks-per-node", &job.tasks_per_node.to_string());
        self.write_directive("cpus-per-task", &job.threads.to_string());
        self.write_directive("time", job.time);
        self.write_directive("output", job.stdout);
        self.write_directive("error", job.stderr);
    }

    /// `module load` lines; nothing if the list is empty.
    pub fn write_modules(&mut self, modules: &[String]) {
        if modules.is_empty() {
            return;
        }
        self.strbuf.push('\n');
        for module in modules {
            self.strbuf.push_str("module load ");
            self.strbuf.push_str(&shell_quote(module));
            self.strbuf.push('\n');
        }
    }

    pub fn write_env(&mut self, threads: u32) {
        self.strbuf.push_str("\nexport OMP_NUM_THREADS=");
        self.strbuf.push_str(&threads.to_string());
        self.strbuf.push('\n');
    }

    pub fn write_cd(&mut self, run_dir: &Path) {
        self.strbuf.push_str("cd ");
        self.strbuf.push_str(&shell_quote(&run_dir.to_string_lossy()));
        self.strbuf.push('\n');
    }

    pub fn write_launch(&mut self, launch: &LaunchLine) {
        self.strbuf.push('\n');
        self.strbuf.push_str(&launch.to_shell());
        self.strbuf.push('\n');
    }

    /// Post-run resource usage, appended to the job's stdout.
    pub fn write_accounting(&mut self) {
        self.strbuf.push_str(
            "\nsacct -j \"$SLURM_JOB_ID\" --format=JobID,JobName,Partition,NNodes,NCPUS,Elapsed,MaxRSS,State,ExitCode\n",
        );
    }

    fn write_directive(&mut self, key: &str, val: &str) {
        self.strbuf.push_str("#SBATCH --");
        self.strbuf.push_str(key);
        self.strbuf.push('=');
        self.strbuf.push_str(&shell_quote(val));
        self.strbuf.push('\n');
    }
}

/// Single-quote `s` for the shell, unless it only contains characters that never need it.
pub fn shell_quote(s: &str) -> Cow<'_, str> {
    let safe = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,+@%".contains(c));
    if safe {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(format!("'{}'", s.replace('\'', r"'\''")))
    }
}

/// Extract the job id from `sbatch` output ("Submitted batch job 12345").
pub fn parse_job_id(stdout: &str) -> Option<&str> {
    stdout
        .lines()
        .find_map(|line| line.trim().strip_prefix("Submitted batch job "))
        .map(str::trim)
        .filter(|id| !id.is_empty())
}
