use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::args::Args;

pub const PUBLIC_REPO: &str = "https://github.com/pfhopkins/gizmo-public.git";
pub const PRIVATE_REPO: &str = "https://bitbucket.org/phopkins/gizmo.git";

const FALLBACK_JOB_NAME: &str = "gizmo";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{procs} processes cannot be split evenly across {nodes} nodes")]
    IndivisibleProcs { procs: u32, nodes: u32 },
    #[error("invalid job name '{0}' (must be non-empty, without whitespace or '/')")]
    InvalidJobName(String),
    #[error("wall time must not be empty")]
    EmptyTime,
}

/// Remote repositories to clone from when no local source is available.
#[derive(Debug, Clone)]
pub struct Repos {
    pub public: String,
    pub private: String,
}

impl Default for Repos {
    fn default() -> Self {
        Self {
            public: PUBLIC_REPO.to_owned(),
            private: PRIVATE_REPO.to_owned(),
        }
    }
}

/// External programs we shell out to.
#[derive(Debug, Clone)]
pub struct Tools {
    pub editor: String,
    pub make: String,
    pub git: String,
    pub tar: String,
    pub sbatch: String,
}

/// Settings are like Args, except all the logic has
/// been applied so e.g. defaults are added in and counts are validated.
/// Nothing modifies them after construction.
#[derive(Debug)]
pub struct Settings {
    pub run_dir: PathBuf,
    pub source_dir: String,
    pub config: String,
    pub config_template: String,
    pub params: String,
    pub params_template: String,
    pub exec: String,

    pub skip_build: bool,
    pub restart: bool,

    pub threads: u32,
    pub procs: u32,
    pub nodes: u32,
    /// `procs / nodes` for batch jobs, `procs` for local runs
    pub procs_per_node: u32,
    pub time: String,
    pub job_name: String,
    /// false if `job_name` was derived from the run directory
    pub job_name_set: bool,
    pub partition: Option<String>,
    pub account: Option<String>,

    pub systype: Option<String>,
    pub external_source: Option<PathBuf>,
    pub modules: Vec<String>,
    pub repos: Repos,
    pub tools: Tools,
    /// where to look for MPI launchers; `$PATH` if unset
    pub search_path: Option<OsString>,
    /// parallel jobs passed to the build tool
    pub build_jobs: usize,

    pub edit: bool,
    pub yes: bool,
    pub verbose: u8,
}

impl Settings {
    /// True if the run goes through the batch scheduler rather than running locally.
    pub fn is_batch(&self) -> bool {
        self.nodes > 0
    }

    /// Search path for launchers, falling back to the process's `$PATH`.
    pub fn launcher_search_path(&self) -> OsString {
        self.search_path
            .clone()
            .or_else(|| std::env::var_os("PATH"))
            .unwrap_or_default()
    }
}

impl TryFrom<Args> for Settings {
    type Error = anyhow::Error;
    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let procs_per_node = procs_per_node(args.procs, args.nodes)?;

        if args.time.trim().is_empty() {
            return Err(Error::EmptyTime.into());
        }

        let run_dir = PathBuf::from(&args.run_dir);
        let (job_name, job_name_set) = match args.job_name {
            Some(name) => (name, true),
            None => (default_job_name(&run_dir), false),
        };
        if !is_valid_job_name(&job_name) {
            return Err(Error::InvalidJobName(job_name).into());
        }

        let modules = args
            .modules
            .as_deref()
            .map(split_modules)
            .unwrap_or_default();

        let build_jobs = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        Ok(Self {
            run_dir,
            source_dir: args.source_dir,
            config: args.config,
            config_template: args.config_template,
            params: args.params,
            params_template: args.params_template,
            exec: args.exec,

            skip_build: args.skip_build,
            restart: args.restart,

            threads: args.threads,
            procs: args.procs,
            nodes: args.nodes,
            procs_per_node,
            time: args.time,
            job_name,
            job_name_set,
            partition: args.partition.filter(|s| !s.is_empty()),
            account: args.account.filter(|s| !s.is_empty()),

            systype: args.systype.filter(|s| !s.is_empty()),
            external_source: args.source.filter(|s| !s.is_empty()).map(PathBuf::from),
            modules,
            repos: Repos::default(),
            tools: Tools {
                editor: args.editor,
                make: args.make,
                git: "git".to_owned(),
                tar: "tar".to_owned(),
                sbatch: "sbatch".to_owned(),
            },
            search_path: None,
            build_jobs,

            edit: !args.no_edit,
            yes: args.yes,
            verbose: args.verbose,
        })
    }
}

/// Processes per node; `nodes == 0` means a local run using all `procs`.
fn procs_per_node(procs: u32, nodes: u32) -> Result<u32, Error> {
    if nodes == 0 {
        Ok(procs)
    } else if procs % nodes != 0 {
        Err(Error::IndivisibleProcs { procs, nodes })
    } else {
        Ok(procs / nodes)
    }
}

fn default_job_name(run_dir: &Path) -> String {
    // "." has no file name, so look at the absolute path when we can:
    let abs = std::path::absolute(run_dir).unwrap_or_else(|_| run_dir.to_path_buf());
    abs.file_name()
        .and_then(|name| name.to_str())
        .filter(|name| is_valid_job_name(name))
        .unwrap_or(FALLBACK_JOB_NAME)
        .to_owned()
}

fn is_valid_job_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !name.chars().any(char::is_whitespace)
}

fn split_modules(list: &str) -> Vec<String> {
    list.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|m| !m.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn settings(argv: &[&str]) -> anyhow::Result<Settings> {
        let mut full = vec!["gizmo"];
        full.extend_from_slice(argv);
        Args::try_parse_from(full)?.try_into()
    }

    #[test]
    fn test_procs_per_node() {
        for nodes in 1..=8u32 {
            for per_node in 1..=8u32 {
                let procs = nodes * per_node;
                assert_eq!(procs_per_node(procs, nodes).unwrap(), per_node);
            }
        }
        assert_eq!(procs_per_node(6, 0).unwrap(), 6);
    }

    #[test]
    fn test_indivisible_procs_rejected() {
        let err = settings(&["-n", "10", "-N", "3"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::IndivisibleProcs { procs: 10, nodes: 3 })
        ));
    }

    #[test]
    fn test_job_name_from_run_dir() {
        let s = settings(&["-d", "/scratch/runs/disk_hr"]).unwrap();
        assert_eq!(s.job_name, "disk_hr");
        assert!(!s.job_name_set);

        let s = settings(&["-d", "/scratch/runs/disk_hr", "-J", "other"]).unwrap();
        assert_eq!(s.job_name, "other");
        assert!(s.job_name_set);
    }

    #[test]
    fn test_job_name_falls_back() {
        assert_eq!(default_job_name(Path::new("/")), FALLBACK_JOB_NAME);
        assert_eq!(default_job_name(Path::new("/tmp/my run")), FALLBACK_JOB_NAME);
    }

    #[test]
    fn test_invalid_job_name() {
        let err = settings(&["-J", "a b"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidJobName(_))
        ));
    }

    #[test]
    fn test_split_modules() {
        assert_eq!(
            split_modules("intel, impi  hdf5"),
            vec!["intel", "impi", "hdf5"]
        );
        assert!(split_modules("  ").is_empty());
    }

    #[test]
    fn test_local_run_uses_all_procs() {
        let s = settings(&["-n", "4", "--no-edit"]).unwrap();
        assert!(!s.is_batch());
        assert_eq!(s.procs_per_node, 4);
        assert!(!s.edit);
    }
}
