use clap::Parser;

const CMD_NAME: &str = "gizmo";

pub const DEFAULT_RUN_DIR: &str = ".";
pub const DEFAULT_CONFIG: &str = "Config.sh";
pub const DEFAULT_EXEC: &str = "GIZMO";
pub const DEFAULT_PARAMS: &str = "params.txt";
pub const DEFAULT_TIME: &str = "24:00:00";
pub const DEFAULT_SOURCE_DIR: &str = "gizmo";
pub const DEFAULT_CONFIG_TEMPLATE: &str = "Template_Config.sh";
pub const DEFAULT_PARAMS_TEMPLATE: &str = "Template_params.txt";
pub const DEFAULT_EDITOR: &str = "vi";
pub const DEFAULT_MAKE: &str = "make";

/// Stores our command-line args format.
///
/// Values are resolved as: built-in default, then environment variable, then flag.
#[derive(Parser, Debug)]
#[command(name = CMD_NAME, version, about = "Fetch, build, configure and launch GIZMO runs", long_about = None)]
pub struct Args {
    /// Don't configure or build; run an existing executable
    #[arg(short, long, visible_alias = "nobuild")]
    pub skip_build: bool,

    /// Restart from the restart files of a previous run
    #[arg(short, long)]
    pub restart: bool,

    /// Run directory holding source, config, parameters and output
    #[arg(short = 'd', long, visible_alias = "dir", value_name = "DIR", default_value = DEFAULT_RUN_DIR)]
    #[arg(env = "GIZMO_RUN_DIR")]
    pub run_dir: String,

    /// Build configuration file, inside the source directory
    #[arg(short, long, visible_alias = "cfg", value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: String,

    /// Name of the executable to build and run
    #[arg(short, long, visible_alias = "executable", value_name = "NAME", default_value = DEFAULT_EXEC)]
    pub exec: String,

    /// Runtime parameter file, inside the run directory
    #[arg(short, long, visible_alias = "param", value_name = "FILE", default_value = DEFAULT_PARAMS)]
    pub params: String,

    /// OpenMP threads per MPI process
    #[arg(short, long, visible_alias = "omp", value_name = "N", default_value_t = 1)]
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub threads: u32,

    /// Number of nodes; 0 runs locally, >0 writes a batch script
    #[arg(short = 'N', long, value_name = "N", default_value_t = 0)]
    pub nodes: u32,

    /// Total number of MPI processes
    #[arg(short = 'n', long, visible_alias = "mpi", value_name = "N", default_value_t = 1)]
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub procs: u32,

    /// Wall time for batch jobs
    #[arg(short = 'T', long, visible_alias = "walltime", value_name = "HH:MM:SS", default_value = DEFAULT_TIME)]
    pub time: String,

    /// Job name; defaults to the run directory's name
    #[arg(short = 'J', long, visible_alias = "name", value_name = "NAME")]
    pub job_name: Option<String>,

    /// Batch partition
    #[arg(short = 'P', long, visible_alias = "queue", value_name = "NAME")]
    #[arg(env = "GIZMO_PARTITION")]
    pub partition: Option<String>,

    /// Batch allocation to charge
    #[arg(short = 'A', long, visible_alias = "allocation", value_name = "NAME")]
    #[arg(env = "GIZMO_ACCOUNT")]
    pub account: Option<String>,

    /// System type written to Makefile.systype after cloning
    #[arg(long, value_name = "TAG", env = "SYSTYPE")]
    pub systype: Option<String>,

    /// Existing GIZMO source tree to copy instead of cloning
    #[arg(long, value_name = "PATH", env = "GIZMO_SOURCE")]
    pub source: Option<String>,

    /// Modules to load in batch scripts (space or comma separated)
    #[arg(long, value_name = "LIST", env = "GIZMO_MODULES")]
    pub modules: Option<String>,

    /// Editor for the config and parameter files
    #[arg(long, value_name = "CMD", env = "EDITOR", default_value = DEFAULT_EDITOR)]
    pub editor: String,

    /// Build tool
    #[arg(long, value_name = "CMD", env = "MAKE", default_value = DEFAULT_MAKE)]
    pub make: String,

    /// Name of the source directory inside the run directory
    #[arg(long, value_name = "NAME", env = "GIZMO_DIR", default_value = DEFAULT_SOURCE_DIR)]
    pub source_dir: String,

    /// Template for the build configuration file, inside the source directory
    #[arg(long, value_name = "FILE", env = "GIZMO_CONFIG_TEMPLATE", default_value = DEFAULT_CONFIG_TEMPLATE)]
    pub config_template: String,

    /// Template for the parameter file, relative to the run directory
    #[arg(long, value_name = "FILE", env = "GIZMO_PARAMS_TEMPLATE", default_value = DEFAULT_PARAMS_TEMPLATE)]
    pub params_template: String,

    /// Don't open the config and parameter files in an editor
    #[arg(long)]
    pub no_edit: bool,

    /// Answer yes to every prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Print additional debugging info (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
