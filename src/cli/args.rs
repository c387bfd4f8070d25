use clap::Parser;
use std::path::PathBuf;

use autoslurm::core::params::{DEFAULT_CPUS, DEFAULT_MEM_GB, MAX_CPUS};
use autoslurm::{JobRequest, MailType, ProgramKind};

#[derive(Parser, Debug)]
#[command(
    name = "autoslurm",
    about = "Automatically generate & queue SLURM script(s) for running job(s) on this cluster."
)]
pub struct CliArgs {
    /// Data file spec(s) for the program you want to run. Each input is
    /// submitted separately. A directory is searched for files with the
    /// program's suffix, a file is used regardless of its name, `all` scans
    /// the current directory, and anything else is globbed.
    #[arg(required_unless_present_any = ["list_programs", "list_partitions"])]
    pub inputs: Vec<String>,

    /// Name of the primary program you are executing
    #[arg(short = 'x', long, value_enum, default_value_t = ProgramKind::Qchem)]
    pub exe: ProgramKind,

    /// Version of the program to run; the latest installed version when omitted
    #[arg(short = 'v', long)]
    pub version: Option<String>,

    /// Total number of CPUs (Slurm "cpus", i.e. cores) to request
    #[arg(
        short = 'c',
        long,
        default_value_t = DEFAULT_CPUS,
        value_parser = clap::value_parser!(u32).range(1..=MAX_CPUS as i64)
    )]
    pub cputotal: u32,

    /// Total memory to request for the job, in GB
    #[arg(
        short = 'm',
        long,
        default_value_t = DEFAULT_MEM_GB,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub mem: u64,

    /// Partition to submit to; the cluster default when omitted
    #[arg(short = 'q', long)]
    pub partition: Option<String>,

    /// Job name to use instead of the input file's name
    #[arg(short = 'j', long)]
    pub jobname: Option<String>,

    /// Send Slurm status updates via email
    #[arg(long, value_enum, ignore_case = true, default_value_t = MailType::None)]
    pub mailtype: MailType,

    /// Address for status emails; your user name by default
    #[arg(long)]
    pub mailuser: Option<String>,

    /// Just build the job script; do not submit it
    #[arg(long, default_value_t = false)]
    pub dryrun: bool,

    /// Write normal output to this file instead of stdout
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Directory the .slurm files are written to
    #[arg(long, default_value = ".")]
    pub script_dir: PathBuf,

    /// JSON file overriding entries of the built-in program registry
    #[arg(long, env = "AUTOSLURM_REGISTRY")]
    pub registry: Option<PathBuf>,

    /// List installed programs and versions, then exit
    #[arg(long, default_value_t = false)]
    pub list_programs: bool,

    /// List cluster partitions, then exit
    #[arg(long, default_value_t = false)]
    pub list_partitions: bool,

    /// Be chatty about what is taking place
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

impl CliArgs {
    pub fn job_request(&self) -> JobRequest {
        JobRequest {
            program: self.exe,
            version: self.version.clone().filter(|v| !v.is_empty()),
            inputs: self.inputs.clone(),
            cpus: self.cputotal,
            mem_gb: self.mem,
            partition: self.partition.clone(),
            jobname: self.jobname.clone(),
            mail_type: self.mailtype,
            mail_user: self.mailuser.clone(),
        }
    }
}
