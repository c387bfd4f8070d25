use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::{MailType, ProgramKind};

pub const DEFAULT_CPUS: u32 = 24;
pub const DEFAULT_MEM_GB: u64 = 380;
pub const DEFAULT_PARTITION: &str = "basic";
pub const MAX_CPUS: u32 = 49;

/// What the user asked for, before any lookups against the registry or cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    pub program: ProgramKind,
    /// None means the latest installed version
    pub version: Option<String>,
    /// Input specs: `all`, a directory, a file, or a glob
    pub inputs: Vec<String>,
    pub cpus: u32,
    pub mem_gb: u64,
    /// None means the cluster's default partition
    pub partition: Option<String>,
    pub jobname: Option<String>,
    pub mail_type: MailType,
    /// None means the submitting user
    pub mail_user: Option<String>,
}

impl Default for JobRequest {
    fn default() -> Self {
        Self {
            program: ProgramKind::Qchem,
            version: None,
            inputs: Vec::new(),
            cpus: DEFAULT_CPUS,
            mem_gb: DEFAULT_MEM_GB,
            partition: None,
            jobname: None,
            mail_type: MailType::None,
            mail_user: None,
        }
    }
}

/// Everything a template needs to render one job script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobParams {
    pub program: ProgramKind,
    pub version: String,
    /// Executable or environment root for `version`
    pub executable: PathBuf,
    pub user: String,
    pub mail_type: MailType,
    pub mail_user: String,
    pub jobname: String,
    /// Input file name, relative to `datadir`
    pub input: String,
    /// Absolute directory holding the input
    pub datadir: PathBuf,
    pub partition: String,
    pub cpus: u32,
    pub mpi_sockets: u32,
    pub omp_threads: u32,
    pub mem_gb: u64,
}

impl JobParams {
    /// Memory directive value, in megabytes as Slurm's `M` suffix expects
    pub fn mem_mb(&self) -> u64 {
        self.mem_gb * 1000
    }

    pub fn script_name(&self) -> String {
        format!("{}.slurm", self.jobname)
    }
}
