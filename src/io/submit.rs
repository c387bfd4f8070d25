//! Writing job scripts to disk and handing them to `sbatch`.
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::params::JobParams;
use crate::error::{EX_UNAVAILABLE, Error, Result};

/// Environment variable naming an alternative `sbatch` executable
pub const SBATCH_ENV: &str = "AUTOSLURM_SBATCH";

/// Outcome of handing one script to the scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub jobname: String,
    pub script: PathBuf,
    pub exit_code: i32,
    /// Parsed from "Submitted batch job N"
    pub job_id: Option<u64>,
    pub stdout: String,
}

/// Write `{jobname}.slurm` into `dir`, executable on unix.
pub fn write_script(dir: &Path, params: &JobParams, text: &str) -> Result<PathBuf> {
    let path = dir.join(params.script_name());
    let wrap = |source| Error::ScriptWrite {
        path: path.clone(),
        source,
    };

    fs::write(&path, text).map_err(wrap)?;

    #[cfg(unix)]
    {
        let mut perms = fs::metadata(&path).map_err(wrap)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).map_err(wrap)?;
    }

    debug!("Created submission script: {:?}", path);
    Ok(path)
}

/// Runs the submit command on written scripts
#[derive(Debug, Clone)]
pub struct Submitter {
    exec: String,
}

impl Default for Submitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Submitter {
    pub fn new() -> Self {
        let exec = env::var(SBATCH_ENV).unwrap_or_else(|_| "sbatch".to_string());
        Self { exec }
    }

    pub fn with_exec(exec: impl Into<String>) -> Self {
        Self { exec: exec.into() }
    }

    /// Submit one script. A command that cannot be started counts as exit code 69.
    pub fn submit(&self, jobname: &str, script: &Path) -> Submission {
        // sbatch takes the submit directory from its own working directory
        let mut cmd = Command::new(&self.exec);
        match (script.parent(), script.file_name()) {
            (Some(dir), Some(name)) if !dir.as_os_str().is_empty() => {
                cmd.current_dir(dir).arg(name);
            }
            _ => {
                cmd.arg(script);
            }
        }

        match cmd.output() {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
                let exit_code = output.status.code().unwrap_or(-1);
                if exit_code == 0 {
                    info!("{}: {}", jobname, stdout);
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!(
                        "{} {:?} failed ({}): {}",
                        self.exec,
                        script,
                        exit_code,
                        stderr.trim()
                    );
                }
                Submission {
                    jobname: jobname.to_string(),
                    script: script.to_path_buf(),
                    exit_code,
                    job_id: parse_job_id(&stdout),
                    stdout,
                }
            }
            Err(e) => {
                warn!("Could not run {}: {}", self.exec, e);
                Submission {
                    jobname: jobname.to_string(),
                    script: script.to_path_buf(),
                    exit_code: EX_UNAVAILABLE,
                    job_id: None,
                    stdout: String::new(),
                }
            }
        }
    }
}

pub fn parse_job_id(stdout: &str) -> Option<u64> {
    stdout
        .lines()
        .find_map(|l| l.trim().strip_prefix("Submitted batch job "))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|id| id.parse().ok())
}

/// Zero when every submission succeeded, otherwise the largest exit code.
pub fn overall_exit_code(submissions: &[Submission]) -> i32 {
    submissions
        .iter()
        .map(|s| s.exit_code)
        .filter(|&c| c != 0)
        .max()
        .unwrap_or(0)
}
