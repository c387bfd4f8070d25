//! High-level, ergonomic library API: resolve a request into rendered job
//! scripts, then write and submit them. Prefer these entrypoints over the
//! low-level `core` and `io` modules when embedding autoslurm.
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::core::params::{JobParams, JobRequest};
use crate::core::registry::Registry;
use crate::core::render::render;
use crate::core::resolve::resolve;
use crate::error::Result;
use crate::io::cluster::ClusterInfo;
use crate::io::submit::{Submission, Submitter, overall_exit_code, write_script};

/// A resolved job and its rendered script
#[derive(Debug, Clone)]
pub struct PreparedJob {
    pub params: JobParams,
    pub script: String,
}

/// How prepared jobs are handed off
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Print scripts instead of submitting them
    pub dry_run: bool,
    /// Where `.slurm` files are written
    pub script_dir: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            script_dir: PathBuf::from("."),
        }
    }
}

/// What happened to every job of a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub submitted: Vec<Submission>,
    /// Jobs that were only printed
    pub printed: Vec<String>,
    /// Subset of `printed` whose script could not be written
    pub unwritten: Vec<String>,
}

impl RunReport {
    /// Zero if every submission succeeded, otherwise the largest exit code.
    pub fn exit_code(&self) -> i32 {
        overall_exit_code(&self.submitted)
    }
}

/// Resolve `request` and render one script per input.
pub fn prepare_jobs(
    request: &JobRequest,
    registry: &Registry,
    cluster: &dyn ClusterInfo,
    cwd: &Path,
    user: &str,
) -> Result<Vec<PreparedJob>> {
    let partitions = cluster.partitions()?;
    let jobs = resolve(request, registry, &partitions, cwd, user)?
        .into_iter()
        .map(|params| {
            let script = render(&params);
            PreparedJob { params, script }
        })
        .collect();
    Ok(jobs)
}

/// Write each job's script and either print it (dry run) or submit it.
///
/// A script that cannot be written is printed to `out` and skipped, as if
/// the run were a dry run.
pub fn run_jobs(
    jobs: &[PreparedJob],
    options: &RunOptions,
    submitter: &Submitter,
    out: &mut dyn Write,
) -> Result<RunReport> {
    let mut report = RunReport::default();

    for job in jobs {
        let name = &job.params.jobname;
        let written = match write_script(&options.script_dir, &job.params, &job.script) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("{}; treating {} as a dry run", e, name);
                report.unwritten.push(name.clone());
                None
            }
        };

        match written {
            Some(path) if !options.dry_run => {
                let submission = submitter.submit(name, &path);
                if !submission.stdout.is_empty() {
                    writeln!(out, "{}", submission.stdout)?;
                }
                report.submitted.push(submission);
            }
            _ => {
                write!(out, "{}", job.script)?;
                report.printed.push(name.clone());
            }
        }
    }

    info!(
        "Submitted: {}, printed: {}",
        report.submitted.len(),
        report.printed.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::cluster::{Partition, StaticCluster};
    use crate::types::ProgramKind;
    use std::fs;
    use tempfile::TempDir;

    fn cluster() -> StaticCluster {
        StaticCluster::new([Partition {
            name: "basic".into(),
            memory_mb: 385_000,
            cpus: 52,
            nodes: 4,
            is_default: true,
        }])
    }

    fn prepared(dir: &Path) -> Vec<PreparedJob> {
        fs::write(dir.join("water.in"), "").unwrap();
        fs::write(dir.join("ammonia.in"), "").unwrap();
        let request = JobRequest {
            program: ProgramKind::Qchem,
            inputs: vec!["all".into()],
            cpus: 36,
            ..JobRequest::default()
        };
        prepare_jobs(&request, &Registry::builtin(), &cluster(), dir, "jdoe").unwrap()
    }

    #[test]
    fn prepares_one_script_per_input() {
        let dir = TempDir::new().unwrap();
        let jobs = prepared(dir.path());
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].params.jobname, "ammonia");
        assert!(jobs[0].script.contains("-np 2 -nt 18 ammonia.in ammonia.out"));
        assert!(jobs[1].script.contains("#SBATCH  --job-name=water"));
    }

    #[test]
    fn dry_run_writes_and_prints_without_submitting() {
        let dir = TempDir::new().unwrap();
        let jobs = prepared(dir.path());
        let options = RunOptions {
            dry_run: true,
            script_dir: dir.path().to_path_buf(),
        };
        let mut out = Vec::new();
        let submitter = Submitter::with_exec("/nonexistent/sbatch");
        let report = run_jobs(&jobs, &options, &submitter, &mut out).unwrap();

        assert!(report.submitted.is_empty());
        assert_eq!(report.printed, vec!["ammonia", "water"]);
        assert_eq!(report.exit_code(), 0);
        assert!(dir.path().join("water.slurm").is_file());
        let printed = String::from_utf8(out).unwrap();
        assert_eq!(printed.matches("#!/bin/bash -e").count(), 2);
    }

    #[test]
    fn unwritable_script_falls_back_to_printing() {
        let dir = TempDir::new().unwrap();
        let jobs = prepared(dir.path());
        let options = RunOptions {
            dry_run: false,
            script_dir: dir.path().join("missing"),
        };
        let mut out = Vec::new();
        let submitter = Submitter::with_exec("/nonexistent/sbatch");
        let report = run_jobs(&jobs, &options, &submitter, &mut out).unwrap();

        assert!(report.submitted.is_empty());
        assert_eq!(report.unwritten.len(), 2);
        assert!(String::from_utf8(out).unwrap().contains("qchem -slurm"));
    }

    #[test]
    fn failed_submissions_set_exit_code() {
        let dir = TempDir::new().unwrap();
        let jobs = prepared(dir.path());
        let options = RunOptions {
            dry_run: false,
            script_dir: dir.path().to_path_buf(),
        };
        let mut out = Vec::new();
        let submitter = Submitter::with_exec("/nonexistent/sbatch");
        let report = run_jobs(&jobs, &options, &submitter, &mut out).unwrap();
        assert_eq!(report.submitted.len(), 2);
        assert_eq!(report.exit_code(), 69);
    }
}
