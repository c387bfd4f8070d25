//! Turns a `JobRequest` into one fully resolved `JobParams` per input file:
//! version defaulting, input discovery, CPU/socket/thread split and
//! clamping resources to what the partition can give.
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::inputs::{discover, stem_jobname};
use crate::core::params::{DEFAULT_PARTITION, JobParams, JobRequest, MAX_CPUS};
use crate::core::registry::{ProgramInfo, Registry};
use crate::error::{Error, Result};
use crate::io::cluster::{Partition, Partitions, is_condo};

/// Above this many CPUs the job is spread over both sockets of a node
pub const SINGLE_SOCKET_CPUS: u32 = 26;

/// `$USER`, falling back to `$USERNAME`. Empty values count as unset.
pub fn current_user() -> Result<String> {
    let lookup = |key: &str| env::var(key).ok().filter(|u| !u.is_empty());
    lookup("USER")
        .or_else(|| lookup("USERNAME"))
        .ok_or(Error::NoUser)
}

/// MPI sockets and OpenMP threads per socket for a CPU count.
pub fn split_cpus(cpus: u32) -> (u32, u32) {
    let sockets = if cpus > SINGLE_SOCKET_CPUS { 2 } else { 1 };
    (sockets, cpus / sockets)
}

/// Picks the requested version, or the latest one when none was asked for.
pub fn select_version(program: &ProgramInfo, request: &JobRequest) -> Result<String> {
    match request.version.as_deref() {
        None | Some("") => program
            .latest_version()
            .map(str::to_string)
            .ok_or(Error::NoVersions {
                program: request.program,
            }),
        Some(v) if program.has_version(v) => Ok(v.to_string()),
        Some(v) => Err(Error::UnknownVersion {
            program: request.program,
            version: v.to_string(),
            installed: program.versions.join(", "),
        }),
    }
}

/// The partition to use: explicit, else the cluster default, else `basic`.
pub fn select_partition<'a>(
    partitions: &'a Partitions,
    requested: Option<&str>,
) -> Result<&'a Partition> {
    let name = match requested {
        Some(name) => name,
        None => partitions
            .default_partition()
            .map(|p| p.name.as_str())
            .unwrap_or(DEFAULT_PARTITION),
    };
    partitions.get(name).ok_or_else(|| Error::UnknownPartition {
        name: name.to_string(),
        available: partitions.names().join(", "),
    })
}

/// Resolves a request against the registry and cluster.
///
/// `cwd` anchors relative input specs and `user` owns the job.
pub fn resolve(
    request: &JobRequest,
    registry: &Registry,
    partitions: &Partitions,
    cwd: &Path,
    user: &str,
) -> Result<Vec<JobParams>> {
    if request.cpus == 0 || request.cpus > MAX_CPUS {
        return Err(Error::InvalidArgument {
            arg: "cputotal",
            value: request.cpus.to_string(),
        });
    }
    if request.mem_gb == 0 {
        return Err(Error::InvalidArgument {
            arg: "mem",
            value: request.mem_gb.to_string(),
        });
    }

    let program = registry.get(request.program).ok_or(Error::NoVersions {
        program: request.program,
    })?;
    let version = select_version(program, request)?;
    let executable = program.executable(&version);

    let partition = select_partition(partitions, request.partition.as_deref())?;
    if is_condo(&partition.name) {
        warn!(
            "Partition '{}' is a condo; jobs from outside its group may be preempted",
            partition.name
        );
    }

    let (cpus, mem_gb) = clamp_resources(request, program, partition);
    let (mpi_sockets, omp_threads) = split_cpus(cpus);

    let inputs = discover(&request.inputs, &program.input_pattern, cwd)?;
    let mail_user = request
        .mail_user
        .clone()
        .unwrap_or_else(|| user.to_string());

    let mut taken = HashSet::new();
    let mut jobs = Vec::with_capacity(inputs.len());
    for input in &inputs {
        let base = match &request.jobname {
            Some(name) => name.clone(),
            None => stem_jobname(input),
        };
        let jobname = unique_jobname(&base, &mut taken);
        let (datadir, file) = split_input(input, cwd);

        let params = JobParams {
            program: request.program,
            version: version.clone(),
            executable: executable.clone(),
            user: user.to_string(),
            mail_type: request.mail_type,
            mail_user: mail_user.clone(),
            jobname,
            input: file,
            datadir,
            partition: partition.name.clone(),
            cpus,
            mpi_sockets,
            omp_threads,
            mem_gb,
        };
        debug!(
            "Resolved job: {}",
            serde_json::to_string(&params).unwrap_or_default()
        );
        jobs.push(params);
    }

    info!(
        "{} {} on '{}': {} job(s), {} cpus, {} GB",
        request.program,
        version,
        partition.name,
        jobs.len(),
        cpus,
        mem_gb
    );
    Ok(jobs)
}

/// `base`, or `base-2`, `base-3`, ... when an earlier job already took it.
fn unique_jobname(base: &str, taken: &mut HashSet<String>) -> String {
    let mut name = base.to_string();
    let mut n = 2;
    while !taken.insert(name.clone()) {
        name = format!("{base}-{n}");
        n += 1;
    }
    name
}

fn clamp_resources(request: &JobRequest, program: &ProgramInfo, partition: &Partition) -> (u32, u64) {
    let mut cpus = request.cpus;
    if partition.cpus > 0 && cpus > partition.cpus {
        warn!(
            "Requested {} cpus but '{}' nodes have {}; using {}",
            cpus, partition.name, partition.cpus, partition.cpus
        );
        cpus = partition.cpus;
    }

    // Slurm reads --mem=0 as "all of the node", so never go below 1 GB.
    let ceiling = partition.memory_gb().max(1);
    let mem_gb = request.mem_gb.min(ceiling);
    if mem_gb < request.mem_gb {
        warn!(
            "Requested {} GB but '{}' nodes have {} GB; using {} GB",
            request.mem_gb, partition.name, ceiling, mem_gb
        );
    }

    if let Some(max) = program.max_cpus
        && cpus > max
    {
        warn!("{} rarely benefits from more than {} cpus", request.program, max);
    }
    if let Some(max) = program.max_mem_gb
        && mem_gb > max
    {
        warn!("{} rarely needs more than {} GB", request.program, max);
    }

    (cpus, mem_gb)
}

fn split_input(input: &Path, cwd: &Path) -> (PathBuf, String) {
    let absolute = if input.is_absolute() {
        input.to_path_buf()
    } else {
        cwd.join(input)
    };
    // Symlinks stay as given so results land where the user pointed.
    let absolute = std::path::absolute(&absolute).unwrap_or(absolute);
    let file = absolute
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = absolute
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cwd.to_path_buf());
    (dir, file)
}
