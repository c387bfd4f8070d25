#![doc = r#"
autoslurm: generate and submit Slurm job scripts for the scientific
packages installed on a shared cluster.

Given a program (`date`, `qchem`, `gaussian`, `amber`), an optional version
and a resource request, autoslurm finds the input files, works out the
CPU/socket/thread split, clamps memory to what the partition offers, and
renders one job script per input. Scripts are written to disk and handed
to `sbatch`, or only printed in a dry run.

It is not a scheduler: nothing is tracked after submission.

Quick start: render scripts without a live cluster
--------------------------------------------------
```rust,no_run
use std::path::Path;
use autoslurm::{
    prepare_jobs, JobRequest, Partition, ProgramKind, Registry, StaticCluster,
};

fn main() -> autoslurm::Result<()> {
    let cluster = StaticCluster::new([Partition {
        name: "basic".to_string(),
        memory_mb: 385_000,
        cpus: 52,
        nodes: 10,
        is_default: true,
    }]);

    let request = JobRequest {
        program: ProgramKind::Qchem,
        inputs: vec!["all".to_string()],
        cpus: 48,
        ..JobRequest::default()
    };

    for job in prepare_jobs(&request, &Registry::builtin(), &cluster, Path::new("."), "jdoe")? {
        println!("{}", job.script);
    }
    Ok(())
}
```

Submit against the live scheduler
---------------------------------
```rust,no_run
use std::path::Path;
use autoslurm::{
    prepare_jobs, run_jobs, current_user, JobRequest, Registry, RunOptions,
    SinfoCluster, Submitter,
};

fn main() -> autoslurm::Result<()> {
    let request = JobRequest {
        inputs: vec!["water.in".to_string()],
        ..JobRequest::default()
    };
    let user = current_user()?;
    let jobs = prepare_jobs(&request, &Registry::builtin(), &SinfoCluster::new(), Path::new("."), &user)?;
    let report = run_jobs(&jobs, &RunOptions::default(), &Submitter::new(), &mut std::io::stdout())?;
    std::process::exit(report.exit_code());
}
```

Error handling
--------------
All public functions return `autoslurm::Result<T>`. Match on `autoslurm::Error`
for specific cases, or use `Error::exit_code()` for a sysexits-style status.

Useful modules
--------------
- [`api`]: high-level entry points.
- [`core`]: registry, input discovery, resolution and templates.
- [`io`]: `sinfo` partition queries and `sbatch` submission.
- [`types`]: `ProgramKind` and `MailType`.
- [`error`]: crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use crate::core::params::{JobParams, JobRequest};
pub use crate::core::registry::{ProgramInfo, Registry};
pub use crate::core::resolve::current_user;
pub use error::{Error, Result};
pub use types::{MailType, ProgramKind};

// Scheduler I/O
pub use crate::io::cluster::{ClusterInfo, Partition, Partitions, SinfoCluster, StaticCluster};
pub use crate::io::submit::{Submission, Submitter};

// High-level API re-exports
pub use api::{PreparedJob, RunOptions, RunReport, prepare_jobs, run_jobs};
