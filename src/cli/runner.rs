use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use autoslurm::io::cluster::is_condo;
use autoslurm::{
    ClusterInfo, Registry, RunOptions, SinfoCluster, Submitter, current_user, prepare_jobs,
    run_jobs,
};

use super::args::CliArgs;
use super::errors::AppError;

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_output(args: &CliArgs) -> Result<Box<dyn Write>, AppError> {
    match &args.output {
        Some(path) => {
            let file = File::create(path).map_err(|source| AppError::Output {
                path: path.clone(),
                source,
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

fn load_registry(args: &CliArgs) -> Result<Registry, AppError> {
    match &args.registry {
        Some(path) => Ok(Registry::from_json_file(path)?),
        None => Ok(Registry::builtin()),
    }
}

fn list_programs(registry: &Registry, out: &mut dyn Write) -> io::Result<()> {
    for (kind, info) in registry.iter() {
        let latest = info.latest_version().unwrap_or("-");
        writeln!(
            out,
            "{:<10} inputs {:<8} latest {:<7} versions {}",
            kind,
            info.input_pattern,
            latest,
            info.versions.join(", ")
        )?;
        for (version, exe) in &info.executables {
            writeln!(out, "{:<10}   {:<7} {}", "", version, exe.display())?;
        }
    }
    Ok(())
}

fn list_partitions(cluster: &dyn ClusterInfo, out: &mut dyn Write) -> Result<(), AppError> {
    let partitions = cluster.partitions()?;
    for p in partitions.iter() {
        let mut notes = Vec::new();
        if p.is_default {
            notes.push("default");
        }
        if is_condo(&p.name) {
            notes.push("condo");
        }
        writeln!(
            out,
            "{:<12} {:>6} GB {:>4} cpus {:>4} nodes {}",
            p.name,
            p.memory_gb(),
            p.cpus,
            p.nodes,
            notes.join(",")
        )?;
    }
    Ok(())
}

/// Run the CLI; returns the process exit status.
pub fn run(args: CliArgs) -> Result<i32, AppError> {
    init_logging(args.verbose);
    debug!("{:?}", args);

    let mut out = open_output(&args)?;
    let registry = load_registry(&args)?;
    let cluster = SinfoCluster::new();

    if args.list_programs || args.list_partitions {
        if args.list_programs {
            list_programs(&registry, &mut out)?;
        }
        if args.list_partitions {
            list_partitions(&cluster, &mut out)?;
        }
        out.flush()?;
        return Ok(0);
    }

    let request = args.job_request();
    let user = current_user()?;
    let cwd = env::current_dir()?;

    let jobs = prepare_jobs(&request, &registry, &cluster, &cwd, &user)?;
    let options = RunOptions {
        dry_run: args.dryrun,
        script_dir: args.script_dir.clone(),
    };
    let report = run_jobs(&jobs, &options, &Submitter::new(), &mut out)?;
    out.flush()?;

    let code = report.exit_code();
    info!("Finished with exit status {}", code);
    Ok(code)
}
