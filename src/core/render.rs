//! Job script templates, one per program. Rendering is plain substitution;
//! nothing here checks that the resulting shell is valid.
use std::path::Path;

use chrono::Local;

use crate::core::inputs::stem_jobname;
use crate::core::params::JobParams;
use crate::types::ProgramKind;

/// Render the complete submission script for one job.
pub fn render(params: &JobParams) -> String {
    let body = match params.program {
        ProgramKind::Date => date_body(params),
        ProgramKind::Qchem => qchem_body(params),
        ProgramKind::Gaussian => gaussian_body(params),
        ProgramKind::Amber => amber_body(params),
    };
    let mut script = sbatch_header(params);
    script.push('\n');
    script.push_str(&body);
    script.push_str(&trailer());
    script
}

fn sbatch_header(p: &JobParams) -> String {
    let mut header = format!(
        "#!/bin/bash -e\n\
         #SBATCH  --account={user}\n\
         #SBATCH  --mail-type={mail_type}\n\
         #SBATCH  --mail-user={mail_user}\n\
         #SBATCH  --job-name={job}\n\
         #SBATCH  --cpus-per-task={cpus}\n\
         #SBATCH  --output {job}.tomb\n\
         #SBATCH  -e {job}.tomb.err\n\
         #SBATCH  --mem={mem}M\n\
         #SBATCH  --tasks=1\n\
         #SBATCH  --partition={partition}\n",
        user = p.user,
        mail_type = p.mail_type,
        mail_user = p.mail_user,
        job = p.jobname,
        cpus = p.cpus,
        mem = p.mem_mb(),
        partition = p.partition,
    );
    if p.program == ProgramKind::Amber {
        header.push_str("#SBATCH  --gres=gpu:1\n");
    }
    header
}

fn trailer() -> String {
    format!(
        "\n# generated by autoslurm {} at {}\n",
        env!("CARGO_PKG_VERSION"),
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )
}

fn date_body(p: &JobParams) -> String {
    format!(
        r#"cd $SLURM_SUBMIT_DIR
echo "I ran on: $SLURM_NODELIST"
echo "Starting at `date`"

NAME={job}

/usr/bin/time -v {exe}

echo "Finished at `date`"
"#,
        job = p.jobname,
        exe = p.executable.display(),
    )
}

/// Scratch directory per job plus an exit trap that copies `files` home,
/// whether or not the program succeeded.
fn scratch_block(p: &JobParams, scratch_root: &str, files: &[String]) -> String {
    let scratch = format!("/localscratch/{}/{}/${{scratchFolder}}", p.user, scratch_root);
    let copies: String = files
        .iter()
        .map(|f| format!("    cp {scratch}/{f} {} || true\n", p.datadir.display()))
        .collect();
    format!(
        r#"# Random digits keep concurrent jobs on one node out of each other's scratch
scratchFolder="$(date +%N)"
echo "Scratch Folder: ${{scratchFolder}}"

function cleanup {{
{copies}
    echo "Removing {scratch}"
    rm -rf "{scratch}"
}}
trap cleanup EXIT
"#
    )
}

fn job_files(p: &JobParams, suffixes: &[&str]) -> Vec<String> {
    suffixes.iter().map(|s| format!("{}.{s}", p.jobname)).collect()
}

fn qchem_body(p: &JobParams) -> String {
    let scratch = format!("/localscratch/{}/qchemScratch/${{scratchFolder}}", p.user);
    let mut home = vec![p.input.clone()];
    home.extend(job_files(p, &["out", "fchk"]));
    format!(
        r#"{cleanup}
cd $SLURM_SUBMIT_DIR
echo "I ran on: $SLURM_NODELIST"
echo "Starting at `date`"

NAME={job}

export DATADIR={datadir}
module purge

source {root}/qcenv.sh

export QCSCRATCH="{scratch}"
mkdir -p $QCSCRATCH

cp {datadir}/{input} $QCSCRATCH
cd $QCSCRATCH

/usr/bin/time -v qchem -slurm -np {np} -nt {nt} {input} {job}.out

echo "Finished at `date`"
"#,
        cleanup = scratch_block(p, "qchemScratch", &home),
        job = p.jobname,
        datadir = p.datadir.display(),
        root = p.executable.display(),
        input = p.input,
        np = p.mpi_sockets,
        nt = p.omp_threads,
    )
}

fn gaussian_body(p: &JobParams) -> String {
    let scratch = format!("/localscratch/{}/gaussScratch/${{scratchFolder}}", p.user);
    format!(
        r#"{cleanup}
cd $SLURM_SUBMIT_DIR
echo "I ran on: $SLURM_NODELIST"
echo "Starting at `date`"
NAME={job}

export DATADIR={datadir}
export GAUSS_PDEF={cpus}
export GAUSS_MDEF={mem}GB

export GAUSS_SCRDIR="{scratch}"
mkdir -p $GAUSS_SCRDIR
cp {datadir}/{input} $GAUSS_SCRDIR
cd $GAUSS_SCRDIR

{exe} {input} > {job}.log

echo "Finished at `date`"
"#,
        cleanup = scratch_block(p, "gaussScratch", &job_files(p, &["log", "chk", "fchk"])),
        job = p.jobname,
        datadir = p.datadir.display(),
        cpus = p.cpus,
        mem = p.mem_gb,
        input = p.input,
        exe = p.executable.display(),
    )
}

/// Topology and coordinates share the input's stem; outputs follow the job name.
fn amber_body(p: &JobParams) -> String {
    let root = p.executable.display();
    let system = stem_jobname(Path::new(&p.input));
    format!(
        r#"date

cd $SLURM_SUBMIT_DIR
echo "I ran on: $SLURM_NODELIST"

source {root}/amber.sh
export CUDA_HOME="/usr/local/cuda"
export CUDA_VISIBLE_DEVICES=0
export PATH="{root}/bin:$PATH"
export LD_LIBRARY_PATH="{root}/lib:$CUDA_HOME/lib64:$LD_LIBRARY_PATH"

cd {datadir}
pmemd.cuda -O -i {input} -o {job}.out -p {system}.prmtop -c {system}.inpcrd -r {job}.rst -x {job}.nc

date
"#,
        datadir = p.datadir.display(),
        input = p.input,
        job = p.jobname,
    )
}
