//! End-to-end tests of the autoslurm binary against fake `sinfo`/`sbatch`
//! executables injected through the environment.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SINFO_OUTPUT: &str = "\
basic* 385000 52 10
small 64000 16 2
parish 385000 52 2
";

struct Cluster {
    dir: TempDir,
}

impl Cluster {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let cluster = Self { dir };
        cluster.script(
            "sinfo",
            &format!("#!/bin/sh\ncat <<'EOF'\n{SINFO_OUTPUT}EOF\n"),
        );
        cluster.script(
            "sbatch",
            &format!(
                "#!/bin/sh\necho \"$1\" >> {}\necho \"Submitted batch job 4242\"\n",
                cluster.submitted_log().display()
            ),
        );
        cluster.script("sbatch-fail", "#!/bin/sh\necho 'sbatch: error: denied' >&2\nexit 3\n");
        fs::write(cluster.work().join("water.in"), "$molecule\n0 1\n$end\n").unwrap();
        fs::write(cluster.work().join("benzene.in"), "$molecule\n0 1\n$end\n").unwrap();
        cluster
    }

    fn script(&self, name: &str, body: &str) {
        let path = self.dir.path().join(name);
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn bin(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn work(&self) -> PathBuf {
        let work = self.dir.path().join("work");
        fs::create_dir_all(&work).unwrap();
        work
    }

    fn submitted_log(&self) -> PathBuf {
        self.dir.path().join("submitted.log")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("autoslurm").unwrap();
        cmd.current_dir(self.work())
            .env("USER", "jdoe")
            .env("AUTOSLURM_SINFO", self.bin("sinfo"))
            .env("AUTOSLURM_SBATCH", self.bin("sbatch"))
            .env_remove("AUTOSLURM_REGISTRY")
            .env_remove("RUST_LOG");
        cmd
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn dry_run_prints_and_writes_without_submitting() {
    let cluster = Cluster::new();
    cluster
        .cmd()
        .args(["--dryrun", "water.in"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#SBATCH  --job-name=water"))
        .stdout(predicate::str::contains("#SBATCH  --partition=basic"))
        .stdout(predicate::str::contains("qchem -slurm -np 1 -nt 24 water.in water.out"));

    assert!(cluster.work().join("water.slurm").is_file());
    assert!(!cluster.submitted_log().exists());
}

#[test]
fn submits_every_input_with_sbatch() {
    let cluster = Cluster::new();
    cluster
        .cmd()
        .arg("all")
        .assert()
        .success()
        .stdout(predicate::str::contains("Submitted batch job 4242").count(2));

    let log = read(&cluster.submitted_log());
    assert_eq!(log.lines().collect::<Vec<_>>(), vec!["benzene.slurm", "water.slurm"]);
}

#[test]
fn failed_submission_sets_exit_status() {
    let cluster = Cluster::new();
    cluster
        .cmd()
        .env("AUTOSLURM_SBATCH", cluster.bin("sbatch-fail"))
        .arg("water.in")
        .assert()
        .code(3);
}

#[test]
fn memory_and_cpus_are_clamped_to_partition() {
    let cluster = Cluster::new();
    cluster
        .cmd()
        .args(["--dryrun", "-q", "small", "-m", "200", "-c", "40", "water.in"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#SBATCH  --mem=64000M"))
        .stdout(predicate::str::contains("#SBATCH  --cpus-per-task=16"))
        .stderr(predicate::str::contains("using 64 GB"));
}

#[test]
fn unknown_version_exits_with_config_error() {
    let cluster = Cluster::new();
    cluster
        .cmd()
        .args(["-v", "99", "water.in"])
        .assert()
        .code(78)
        .stderr(predicate::str::contains("qchem does not have a version 99"));
}

#[test]
fn missing_inputs_exit_with_data_error() {
    let cluster = Cluster::new();
    cluster
        .cmd()
        .arg("*.xyz")
        .assert()
        .code(65)
        .stderr(predicate::str::contains("No input files found."));
}

#[test]
fn unknown_partition_is_a_usage_error() {
    let cluster = Cluster::new();
    cluster
        .cmd()
        .args(["-q", "gpu", "water.in"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("Unknown partition 'gpu'"));
}

#[test]
fn username_stands_in_for_missing_user() {
    let cluster = Cluster::new();
    cluster
        .cmd()
        .env_remove("USER")
        .env("USERNAME", "jroe")
        .args(["--dryrun", "water.in"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#SBATCH  --account=jroe\n"));
}

#[test]
fn empty_user_falls_back_to_username() {
    let cluster = Cluster::new();
    cluster
        .cmd()
        .env("USER", "")
        .env("USERNAME", "jroe")
        .args(["--dryrun", "water.in"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#SBATCH  --mail-user=jroe\n"));
}

#[test]
fn no_user_is_a_config_error() {
    let cluster = Cluster::new();
    cluster
        .cmd()
        .env_remove("USER")
        .env_remove("USERNAME")
        .args(["--dryrun", "water.in"])
        .assert()
        .code(78)
        .stderr(predicate::str::contains("Cannot determine the submitting user"));
}

#[test]
fn unavailable_scheduler_is_reported() {
    let cluster = Cluster::new();
    cluster
        .cmd()
        .env("AUTOSLURM_SINFO", cluster.bin("no-such-sinfo"))
        .arg("water.in")
        .assert()
        .code(69)
        .stderr(predicate::str::contains("Cluster query failed"));
}

#[test]
fn output_flag_redirects_scripts_to_file() {
    let cluster = Cluster::new();
    let out = cluster.work().join("scripts.txt");
    cluster
        .cmd()
        .args(["--dryrun", "-x", "date", "-o"])
        .arg(&out)
        .arg("water.in")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let text = read(&out);
    assert!(text.contains("/usr/bin/time -v /usr/bin/date"));
}

#[test]
fn explicit_jobname_applies_to_each_input() {
    let cluster = Cluster::new();
    cluster
        .cmd()
        .args(["--dryrun", "-j", "scan", "--mailtype", "ALL", "--mailuser", "jd@example.edu", "all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#SBATCH  --job-name=scan\n"))
        .stdout(predicate::str::contains("#SBATCH  --job-name=scan-2\n"))
        .stdout(predicate::str::contains("#SBATCH  --mail-user=jd@example.edu"));

    assert!(cluster.work().join("scan.slurm").is_file());
    assert!(cluster.work().join("scan-2.slurm").is_file());
}

#[test]
fn list_partitions_marks_default_and_condos() {
    let cluster = Cluster::new();
    cluster
        .cmd()
        .arg("--list-partitions")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"basic\s+385 GB\s+52 cpus\s+10 nodes default").unwrap())
        .stdout(predicate::str::contains("condo"));
}

#[test]
fn registry_override_adds_versions() {
    let cluster = Cluster::new();
    let registry = cluster.work().join("registry.json");
    fs::write(
        &registry,
        r#"{"qchem": {"input_pattern": "*.in", "versions": ["541", "610"],
            "trunk": "/opt/qchem",
            "executables": {"610": "/opt/qchem/qchem610", "541": "/opt/qchem/qchem541"}}}"#,
    )
    .unwrap();

    cluster
        .cmd()
        .arg("--registry")
        .arg(&registry)
        .args(["--dryrun", "water.in"])
        .assert()
        .success()
        .stdout(predicate::str::contains("source /opt/qchem/qchem610/qcenv.sh"));
}
