//! autoslurm CLI entrypoint.
//!
//! Provides a thin wrapper over the `cli` module: parse args, resolve and
//! submit jobs, and exit with the scheduler's (or our own) status.
//! For programmatic use, prefer the library API (`autoslurm::api`).

use clap::Parser;

mod cli;

fn main() {
    let args = cli::CliArgs::parse();
    let code = match cli::run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("autoslurm: {e}");
            e.exit_code()
        }
    };
    std::process::exit(code);
}
