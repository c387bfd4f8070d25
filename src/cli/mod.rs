//! Command Line Interface (CLI) layer for autoslurm.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) that resolves inputs, renders
//! scripts and submits them. It wires user-provided options to the
//! library functionality exposed via `autoslurm::api`.
//!
//! If you are embedding autoslurm into another application, prefer using
//! the high-level `autoslurm::api` module instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
