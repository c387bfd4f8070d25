//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O, JSON and glob errors, and provides semantic variants
//! for resolution failures. Each variant maps onto a sysexits-style exit code.
use std::path::PathBuf;

use thiserror::Error;

use crate::types::ProgramKind;

pub type Result<T> = std::result::Result<T, Error>;

pub const EX_USAGE: i32 = 64;
pub const EX_DATAERR: i32 = 65;
pub const EX_UNAVAILABLE: i32 = 69;
pub const EX_OSERR: i32 = 71;
pub const EX_CANTCREAT: i32 = 73;
pub const EX_CONFIG: i32 = 78;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Registry file error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input pattern: {0}")]
    InvalidPattern(#[from] glob::PatternError),

    #[error("{program} does not have a version {version}. Installed: {installed}")]
    UnknownVersion {
        program: ProgramKind,
        version: String,
        installed: String,
    },

    #[error("{program} has no installed versions")]
    NoVersions { program: ProgramKind },

    #[error("No program named '{name}' in registry file {path}")]
    UnknownProgram { name: String, path: PathBuf },

    #[error("No input files found.")]
    NoInputs,

    #[error("Unknown partition '{name}'. Available: {available}")]
    UnknownPartition { name: String, available: String },

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("Cannot determine the submitting user; set $USER")]
    NoUser,

    #[error("Cluster query failed: {0}")]
    Cluster(String),

    #[error("Cannot write job script {path}: {source}")]
    ScriptWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn cluster<E: std::fmt::Display>(e: E) -> Self {
        Error::Cluster(e.to_string())
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Io(_) => EX_OSERR,
            Error::Json(_) | Error::UnknownVersion { .. } | Error::NoVersions { .. } => EX_CONFIG,
            Error::UnknownProgram { .. } => EX_CONFIG,
            Error::InvalidPattern(_) | Error::NoInputs => EX_DATAERR,
            Error::UnknownPartition { .. } | Error::InvalidArgument { .. } => EX_USAGE,
            Error::NoUser => EX_CONFIG,
            Error::Cluster(_) => EX_UNAVAILABLE,
            Error::ScriptWrite { .. } => EX_CANTCREAT,
        }
    }
}
