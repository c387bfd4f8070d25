use std::path::PathBuf;

use thiserror::Error;

use autoslurm::error::{EX_CANTCREAT, EX_OSERR};

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Cannot open output file {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Autoslurm(#[from] autoslurm::Error),
}

impl AppError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Output { .. } => EX_CANTCREAT,
            AppError::Io(_) => EX_OSERR,
            AppError::Autoslurm(e) => e.exit_code(),
        }
    }
}
