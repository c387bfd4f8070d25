//! Shared types and enums used across autoslurm.
//! Includes `ProgramKind` (which template to render) and `MailType`
//! (the Slurm `--mail-type` values).
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProgramKind {
    /// Date-printing test job
    Date,
    /// Q-Chem quantum chemistry
    Qchem,
    /// Gaussian electronic structure
    Gaussian,
    /// Amber molecular dynamics (GPU)
    Amber,
}

impl ProgramKind {
    pub const ALL: [ProgramKind; 4] = [
        ProgramKind::Date,
        ProgramKind::Qchem,
        ProgramKind::Gaussian,
        ProgramKind::Amber,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProgramKind::Date => "date",
            ProgramKind::Qchem => "qchem",
            ProgramKind::Gaussian => "gaussian",
            ProgramKind::Amber => "amber",
        }
    }
}

impl std::fmt::Display for ProgramKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProgramKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProgramKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown program: {s}"))
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MailType {
    #[default]
    None,
    Begin,
    End,
    Fail,
    Requeue,
    All,
}

// Slurm spells these in upper case, so the possible values are listed by hand
impl clap::ValueEnum for MailType {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            MailType::None,
            MailType::Begin,
            MailType::End,
            MailType::Fail,
            MailType::Requeue,
            MailType::All,
        ]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

impl MailType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MailType::None => "NONE",
            MailType::Begin => "BEGIN",
            MailType::End => "END",
            MailType::Fail => "FAIL",
            MailType::Requeue => "REQUEUE",
            MailType::All => "ALL",
        }
    }
}

impl std::fmt::Display for MailType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
