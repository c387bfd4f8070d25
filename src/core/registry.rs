//! Programs installed on the cluster: where their executables live, which
//! versions exist, how their input files are named and how much of a node
//! they are expected to use.
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::ProgramKind;

/// One installed program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramInfo {
    /// Glob used to discover input files, e.g. `*.in`
    pub input_pattern: String,
    /// Installed version names
    pub versions: Vec<String>,
    /// Top-level install directory shared by all versions
    pub trunk: PathBuf,
    /// Version -> executable (or environment root)
    pub executables: BTreeMap<String, PathBuf>,
    /// Suggested ceiling; requests above it only warn
    #[serde(default)]
    pub max_cpus: Option<u32>,
    #[serde(default)]
    pub max_mem_gb: Option<u64>,
}

impl ProgramInfo {
    fn new(input_pattern: &str, trunk: &str, versions: &[&str], root: impl Fn(&str) -> String) -> Self {
        let trunk = PathBuf::from(trunk);
        let executables = versions
            .iter()
            .map(|v| (v.to_string(), trunk.join(root(v))))
            .collect();
        Self {
            input_pattern: input_pattern.to_string(),
            versions: versions.iter().map(|v| v.to_string()).collect(),
            trunk,
            executables,
            max_cpus: None,
            max_mem_gb: None,
        }
    }

    fn with_ceilings(mut self, cpus: u32, mem_gb: u64) -> Self {
        self.max_cpus = Some(cpus);
        self.max_mem_gb = Some(mem_gb);
        self
    }

    /// The highest installed version under natural ordering.
    pub fn latest_version(&self) -> Option<&str> {
        self.versions
            .iter()
            .max_by(|a, b| compare_versions(a, b))
            .map(String::as_str)
    }

    pub fn has_version(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }

    /// Executable for `version`; falls back to the trunk when the table has no entry.
    pub fn executable(&self, version: &str) -> PathBuf {
        self.executables
            .get(version)
            .cloned()
            .unwrap_or_else(|| self.trunk.clone())
    }
}

/// Compare version names: digit runs numerically, everything else lexically.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (a, b);
    loop {
        match (a.is_empty(), b.is_empty()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
        let (ca, ra) = split_chunk(a);
        let (cb, rb) = split_chunk(b);
        let ord = match (ca.parse::<u64>(), cb.parse::<u64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => ca.cmp(cb),
        };
        if ord != Ordering::Equal {
            return ord;
        }
        a = ra;
        b = rb;
    }
}

fn split_chunk(s: &str) -> (&str, &str) {
    let digit = s.starts_with(|c: char| c.is_ascii_digit());
    let end = s
        .find(|c: char| c.is_ascii_digit() != digit)
        .unwrap_or(s.len());
    s.split_at(end)
}

/// Program name -> `ProgramInfo`
#[derive(Debug, Clone, PartialEq)]
pub struct Registry {
    programs: BTreeMap<ProgramKind, ProgramInfo>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Registry {
    /// The programs installed on the cluster today.
    pub fn builtin() -> Self {
        let mut programs = BTreeMap::new();
        programs.insert(
            ProgramKind::Date,
            ProgramInfo::new("*.sh", "/usr/bin", &["1"], |_| "date".to_string()).with_ceilings(1, 4),
        );
        programs.insert(
            ProgramKind::Qchem,
            ProgramInfo::new("*.in", "/usr/local/sw/qchem", &["541", "53"], |v| {
                format!("qchem{v}")
            })
            .with_ceilings(48, 380),
        );
        programs.insert(
            ProgramKind::Gaussian,
            ProgramInfo::new("*.com", "/usr/local/sw/gaussian", &["16B01"], |v| {
                format!("g{v}/g16")
            })
            .with_ceilings(48, 380),
        );
        programs.insert(
            ProgramKind::Amber,
            ProgramInfo::new("*.mdin", "/usr/local/sw/amber", &["20"], |v| {
                format!("amber{v}")
            })
            .with_ceilings(8, 64),
        );
        Self { programs }
    }

    /// Built-in table with the entries of a JSON override file laid on top.
    ///
    /// The file is an object keyed by program name:
    /// ```json
    /// { "qchem": { "input_pattern": "*.in", "versions": ["60"],
    ///              "trunk": "/opt/qchem", "executables": { "60": "/opt/qchem/qchem60" } } }
    /// ```
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let raw: BTreeMap<String, ProgramInfo> = serde_json::from_str(&text)?;

        let mut registry = Self::builtin();
        for (name, info) in raw {
            let kind: ProgramKind = name.parse().map_err(|_| Error::UnknownProgram {
                name: name.clone(),
                path: path.to_path_buf(),
            })?;
            debug!("Registry override for {}: {:?}", kind, info.versions);
            registry.programs.insert(kind, info);
        }
        info!("Loaded program registry from {}", path.display());
        Ok(registry)
    }

    pub fn get(&self, kind: ProgramKind) -> Option<&ProgramInfo> {
        self.programs.get(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProgramKind, &ProgramInfo)> {
        self.programs.iter().map(|(k, v)| (*k, v))
    }
}
