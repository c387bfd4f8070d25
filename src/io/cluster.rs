//! Cluster information from the scheduler: which partitions exist, how much
//! memory and how many CPUs a node in each one offers.
use std::collections::BTreeMap;
use std::env;
use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};

/// Environment variable naming an alternative `sinfo` executable
pub const SINFO_ENV: &str = "AUTOSLURM_SINFO";

const SINFO_FORMAT: &str = "%P %m %c %D";

/// Partitions bought by individual research groups
pub const CONDO_PARTITIONS: [&str; 8] = [
    "bukach",
    "diaz",
    "erickson",
    "johnson",
    "parish",
    "yang1",
    "yang2",
    "yangnolin",
];

pub fn is_condo(partition: &str) -> bool {
    CONDO_PARTITIONS.contains(&partition)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub name: String,
    /// Memory per node in MB
    pub memory_mb: u64,
    /// CPUs per node
    pub cpus: u32,
    pub nodes: u32,
    /// Marked with `*` by sinfo
    pub is_default: bool,
}

impl Partition {
    pub fn memory_gb(&self) -> u64 {
        self.memory_mb / 1000
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partitions {
    by_name: BTreeMap<String, Partition>,
}

impl Partitions {
    pub fn get(&self, name: &str) -> Option<&Partition> {
        self.by_name.get(name)
    }

    pub fn default_partition(&self) -> Option<&Partition> {
        self.by_name.values().find(|p| p.is_default)
    }

    pub fn names(&self) -> Vec<&str> {
        self.by_name.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Partition> {
        self.by_name.values()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Merge another line for the same partition: largest node wins, node counts add up.
    fn insert(&mut self, part: Partition) {
        match self.by_name.get_mut(&part.name) {
            Some(existing) => {
                existing.memory_mb = existing.memory_mb.max(part.memory_mb);
                existing.cpus = existing.cpus.max(part.cpus);
                existing.nodes += part.nodes;
                existing.is_default |= part.is_default;
            }
            None => {
                self.by_name.insert(part.name.clone(), part);
            }
        }
    }
}

impl FromIterator<Partition> for Partitions {
    fn from_iter<I: IntoIterator<Item = Partition>>(iter: I) -> Self {
        let mut parts = Partitions::default();
        for p in iter {
            parts.insert(p);
        }
        parts
    }
}

/// Source of partition definitions
pub trait ClusterInfo {
    fn partitions(&self) -> Result<Partitions>;
}

/// Queries the live scheduler with `sinfo`
#[derive(Debug, Clone)]
pub struct SinfoCluster {
    exec: String,
}

impl Default for SinfoCluster {
    fn default() -> Self {
        Self::new()
    }
}

impl SinfoCluster {
    pub fn new() -> Self {
        let exec = env::var(SINFO_ENV).unwrap_or_else(|_| "sinfo".to_string());
        Self { exec }
    }
}

impl ClusterInfo for SinfoCluster {
    fn partitions(&self) -> Result<Partitions> {
        trace!("Running command: {} -h -o {:?}", self.exec, SINFO_FORMAT);
        let output = Command::new(&self.exec)
            .args(["-h", "-o", SINFO_FORMAT])
            .output()
            .map_err(|e| Error::cluster(format!("failed to run {}: {}", self.exec, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::cluster(format!(
                "{} exited with {}: {}",
                self.exec,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        trace!("sinfo output: [{}]", stdout);
        parse_sinfo(&stdout)
    }
}

/// Fixed partition table
#[derive(Debug, Clone, Default)]
pub struct StaticCluster {
    partitions: Partitions,
}

impl StaticCluster {
    pub fn new(partitions: impl IntoIterator<Item = Partition>) -> Self {
        Self {
            partitions: partitions.into_iter().collect(),
        }
    }
}

impl ClusterInfo for StaticCluster {
    fn partitions(&self) -> Result<Partitions> {
        Ok(self.partitions.clone())
    }
}

/// Parse `sinfo -h -o "%P %m %c %D"` output.
pub fn parse_sinfo(output: &str) -> Result<Partitions> {
    let mut parts = Partitions::default();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_line(line) {
            Some(p) => parts.insert(p),
            None => warn!("Skipping malformed sinfo line: {}", line),
        }
    }

    if parts.is_empty() {
        return Err(Error::cluster("sinfo reported no partitions"));
    }
    debug!("Cluster partitions: {:?}", parts.names());
    Ok(parts)
}

fn parse_line(line: &str) -> Option<Partition> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [name, mem, cpus, nodes] = fields.as_slice() else {
        return None;
    };

    let is_default = name.ends_with('*');
    let name = name.trim_end_matches('*');
    if name.is_empty() {
        return None;
    }

    Some(Partition {
        name: name.to_string(),
        memory_mb: mem.trim_end_matches('+').parse().ok()?,
        cpus: cpus.trim_end_matches('+').parse().ok()?,
        nodes: nodes.parse().ok()?,
        is_default,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
basic* 385000 52 10
medium 768000 52 4
large 1536000+ 52 2
ML 385000 52 1
ML 512000 64 1
parish 385000 52 2
garbage line
";

    #[test]
    fn parses_default_and_suffixes() {
        let parts = parse_sinfo(SAMPLE).unwrap();
        assert_eq!(parts.names(), vec!["ML", "basic", "large", "medium", "parish"]);
        assert_eq!(parts.default_partition().unwrap().name, "basic");
        assert_eq!(parts.get("large").unwrap().memory_mb, 1_536_000);
        assert_eq!(parts.get("basic").unwrap().memory_gb(), 385);
    }

    #[test]
    fn repeated_partition_keeps_largest_node() {
        let parts = parse_sinfo(SAMPLE).unwrap();
        let ml = parts.get("ML").unwrap();
        assert_eq!(ml.memory_mb, 512_000);
        assert_eq!(ml.cpus, 64);
        assert_eq!(ml.nodes, 2);
        assert!(!ml.is_default);
    }

    #[test]
    fn empty_output_is_an_error() {
        assert!(matches!(parse_sinfo("\n\n"), Err(Error::Cluster(_))));
    }

    #[test]
    fn condo_partitions() {
        assert!(is_condo("parish"));
        assert!(!is_condo("basic"));
    }
}
