//! I/O layer talking to the scheduler: the `cluster` partition provider
//! (`sinfo`) and the `submit` script writer and `sbatch` runner.
pub mod cluster;
pub use cluster::{ClusterInfo, Partition, Partitions, SinfoCluster, StaticCluster};

pub mod submit;
pub use submit::{Submission, Submitter};
