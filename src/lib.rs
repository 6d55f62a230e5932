pub mod cli;
pub mod cluster;
pub mod config;
pub mod db;
pub mod error;
pub mod hamming;
pub mod hasher;
pub mod matcher;
pub mod query;
pub mod report;
pub mod store;
pub mod utils;

pub use cluster::{CancelToken, ClusterBuilder, Group, cluster_all};
pub use config::Opts;
pub use error::IndexError;
pub use hamming::HashValue;
pub use matcher::{Threshold, is_match};
pub use query::{Neighbor, find_similar, find_similar_any, find_similar_to};
pub use store::HashStore;
