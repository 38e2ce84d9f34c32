//! Snapshot provider for cloudcost
//!
//! Serves inventory, metric samples and billing groups from a JSON
//! snapshot exported from the cloud account, so reports can be produced
//! without live API access.

pub mod data_loader;

pub use data_loader::SnapshotSource;
