pub mod client;
pub mod instances;

pub use client::{BridgeClient, HapClient};
pub use instances::InstanceTable;
