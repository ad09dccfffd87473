pub mod classify;
pub mod collector;
pub mod error;
pub mod files;
pub mod host;
pub mod platform;
pub mod process;
pub mod resources;
pub mod snapshot;

pub use collector::{Collector, CollectorConfig};
pub use error::CollectError;
pub use snapshot::{Section, Snapshot};
