// imeon-core: the device coordination layer.
//
// One configured inverter = one `Coordinator`, registered by its stable
// label in a `CoordinatorRegistry`. The coordinator owns the API client,
// polls the device, flattens the nested state into a single-level
// snapshot, and publishes it through a watch channel. Entities are thin
// per-field views over that snapshot; commands are validated against
// static descriptors and dispatched to the matching client setter.

pub mod command;
pub mod config;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod fields;
pub mod registry;

pub use command::{ActionResponse, Command};
pub use config::DeviceConfig;
pub use coordinator::{Coordinator, Snapshot};
pub use error::CoreError;
pub use registry::CoordinatorRegistry;

/// Fixed polling cadence of the refresh loop.
pub const REFRESH_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);
