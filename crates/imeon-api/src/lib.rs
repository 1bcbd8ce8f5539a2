// imeon-api: async client for the Imeon inverter local HTTP API.
//
// One inverter = one `ImeonClient`. The client owns the HTTP session
// (cookie-based login), the accumulated nested state storage, and one
// setter method per writable inverter setting.

pub mod auth;
pub mod client;
pub mod data;
pub mod error;
pub mod settings;
pub mod transport;

pub use client::ImeonClient;
pub use error::Error;
pub use transport::TransportConfig;

/// Per-request timeout applied to every HTTP call.
///
/// Consumers that sequence several calls (login + fetch) should bound the
/// whole sequence with a multiple of this, not rely on it alone.
pub const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);
