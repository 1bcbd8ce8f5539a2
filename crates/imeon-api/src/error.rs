use thiserror::Error;

/// Top-level error type for the `imeon-api` crate.
///
/// Covers every failure mode of the inverter's local HTTP API:
/// authentication, transport, the `{status, message, data}` envelope,
/// and malformed payloads. `imeon-core` maps these into user-facing
/// diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected or session expired (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Device address could not be parsed into a URL.
    #[error("Invalid device address: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Device API ──────────────────────────────────────────────────
    /// The device answered with a non-ok status in its envelope.
    #[error("Device API error: {message}")]
    Api { message: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Usage ───────────────────────────────────────────────────────
    /// Incremental update requested before any full initialization.
    #[error("Client state not initialized -- call init() first")]
    NotInitialized,
}

impl Error {
    /// Returns `true` if this error is a request timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// Returns `true` if re-authentication might resolve this error.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}
