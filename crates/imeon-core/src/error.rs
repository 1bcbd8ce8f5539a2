use thiserror::Error;

/// Top-level error type for the `imeon-core` crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Registry ────────────────────────────────────────────────────
    /// Lookup of a device label that was never registered. Indicates a
    /// configuration inconsistency, not a runtime device fault.
    #[error("no device registered under label `{id}`")]
    CoordinatorNotFound { id: String },

    // ── Commands ────────────────────────────────────────────────────
    /// A command argument failed validation against its descriptor.
    #[error("invalid argument for `{command}`: {message}")]
    InvalidArgument {
        command: &'static str,
        message: String,
    },

    /// A command name with no descriptor.
    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    // ── Device ──────────────────────────────────────────────────────
    /// A failure from the device API client.
    #[error(transparent)]
    Api(#[from] imeon_api::Error),
}

impl CoreError {
    /// Returns `true` if this error is a device request timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_timeout())
    }
}
