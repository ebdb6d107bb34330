//! Error types for bridge operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Required configuration is missing or unresolvable
    ///
    /// Use for: no launchable executable found, missing required port
    /// on attach. Fatal to the session.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A breakpoint reconciliation exceeded its time bound
    ///
    /// Fails only the specific pending operation; the session's breakpoint
    /// queue continues unaffected.
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// The engine rejected a single command
    ///
    /// Per-line breakpoint rejections are recovered locally and never
    /// surface as this variant; everything else does.
    #[error("Engine rejected command: {0}")]
    EngineRejected(String),

    /// Expression evaluation raised inside the target
    ///
    /// Carries the engine's own exception description text.
    #[error("Evaluation failed: {0}")]
    Evaluation(String),

    /// Stale or unknown handle, script id, or source reference
    #[error("Not found: {0}")]
    NotFound(String),

    /// Engine process errors, or the connection closed/detached unexpectedly
    ///
    /// Fatal to the session; triggers full teardown without reconnection.
    #[error("Connection lost: {0}")]
    Connection(String),

    /// Malformed protocol payloads
    ///
    /// Automatically converted from `serde_json::Error` via `From` impl.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Protocol(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Connection(err.to_string())
    }
}
