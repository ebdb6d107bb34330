//! Client-bound events
//!
//! Asynchronous notifications the session fans out to the IDE-side
//! transport. The last three are adapter-private signals for companion
//! collaborators (e.g. a source-map layer) rather than end-user messages.

use tokio::sync::mpsc;
use tracing::debug;

/// Events delivered to the client transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Adapter is attached and ready for configuration requests
    Initialized,
    /// Execution stopped
    Stopped {
        reason: String,
        thread_id: i64,
        text: Option<String>,
    },
    /// The debug session ended
    Terminated,
    /// Console/diagnostic output
    Output { text: String, category: String },
    /// Execution resumed without a client request
    Continued { thread_id: i64 },
    /// Adapter-private: the engine parsed a script
    ScriptParsed {
        url: String,
        source_map_url: Option<String>,
    },
    /// Adapter-private: all target-derived state became invalid
    ClearTargetContext,
    /// Adapter-private: the client detached
    ClearClientContext,
}

/// Sender half of the client event stream. Unbounded: the stream is
/// low-volume and must be lossless - the client cannot recover from a
/// missed `Stopped` or `Terminated`.
pub type ClientEventSender = mpsc::UnboundedSender<ClientEvent>;

/// Deliver an event without blocking the session timeline. Only a departed
/// receiver loses events.
pub fn emit(tx: &ClientEventSender, event: ClientEvent) {
    if let Err(e) = tx.send(event) {
        debug!("Client transport gone, dropping event: {:?}", e.0);
    }
}
