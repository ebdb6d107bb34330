//! Protocol constants
//!
//! Magic strings and default values used across the bridge.

/// Stop reasons reported to the client in "stopped" events
pub mod stop_reasons {
    /// Paused because an exception was thrown
    pub const EXCEPTION: &str = "exception";
    /// Paused because a breakpoint was hit
    pub const BREAKPOINT: &str = "breakpoint";
    /// Paused after a step operation (or any other engine pause)
    pub const STEP: &str = "step";
}

/// Output event categories sent to the client
pub mod output_categories {
    /// Regular console output
    pub const CONSOLE: &str = "console";
    /// Error output (console.error and friends)
    pub const STDERR: &str = "stderr";
}

/// Engine-side scope type strings
pub mod scope_types {
    /// Global scope - marked expensive so clients can lazy-render it
    pub const GLOBAL: &str = "global";
    /// Synthetic scope injected when pausing on an object-valued exception
    pub const EXCEPTION: &str = "exception";
}

/// Display names substituted for frames that cannot be fully symbolized
pub mod frame_names {
    /// Unnamed function in a script with a resolvable URL
    pub const ANONYMOUS: &str = "(anonymous function)";
    /// Unnamed function in evaluated code (no real URL)
    pub const EVAL: &str = "(eval code)";
    /// Frame that failed to symbolize entirely
    pub const UNKNOWN: &str = "Unknown";
}

/// Default values for session and launch configuration
pub mod defaults {
    /// Default remote-debugging port exposed by the engine host
    pub const REMOTE_DEBUGGING_PORT: u16 = 9222;
    /// Default bind address for the remote-debugging endpoint
    pub const BIND_ADDRESS: &str = "127.0.0.1";
    /// The single synthetic thread this adapter reports to the client
    pub const THREAD_ID: i64 = 1;
    /// Upper bound on one breakpoint reconciliation, in milliseconds
    pub const BREAKPOINT_TIMEOUT_MS: u64 = 2000;
    /// Debounce window for the paused overlay, in milliseconds
    pub const OVERLAY_DEBOUNCE_MS: u64 = 200;
}

/// Scheme prefix for synthetic URLs assigned to scripts the engine parsed
/// without one (e.g. `eval` code). The script id follows the prefix so the
/// URL can be mapped back to the script without a registry lookup.
pub const PLACEHOLDER_URL_SCHEME: &str = "debugadapter://";

/// URL prefixes for non-user code (browser-extension namespaces)
pub const EXTENSION_URL_PREFIXES: &[&str] = &["chrome-extension://", "extensions::"];

/// Message shown by the engine-side overlay while paused in the debugger
pub const PAUSED_OVERLAY_MESSAGE: &str = "Paused in debugger";

/// Mime type reported for fetched script sources
pub const SCRIPT_MIME_TYPE: &str = "text/javascript";

/// Name of the synthetic variable wrapping a primitive exception value
pub const EXCEPTION_VARIABLE_NAME: &str = "exception";

/// Placeholder value shown for getter/setter-backed properties.
/// Accessors are never evaluated automatically - getters may have side effects.
pub const ACCESSOR_VALUE_PLACEHOLDER: &str = "(accessor)";

/// Name of the synthetic `this` variable prepended to scope contents
pub const THIS_VARIABLE_NAME: &str = "this";
