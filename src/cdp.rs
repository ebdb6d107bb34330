//! Engine-facing protocol payloads
//!
//! Typed shapes for the remote engine's command results and event
//! notifications (Chrome DevTools Protocol). Lines and columns in these
//! payloads are 0-based; the client-facing side is 1-based and the
//! translator converts at the boundary.

use serde::{Deserialize, Serialize};

// ============================================================
// OBJECTS AND PROPERTIES
// ============================================================

/// A value living in the remote engine, reachable through `object_id`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
    /// Object type string ("object", "function", "string", "number", ...)
    #[serde(rename = "type")]
    pub object_type: String,
    /// Subtype for object types ("array", "null", "error", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    /// Constructor/class name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Primitive value, when representable in JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    /// Engine-rendered description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Opaque identifier for on-demand property expansion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
}

impl RemoteObject {
    /// Shorthand for a primitive with a JSON value
    pub fn primitive(object_type: impl Into<String>, value: serde_json::Value) -> Self {
        let value_str = value.to_string();
        Self {
            object_type: object_type.into(),
            value: Some(value),
            description: Some(value_str),
            ..Default::default()
        }
    }

    /// Shorthand for a reference-carrying object
    pub fn with_id(object_type: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            object_id: Some(object_id.into()),
            ..Default::default()
        }
    }
}

/// One property of a remote object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    pub name: String,
    /// Present for data properties
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<RemoteObject>,
    /// Getter function, for accessor properties
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<RemoteObject>,
    /// Setter function, for accessor properties
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set: Option<RemoteObject>,
}

impl PropertyDescriptor {
    /// True when the property is backed by a getter/setter rather than a value
    pub fn is_accessor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }
}

// ============================================================
// LOCATIONS, FRAMES, SCOPES
// ============================================================

/// A position within a parsed script (0-based)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub script_id: String,
    pub line_number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_number: Option<u32>,
}

/// One scope in a call frame's chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    /// Scope type ("local", "closure", "global", "exception", ...)
    #[serde(rename = "type")]
    pub scope_type: String,
    /// The scope's backing object; expandable through its object id
    pub object: RemoteObject,
}

/// One frame of the engine's paused call stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
    /// Engine identifier used to address frame-scoped commands
    pub call_frame_id: String,
    /// Function name; empty for anonymous functions
    #[serde(default)]
    pub function_name: String,
    pub location: Location,
    #[serde(default)]
    pub scope_chain: Vec<Scope>,
    /// The frame's `this` binding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub this: Option<RemoteObject>,
}

// ============================================================
// COMMAND RESULTS
// ============================================================

/// Result of installing one breakpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakpointSpot {
    /// Engine-assigned breakpoint id
    pub breakpoint_id: String,
    /// Where the breakpoint actually bound; absent when the engine accepted
    /// it without resolving a location yet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_location: Option<Location>,
}

/// Details of an exception raised during evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
    /// Engine-rendered description of the exception
    pub text: String,
    /// The thrown value, when the engine exposes it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<RemoteObject>,
}

/// Result of an evaluate command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateOutcome {
    pub result: RemoteObject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception_details: Option<ExceptionDetails>,
}

// ============================================================
// EVENT PAYLOADS
// ============================================================

/// Payload of a script-parsed notification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptParsedParams {
    pub script_id: String,
    /// Empty for scripts with no URL (eval code)
    #[serde(default)]
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_map_url: Option<String>,
    #[serde(default)]
    pub is_content_script: bool,
    #[serde(default)]
    pub is_internal_script: bool,
}

/// Payload of a pause notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PausedParams {
    pub call_frames: Vec<CallFrame>,
    /// Engine pause reason; "exception" carries the thrown value in `data`
    #[serde(default)]
    pub reason: String,
    /// The thrown value when pausing on an exception
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<RemoteObject>,
    /// Breakpoint ids whose locations were hit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit_breakpoints: Option<Vec<String>>,
}

/// Payload of a breakpoint-resolved notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakpointResolvedParams {
    pub breakpoint_id: String,
    pub location: Location,
}

/// Payload of a console-API-called notification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleApiParams {
    /// Console call kind ("log", "error", "warning", ...)
    #[serde(rename = "type", default)]
    pub call_type: String,
    #[serde(default)]
    pub args: Vec<RemoteObject>,
}

/// Every notification the engine client surfaces to the session
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Paused(PausedParams),
    Resumed,
    ScriptParsed(ScriptParsedParams),
    BreakpointResolved(BreakpointResolvedParams),
    /// The engine's global object was cleared (page navigated/reloaded);
    /// invalidates all script ids and object references
    GlobalObjectCleared,
    ConsoleApiCalled(ConsoleApiParams),
    /// Connection lifecycle - all three terminate the session
    Detached(String),
    Closed,
    Errored(String),
}
