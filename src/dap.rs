//! Client-facing protocol bodies
//!
//! The shapes this session hands to (and accepts from) the IDE-side
//! transport, per the Debug Adapter Protocol:
//! <https://microsoft.github.io/debug-adapter-protocol/specification>
//!
//! Only the subset the session surface actually uses is modeled; the wire
//! transport that frames and routes these bodies is an external collaborator.

use serde::{Deserialize, Serialize};

// ============================================================
// CAPABILITIES
// ============================================================

/// Capabilities returned from `initialize`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    /// Adapter understands the configurationDone request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_configuration_done_request: Option<bool>,
    /// Exception filter options shown by the client
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub exception_breakpoint_filters: Vec<ExceptionBreakpointsFilter>,
    /// Adapter supports function breakpoints.
    /// Deliberately unset: function breakpoints are accepted but have no effect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_function_breakpoints: Option<bool>,
    /// Adapter supports the evaluate request for hovers/watches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_evaluate_for_hovers: Option<bool>,
}

/// One selectable exception-pause filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionBreakpointsFilter {
    /// Filter id sent back in setExceptionBreakpoints
    pub filter: String,
    /// Human-readable label
    pub label: String,
    /// Whether the filter is enabled by default
    #[serde(default)]
    pub default: bool,
}

// ============================================================
// SOURCES AND BREAKPOINTS
// ============================================================

/// A source the client can address breakpoints and content requests at
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Resolvable path or URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Reference for sources with no client-openable path.
    /// Encodes the engine script id invertibly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_reference: Option<i64>,
}

impl Source {
    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn from_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_source_reference(mut self, reference: i64) -> Self {
        self.source_reference = Some(reference);
        self
    }
}

/// Requested breakpoint position within a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceBreakpoint {
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based, optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl SourceBreakpoint {
    pub fn at_line(line: u32) -> Self {
        Self { line, column: None }
    }
}

/// Result row for one requested breakpoint, positionally matching the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    /// Whether the engine accepted and bound the breakpoint
    pub verified: bool,
    /// Actual bound line when verified, requested line otherwise
    pub line: u32,
    /// Actual bound column when verified, 0 otherwise
    pub column: u32,
}

impl Breakpoint {
    /// Unverified row at the requested location
    pub fn unverified(line: u32) -> Self {
        Self {
            verified: false,
            line,
            column: 0,
        }
    }

    /// Verified row at the engine's actual resolved location
    pub fn verified(line: u32, column: u32) -> Self {
        Self {
            verified: true,
            line,
            column,
        }
    }
}

// ============================================================
// STACK, SCOPES, VARIABLES
// ============================================================

/// One frame of the paused call stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    /// Frame id the client passes back to scopes/evaluate
    pub id: i64,
    /// Function name or a placeholder
    pub name: String,
    /// Source this frame executes in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
}

/// A variable scope of one stack frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    /// Display name (engine scope type, first character upper-cased)
    pub name: String,
    /// Handle to request the scope's contents with
    pub variables_reference: i64,
    /// True for scopes the client may want to lazy-render (global)
    pub expensive: bool,
}

/// A named value within a scope or object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub name: String,
    /// Rendered display value
    pub value: String,
    /// Handle for expanding children; 0 when the value has none
    #[serde(default)]
    pub variables_reference: i64,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<String>, reference: i64) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            variables_reference: reference,
        }
    }
}

// ============================================================
// THREADS, SOURCE CONTENT, EVALUATE
// ============================================================

/// One reported thread. This adapter always reports exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: i64,
    pub name: String,
}

/// Response body for a source-content request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceContent {
    pub content: String,
    pub mime_type: String,
}

/// Response body for an evaluate request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResult {
    /// Rendered display value of the result
    pub result: String,
    /// Handle for expanding the result; 0 when not expandable
    #[serde(default)]
    pub variables_reference: i64,
}
