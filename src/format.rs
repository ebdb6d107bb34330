//! Pure formatter contracts
//!
//! Two pure mappings the session consumes but does not specify: console
//! events to display text, and remote object descriptions to printable
//! values. [`BasicFormatter`] is a minimal implementation; richer renderers
//! plug in through the traits.

use crate::cdp::{ConsoleApiParams, RemoteObject};

/// A console event rendered for the client's output stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleMessage {
    pub text: String,
    pub is_error: bool,
}

/// A remote object rendered for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedValue {
    /// Printable value string
    pub display: String,
    /// Object id worth allocating a handle for, when the value is expandable
    pub reference: Option<String>,
}

/// Turns a raw console event into display text plus an error flag
pub trait ConsoleFormatter: Send + Sync {
    fn format(&self, event: &ConsoleApiParams) -> ConsoleMessage;
}

/// Turns a raw remote object description into a printable value plus an
/// optional handle-worthy reference marker
pub trait ValueFormatter: Send + Sync {
    fn render(&self, object: &RemoteObject) -> RenderedValue;
}

/// Minimal formatter: engine descriptions verbatim, references for anything
/// carrying an object id that is not the null subtype.
#[derive(Debug, Default)]
pub struct BasicFormatter;

impl ConsoleFormatter for BasicFormatter {
    fn format(&self, event: &ConsoleApiParams) -> ConsoleMessage {
        let text = event
            .args
            .iter()
            .map(|arg| self.render(arg).display)
            .collect::<Vec<_>>()
            .join(" ");
        ConsoleMessage {
            text,
            is_error: event.call_type == "error" || event.call_type == "assert",
        }
    }
}

impl ValueFormatter for BasicFormatter {
    fn render(&self, object: &RemoteObject) -> RenderedValue {
        let display = object
            .description
            .clone()
            .or_else(|| object.value.as_ref().map(|v| v.to_string()))
            .unwrap_or_else(|| object.object_type.clone());

        let reference = match object.subtype.as_deref() {
            Some("null") => None,
            _ => object.object_id.clone(),
        };

        RenderedValue { display, reference }
    }
}
