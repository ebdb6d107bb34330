//! Remote engine client contract
//!
//! The session never owns a wire connection. It drives the engine through
//! this trait: typed command methods (each an asynchronous round trip) plus
//! a subscription stream of [`EngineEvent`]s. The concrete transport lives
//! outside this crate; tests substitute scripted stubs.

use crate::cdp::{
    BreakpointSpot, EngineEvent, EvaluateOutcome, PropertyDescriptor,
};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Engine exception-pause state, set from the client's exception filters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PauseOnExceptions {
    /// Never pause on exceptions
    None,
    /// Pause on uncaught exceptions only
    #[default]
    Uncaught,
    /// Pause on every thrown exception
    All,
}

/// Command surface and event stream of the remote script-execution engine.
///
/// Every method is a single asynchronous engine round trip; callers only
/// complete when the engine has answered (or the connection failed).
#[async_trait]
pub trait EngineClient: Send + Sync {
    /// Establish the connection to the engine's remote-debugging endpoint
    async fn connect(&self, address: &str, port: u16) -> Result<()>;

    /// Enable the debugging domain (script/pause/breakpoint notifications)
    async fn enable_debugger(&self) -> Result<()>;

    /// Enable the runtime domain (console and evaluation)
    async fn enable_runtime(&self) -> Result<()>;

    /// Install a breakpoint addressed by URL, so the engine can rebind it
    /// automatically after a reload. Line/column are 0-based.
    async fn set_breakpoint_by_url(
        &self,
        url: &str,
        line: u32,
        column: u32,
    ) -> Result<BreakpointSpot>;

    /// Install a breakpoint addressed by raw script id (for scripts with no
    /// real URL). Line/column are 0-based.
    async fn set_breakpoint(
        &self,
        script_id: &str,
        line: u32,
        column: u32,
    ) -> Result<BreakpointSpot>;

    /// Remove a previously installed breakpoint by engine id
    async fn remove_breakpoint(&self, breakpoint_id: &str) -> Result<()>;

    /// Configure when the engine pauses on thrown exceptions
    async fn set_pause_on_exceptions(&self, state: PauseOnExceptions) -> Result<()>;

    async fn resume(&self) -> Result<()>;
    async fn step_over(&self) -> Result<()>;
    async fn step_into(&self) -> Result<()>;
    async fn step_out(&self) -> Result<()>;
    async fn pause(&self) -> Result<()>;

    /// Fetch the full source text of a parsed script
    async fn get_script_source(&self, script_id: &str) -> Result<String>;

    /// Enumerate properties of a remote object.
    ///
    /// The protocol needs two distinct calls to see everything: one with
    /// `accessor_properties_only`, one with `own_properties`.
    async fn get_properties(
        &self,
        object_id: &str,
        own_properties: bool,
        accessor_properties_only: bool,
    ) -> Result<Vec<PropertyDescriptor>>;

    /// Evaluate an expression in the global context
    async fn evaluate(&self, expression: &str) -> Result<EvaluateOutcome>;

    /// Evaluate an expression in the context of a paused call frame
    async fn evaluate_on_call_frame(
        &self,
        call_frame_id: &str,
        expression: &str,
    ) -> Result<EvaluateOutcome>;

    /// Show or clear the engine-side visual pause indicator
    async fn set_overlay_message(&self, message: Option<&str>) -> Result<()>;

    /// Subscribe to engine notifications. The session subscribes once per
    /// attach and holds the receiver for the lifetime of the attachment.
    async fn subscribe_events(&self) -> mpsc::Receiver<EngineEvent>;
}
