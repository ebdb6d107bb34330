//! Execution state tracking
//!
//! Single source of truth for "is the target paused", the current call-frame
//! stack while paused, and suppression of the spurious client "continued"
//! notification after adapter-issued resume commands. State changes only
//! through the engine's pause/resume event path, never optimistically.

use crate::cdp::{CallFrame, PausedParams, RemoteObject, Scope};
use crate::constants::{scope_types, stop_reasons, PAUSED_OVERLAY_MESSAGE};
use crate::engine::EngineClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Exactly one of these holds at any time
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionState {
    Running,
    /// The stack is valid only while paused; replaced atomically on every
    /// pause event and cleared atomically on every resume event
    Paused(Vec<CallFrame>),
}

/// What a pause event means for the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PauseSummary {
    /// "exception", "breakpoint", or "step"
    pub reason: &'static str,
    /// Exception description, when pausing on an exception
    pub text: Option<String>,
}

#[derive(Debug, Default)]
pub struct ExecutionTracker {
    state: ExecutionState,
    /// Set before an adapter-issued resume command; consumes exactly one
    /// subsequent resume notification
    expect_resume: bool,
    /// Remembered primitive exception value, consumed through the reserved
    /// exception handle
    exception_value: Option<RemoteObject>,
}

impl Default for ExecutionState {
    fn default() -> Self {
        ExecutionState::Running
    }
}

impl ExecutionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a pause notification: replace the stack and compute the
    /// client-facing stop reason.
    ///
    /// An object-valued exception is wrapped as a synthetic topmost
    /// "Exception" scope on the top frame; a primitive-valued one is stored
    /// in the exception slot and exposed through the reserved handle.
    pub fn on_paused(&mut self, mut params: PausedParams) -> PauseSummary {
        let summary = if params.reason == stop_reasons::EXCEPTION {
            let text = params
                .data
                .as_ref()
                .and_then(|data| data.description.clone());

            match params.data.take() {
                Some(data) if data.object_id.is_some() => {
                    if let Some(top) = params.call_frames.first_mut() {
                        top.scope_chain.insert(
                            0,
                            Scope {
                                scope_type: scope_types::EXCEPTION.to_string(),
                                object: data,
                            },
                        );
                    }
                }
                data => self.exception_value = data,
            }

            PauseSummary {
                reason: stop_reasons::EXCEPTION,
                text,
            }
        } else if params
            .hit_breakpoints
            .as_ref()
            .is_some_and(|ids| !ids.is_empty())
        {
            PauseSummary {
                reason: stop_reasons::BREAKPOINT,
                text: None,
            }
        } else {
            PauseSummary {
                reason: stop_reasons::STEP,
                text: None,
            }
        };

        debug!(
            "Paused: reason={} frames={}",
            summary.reason,
            params.call_frames.len()
        );
        self.state = ExecutionState::Paused(params.call_frames);
        summary
    }

    /// Apply a resume notification. Returns true when a client "continued"
    /// event must be emitted - the client protocol otherwise has no way to
    /// learn that a paused target resumed on its own.
    pub fn on_resumed(&mut self) -> bool {
        self.state = ExecutionState::Running;
        if self.expect_resume {
            self.expect_resume = false;
            trace!("Resumed (adapter-initiated, suppressing continued event)");
            false
        } else {
            trace!("Resumed (target-initiated)");
            true
        }
    }

    /// Arm the one-shot suppression before issuing a resume-causing command
    pub fn mark_adapter_resume(&mut self) {
        self.expect_resume = true;
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.state, ExecutionState::Paused(_))
    }

    /// The current stack, valid only while paused
    pub fn frames(&self) -> Option<&[CallFrame]> {
        match &self.state {
            ExecutionState::Paused(frames) => Some(frames),
            ExecutionState::Running => None,
        }
    }

    /// Consume the remembered primitive exception value
    pub fn take_exception_value(&mut self) -> Option<RemoteObject> {
        self.exception_value.take()
    }

    pub fn reset(&mut self) {
        self.state = ExecutionState::Running;
        self.expect_resume = false;
        self.exception_value = None;
    }
}

// ============================================================
// PAUSED OVERLAY
// ============================================================

/// Debounces the engine-side paused indicator so rapid pause/resume does not
/// flicker it: each request cancels the previous pending one, and only the
/// last-requested state within the window reaches the engine.
#[derive(Debug, Default)]
pub struct OverlayDebouncer {
    pending: Option<JoinHandle<()>>,
}

impl OverlayDebouncer {
    /// Schedule the overlay into `shown` state after the debounce window
    pub fn request(&mut self, engine: Arc<dyn EngineClient>, shown: bool, window: Duration) {
        if let Some(previous) = self.pending.take() {
            previous.abort();
        }
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let message = shown.then_some(PAUSED_OVERLAY_MESSAGE);
            if let Err(e) = engine.set_overlay_message(message).await {
                trace!("Overlay update failed (ignored): {}", e);
            }
        }));
    }

    /// Drop any pending overlay change without applying it
    pub fn cancel(&mut self) {
        if let Some(previous) = self.pending.take() {
            previous.abort();
        }
    }
}

impl Drop for OverlayDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
