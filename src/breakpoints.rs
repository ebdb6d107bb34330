//! Breakpoint reconciliation
//!
//! Each client set-breakpoints request replaces the breakpoints of one
//! script URL: previously committed engine breakpoints are removed, the
//! requested ones are (re)added, and the outcome is mapped back positionally
//! to response rows.
//!
//! Reconciliations for the whole session are totally ordered behind a single
//! fair queue - the engine cannot safely process interleaved add/remove
//! cycles even across different scripts. Within one operation, removals are
//! strictly sequential (removing several at once puts some engines into a
//! state where later additions on the same line are spuriously rejected),
//! while additions are independent engine calls and run concurrently.
//!
//! The engine edits of one operation always run to completion: the caller's
//! time bound gives up on waiting, never on the work. A timed-out operation
//! keeps its queue slot until it finishes in the background, so a
//! half-applied removal loop can never orphan live engine breakpoints.

use crate::constants::defaults::BREAKPOINT_TIMEOUT_MS;
use crate::dap::{Breakpoint, SourceBreakpoint};
use crate::engine::EngineClient;
use crate::error::{Error, Result};
use crate::scripts::{is_placeholder_url, script_id_from_placeholder};
use crate::translate::{to_client_column, to_client_line, to_engine_column, to_engine_line};
use crate::cdp::BreakpointSpot;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Serializes and applies breakpoint edits for the session
#[derive(Debug)]
pub struct BreakpointReconciler {
    /// FIFO queue slot: operation N+1 does not begin until N completed.
    /// tokio's Mutex is fair, so lock order is arrival order. Held by the
    /// reconcile task itself, not its caller.
    queue: Arc<Mutex<()>>,
    /// Engine breakpoint ids currently believed live, per script URL.
    /// Mutated only inside a queued reconciliation for that URL.
    committed: Arc<Mutex<HashMap<String, Vec<String>>>>,
    /// Bound on waiting for one reconciliation
    timeout: Duration,
}

impl Default for BreakpointReconciler {
    fn default() -> Self {
        Self::new(Duration::from_millis(BREAKPOINT_TIMEOUT_MS))
    }
}

impl BreakpointReconciler {
    pub fn new(timeout: Duration) -> Self {
        Self {
            queue: Arc::new(Mutex::new(())),
            committed: Arc::new(Mutex::new(HashMap::new())),
            timeout,
        }
    }

    /// Replace the breakpoints for `url` with `requested`, strictly after all
    /// previously queued operations complete.
    ///
    /// Timing out fails this request but never cancels the engine edits: the
    /// spawned operation runs to completion, updates the committed set, and
    /// only then releases the queue slot. A per-line engine rejection is
    /// swallowed into an unverified row rather than failing the batch.
    pub async fn set_breakpoints(
        &self,
        engine: Arc<dyn EngineClient>,
        url: &str,
        requested: &[SourceBreakpoint],
    ) -> Result<Vec<Breakpoint>> {
        let slot = Arc::clone(&self.queue).lock_owned().await;
        debug!(
            "Reconciling {} breakpoint(s) for {}",
            requested.len(),
            url
        );

        let committed = Arc::clone(&self.committed);
        let task_url = url.to_string();
        let requested = requested.to_vec();
        let task = tokio::spawn(async move {
            let rows = reconcile(engine.as_ref(), &committed, &task_url, &requested).await;
            drop(slot);
            rows
        });

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(rows)) => Ok(rows),
            Ok(Err(e)) => Err(Error::Connection(format!(
                "Breakpoint reconciliation for {} failed: {}",
                url, e
            ))),
            Err(_) => {
                warn!(
                    "Breakpoint reconciliation for {} timed out after {}ms; \
                     it will finish in the background",
                    url,
                    self.timeout.as_millis()
                );
                Err(Error::Timeout(self.timeout.as_millis() as u64))
            }
        }
    }

    /// Ids currently believed live for a URL (empty when none committed)
    pub async fn committed_ids(&self, url: &str) -> Vec<String> {
        self.committed
            .lock()
            .await
            .get(url)
            .cloned()
            .unwrap_or_default()
    }

    /// Drop all commitments. Called on full context reset; the engine-side
    /// breakpoints died with the context, so nothing is removed remotely.
    pub async fn reset(&self) {
        self.committed.lock().await.clear();
    }
}

async fn reconcile(
    engine: &dyn EngineClient,
    committed: &Mutex<HashMap<String, Vec<String>>>,
    url: &str,
    requested: &[SourceBreakpoint],
) -> Vec<Breakpoint> {
    // Clear the committed entry before adding; it is repopulated only
    // with ids the engine actually accepted.
    let previous = committed.lock().await.remove(url).unwrap_or_default();

    // One at a time - never in parallel.
    for id in previous {
        if let Err(e) = engine.remove_breakpoint(&id).await {
            warn!("Failed to remove breakpoint {}: {}", id, e);
        }
    }

    // Additions are independent; issue them concurrently but await all.
    let adds = requested.iter().map(|bp| add_one(engine, url, bp));
    let spots: Vec<Option<BreakpointSpot>> = futures::future::join_all(adds).await;

    let live: Vec<String> = spots
        .iter()
        .flatten()
        .map(|spot| spot.breakpoint_id.clone())
        .collect();
    debug!("Committed {} breakpoint id(s) for {}", live.len(), url);
    committed.lock().await.insert(url.to_string(), live);

    // Positional correspondence with the request.
    requested
        .iter()
        .zip(spots)
        .map(|(bp, spot)| match spot.and_then(|s| s.actual_location) {
            Some(location) => Breakpoint::verified(
                to_client_line(location.line_number),
                to_client_column(location.column_number),
            ),
            None => Breakpoint::unverified(bp.line),
        })
        .collect()
}

/// Install one breakpoint, swallowing engine rejection into `None`.
///
/// Real URLs are addressed by URL so the engine rebinds the breakpoint
/// after a reload (needed to hit breakpoints firing during initial
/// script execution). Placeholder URLs carry their script id and are
/// addressed raw.
async fn add_one(
    engine: &dyn EngineClient,
    url: &str,
    bp: &SourceBreakpoint,
) -> Option<BreakpointSpot> {
    let line = to_engine_line(bp.line);
    let column = to_engine_column(bp.column);

    let result = if is_placeholder_url(url) {
        match script_id_from_placeholder(url) {
            Some(script_id) => engine.set_breakpoint(script_id, line, column).await,
            None => return None,
        }
    } else {
        engine.set_breakpoint_by_url(url, line, column).await
    };

    match result {
        Ok(spot) => Some(spot),
        Err(e) => {
            debug!("Breakpoint add at {}:{} rejected: {}", url, bp.line, e);
            None
        }
    }
}
