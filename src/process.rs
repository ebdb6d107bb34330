//! Engine host process launching
//!
//! Launch mode needs the engine's host process started before the session
//! can attach to its remote-debugging port. The launcher starts it detached
//! and unsupervised: spawn errors surface immediately (and terminate the
//! session), but the process is never awaited, killed, or restarted by this
//! crate.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::info;

/// Starts the engine's host process. Process-level spawn failures are
/// session-fatal; nothing is retried.
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    async fn launch(&self, executable: &Path, args: &[String]) -> Result<()>;
}

/// Default launcher: spawns the executable detached with all stdio ignored.
/// The child is deliberately dropped without kill-on-drop so it outlives the
/// debugging session.
#[derive(Debug, Default)]
pub struct DetachedLauncher;

#[async_trait]
impl ProcessLauncher for DetachedLauncher {
    async fn launch(&self, executable: &Path, args: &[String]) -> Result<()> {
        info!(
            "Launching engine host: {} {}",
            executable.display(),
            args.join(" ")
        );

        let child = Command::new(executable)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(false)
            .spawn()
            .map_err(|e| {
                Error::Connection(format!(
                    "Failed to launch {}: {}",
                    executable.display(),
                    e
                ))
            })?;

        // Detached: dropping the handle leaves the process running.
        drop(child);
        Ok(())
    }
}
