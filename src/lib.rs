//! Debug adapter session core for remote script engines
//!
//! Bridges a synchronous, request-driven IDE debugging client and an
//! asynchronous remote script-execution engine speaking a DevTools-style
//! protocol. The crate owns the session semantics: script identity, object
//! reference handles, breakpoint reconciliation, execution state, and
//! stack/scope/variable translation. Wire transports on both sides are
//! external collaborators behind traits and channels.
//!
//! # Architecture
//!
//! - [`session::Session`] orchestrates one debugging session end to end
//! - [`engine::EngineClient`] is the contract to the remote engine
//! - [`client::ClientEvent`] is the asynchronous stream back to the IDE
//! - [`scripts`], [`handles`], [`breakpoints`], [`execution`] hold the
//!   per-session state machines
//! - [`translate`] and [`format`] are the pure mapping layers

pub mod breakpoints;
pub mod cdp;
pub mod client;
pub mod constants;
pub mod dap;
pub mod engine;
pub mod error;
pub mod execution;
pub mod format;
pub mod handles;
pub mod process;
pub mod scripts;
pub mod session;
pub mod translate;

pub use client::{ClientEvent, ClientEventSender};
pub use engine::{EngineClient, PauseOnExceptions};
pub use error::{Error, Result};
pub use session::{AttachConfig, LaunchConfig, Session, SessionConfig};
