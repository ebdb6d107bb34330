//! Object reference table
//!
//! Small integer handles over remote object references (scopes, nested
//! objects) so the client can request their contents later without the
//! session holding full objects in client-visible state.
//!
//! Handles are allocated monotonically and never recycled: clients always
//! look up by the last handle they were given, so re-expanding a scope
//! simply allocates fresh handles. The table grows for the lifetime of the
//! attachment and is reset wholesale on a full context reset, never
//! incrementally freed.

use crate::cdp::RemoteObject;
use std::collections::HashMap;
use tracing::debug;

/// Reserved handle representing "the exception value currently in scope".
/// Resolving it bypasses remote-object fetch entirely.
pub const EXCEPTION_HANDLE: i64 = 1;

/// First id handed out for ordinary handles, keeping the reserved range clear
const FIRST_HANDLE: i64 = 1000;

/// What a handle stands for
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectHandle {
    /// Opaque engine reference to the remote object
    pub object_id: String,
    /// The frame's `this` binding, carried by the innermost scope handle of
    /// the top frame so `variables` can prepend a synthetic `this` entry
    pub this_object: Option<RemoteObject>,
}

impl ObjectHandle {
    pub fn new(object_id: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            this_object: None,
        }
    }

    pub fn with_this(mut self, this_object: Option<RemoteObject>) -> Self {
        self.this_object = this_object;
        self
    }
}

/// Monotonic handle arena
#[derive(Debug)]
pub struct HandleTable {
    next: i64,
    entries: HashMap<i64, ObjectHandle>,
}

impl Default for HandleTable {
    fn default() -> Self {
        Self {
            next: FIRST_HANDLE,
            entries: HashMap::new(),
        }
    }
}

impl HandleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh handle for an entry. Ids are never reused.
    pub fn create(&mut self, entry: ObjectHandle) -> i64 {
        let id = self.next;
        self.next += 1;
        self.entries.insert(id, entry);
        id
    }

    pub fn resolve(&self, id: i64) -> Option<&ObjectHandle> {
        self.entries.get(&id)
    }

    /// True for the reserved exception sentinel
    pub fn is_exception_handle(id: i64) -> bool {
        id == EXCEPTION_HANDLE
    }

    /// Drop every entry. Allocation continues past the old ids so handles
    /// issued before the reset stay invalid rather than aliasing new objects.
    pub fn reset(&mut self) {
        debug!("Resetting handle table ({} entries)", self.entries.len());
        self.entries.clear();
    }
}
