//! The single persisted bearer-token slot.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here returns an error. Outside the interactive context reads are
//! absent and writes are skipped without touching the backend; backend
//! failures are logged and degrade to "absent".

#[cfg(test)]
#[path = "token_store_test.rs"]
mod token_store_test;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::KeyValueStorage;
use crate::context::ExecutionContext;

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "notes_jwt";

/// Cheap-to-clone handle to the token slot; clones share one backend.
#[derive(Clone)]
pub struct PersistentTokenStore {
    context: ExecutionContext,
    backend: Arc<dyn KeyValueStorage>,
}

impl PersistentTokenStore {
    #[must_use]
    pub fn new(context: ExecutionContext, backend: Arc<dyn KeyValueStorage>) -> Self {
        Self { context, backend }
    }

    #[must_use]
    pub fn context(&self) -> ExecutionContext {
        self.context
    }

    /// Current token, or `None` when absent, empty, or unreadable.
    #[must_use]
    pub fn read(&self) -> Option<String> {
        if !self.context.has_durable_storage() {
            return None;
        }
        match self.backend.get_item(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "token read failed; treating as absent");
                None
            }
        }
    }

    /// Replace the stored token. Empty tokens are ignored.
    pub fn write(&self, token: &str) {
        if !self.context.has_durable_storage() {
            return;
        }
        if token.is_empty() {
            debug!("ignoring empty token write");
            return;
        }
        if let Err(e) = self.backend.set_item(TOKEN_KEY, token) {
            warn!(error = %e, "token write failed");
        }
    }

    pub fn clear(&self) {
        if !self.context.has_durable_storage() {
            return;
        }
        if let Err(e) = self.backend.remove_item(TOKEN_KEY) {
            warn!(error = %e, "token clear failed");
        }
    }
}

impl fmt::Debug for PersistentTokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentTokenStore")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
