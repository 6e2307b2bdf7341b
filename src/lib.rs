//! # notes-client
//!
//! Session and request-gateway core for the personal notes client.
//!
//! This crate owns everything between the UI and the notes REST API: the
//! persisted bearer token, the authenticated request gateway with its single
//! error-normalization path, the observable session, the route guard, and the
//! notes resource client. UI layers (the `notes-cli` binary today) build one
//! [`NotesClientServices`] at startup and hand its parts to consumers.

pub mod config;
pub mod context;
pub mod error;
pub mod net;
pub mod services;
pub mod state;
pub mod storage;
pub mod util;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::{BuildProfile, ClientConfig};
pub use context::ExecutionContext;
pub use error::{GatewayFailure, NormalizedError};
pub use net::gateway::RequestGateway;
pub use net::notes::NotesClient;
pub use services::NotesClientServices;
pub use state::session::SessionState;
pub use storage::token_store::PersistentTokenStore;
pub use util::auth::{GuardDecision, RouteGuard};
