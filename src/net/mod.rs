//! Networking modules for the notes REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` is the HTTP seam, `gateway` resolves, authenticates and
//! normalizes every request, `notes` is the resource client built on it, and
//! `types` defines the wire schema.

pub mod gateway;
pub mod notes;
pub mod transport;
pub mod types;
