//! Navigation helpers shared by views.
//!
//! SYSTEM CONTEXT
//! ==============
//! Views apply identical unauthenticated-redirect behavior through `auth`.

pub mod auth;
