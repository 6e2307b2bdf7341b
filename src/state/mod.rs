//! Client-side state.
//!
//! DESIGN
//! ======
//! `subject` is the replay-latest broadcast cell; `session` builds the
//! authenticated-user stream and login/logout orchestration on top of it.

pub mod session;
pub mod subject;
