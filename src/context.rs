//! Execution-context capability flag.
//!
//! SYSTEM CONTEXT
//! ==============
//! The same core runs in an interactive client (browser after hydration, the
//! CLI) and during server-side prerendering. Components that touch durable
//! storage or navigation state take this flag at construction instead of
//! probing globals, so both paths are testable on any target.

/// Where the core is currently executing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionContext {
    /// Durable storage and navigation state are available.
    Interactive,
    /// Server-side rendering or prerendering: no storage, no window.
    Prerender,
}

impl ExecutionContext {
    /// Whether the persistent token slot may be read or written.
    #[must_use]
    pub fn has_durable_storage(self) -> bool {
        matches!(self, Self::Interactive)
    }

    /// Whether the current navigation path can be observed.
    #[must_use]
    pub fn can_observe_navigation(self) -> bool {
        matches!(self, Self::Interactive)
    }
}
