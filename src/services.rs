//! Process-wide service wiring.
//!
//! DESIGN
//! ======
//! One token store, one gateway, one session, one guard and one notes client
//! are built together at startup and handed out by clone. Every handle is an
//! `Arc` wrapper, so all consumers share the same token slot and session.

#[cfg(test)]
#[path = "services_test.rs"]
mod services_test;

use std::sync::Arc;

use tracing::info;

use crate::config::ClientConfig;
use crate::context::ExecutionContext;
use crate::net::gateway::RequestGateway;
use crate::net::notes::NotesClient;
use crate::net::transport::{HttpTransport, ReqwestTransport};
use crate::state::session::{Reconciliation, SessionState};
use crate::storage::token_store::PersistentTokenStore;
use crate::storage::{KeyValueStorage, MemoryStorage};
use crate::util::auth::RouteGuard;

#[derive(Clone, Debug)]
pub struct NotesClientServices {
    pub context: ExecutionContext,
    pub tokens: PersistentTokenStore,
    pub gateway: RequestGateway,
    pub session: SessionState,
    pub guard: RouteGuard,
    pub notes: NotesClient,
}

impl NotesClientServices {
    #[must_use]
    pub fn new(
        config: &ClientConfig,
        context: ExecutionContext,
        storage: Arc<dyn KeyValueStorage>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let tokens = PersistentTokenStore::new(context, storage);
        let gateway = RequestGateway::new(config.api_base_url.clone(), transport, tokens.clone());
        let session = SessionState::new(gateway.clone(), tokens.clone());
        let guard = RouteGuard::new(context, Arc::new(session.clone()));
        let notes = NotesClient::new(gateway.clone());
        Self { context, tokens, gateway, session, guard, notes }
    }

    /// Interactive services over `storage` using the `reqwest` transport.
    #[must_use]
    pub fn interactive(config: &ClientConfig, storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::new(config, ExecutionContext::Interactive, storage, Arc::new(ReqwestTransport::new()))
    }

    /// Services for server-side rendering: storage is never consulted.
    #[must_use]
    pub fn prerender(config: &ClientConfig) -> Self {
        Self::new(
            config,
            ExecutionContext::Prerender,
            Arc::new(MemoryStorage::new()),
            Arc::new(ReqwestTransport::new()),
        )
    }

    /// Browser services backed by `localStorage`.
    #[cfg(feature = "hydrate")]
    #[must_use]
    pub fn browser(config: &ClientConfig) -> Self {
        Self::interactive(config, Arc::new(crate::storage::browser::LocalStorage::new()))
    }

    /// Startup hook: validate any stored token once.
    pub async fn start(&self) -> Reconciliation {
        let outcome = self.session.reconcile().await;
        info!(?outcome, base_url = self.gateway.base_url(), "notes client started");
        outcome
    }
}
