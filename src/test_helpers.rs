//! Shared fixtures for unit tests: scripted transport and instrumented storage.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::context::ExecutionContext;
use crate::net::gateway::RequestGateway;
use crate::net::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};
use crate::storage::token_store::PersistentTokenStore;
use crate::storage::{KeyValueStorage, MemoryStorage, StorageError};

pub const TEST_BASE_URL: &str = "http://api.test";

// =========================================================================
// MockTransport
// =========================================================================

/// Transport that replays scripted responses in order and records requests.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_json(&self, status: u16, body: serde_json::Value) {
        self.push_text(status, &body.to_string());
    }

    pub fn push_text(&self, status: u16, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse { status, body: body.to_owned() }));
    }

    pub fn push_transport_error(&self) {
        self.responses.lock().unwrap().push_back(Err(TransportError::Request {
            url: TEST_BASE_URL.to_owned(),
            message: "connection refused".to_owned(),
        }));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests.lock().unwrap().last().cloned().expect("no request was sent")
    }
}

#[async_trait::async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.clone();
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request { url, message: "no scripted response".to_owned() }))
    }
}

// =========================================================================
// Instrumented storage
// =========================================================================

/// Memory storage that counts backend calls and can be switched to failing.
#[derive(Default)]
pub struct ProbeStorage {
    inner: MemoryStorage,
    calls: AtomicUsize,
    failing: bool,
}

impl ProbeStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { failing: true, ..Self::default() })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(StorageError::Unavailable("quota exceeded".to_owned()));
        }
        Ok(())
    }
}

impl KeyValueStorage for ProbeStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.inner.remove_item(key)
    }
}

// =========================================================================
// Wiring
// =========================================================================

pub fn interactive_tokens() -> PersistentTokenStore {
    PersistentTokenStore::new(ExecutionContext::Interactive, Arc::new(MemoryStorage::new()))
}

pub fn test_gateway(transport: Arc<MockTransport>, tokens: PersistentTokenStore) -> RequestGateway {
    RequestGateway::new(TEST_BASE_URL, transport, tokens)
}

pub fn profile_json(id: i64, email: &str) -> serde_json::Value {
    serde_json::json!({ "id": id, "email": email })
}
