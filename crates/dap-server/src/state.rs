use std::sync::Arc;
use std::time::Duration;

use dap_store::{RequestContext, Router};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    storage: Arc<Router>,
    request_timeout: Duration,
}

impl AppState {
    pub fn new(storage: Arc<Router>, request_timeout: Duration) -> Self {
        Self {
            storage,
            request_timeout,
        }
    }

    pub fn storage(&self) -> &Router {
        &self.storage
    }

    /// Fresh context for one request, expiring after the request timeout.
    pub fn request_context(&self) -> RequestContext {
        RequestContext::with_timeout(self.request_timeout)
    }
}
