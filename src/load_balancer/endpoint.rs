//! Endpoint abstraction.

use std::fmt;
use std::sync::Arc;

use crate::blockchain::LedgerRpc;

/// One configured upstream and the client bound to it.
#[derive(Clone)]
pub struct Endpoint {
    pub url: String,
    pub client: Arc<dyn LedgerRpc>,
}

impl Endpoint {
    /// Wrap a client; the URL is taken from the client itself.
    pub fn new(client: Arc<dyn LedgerRpc>) -> Self {
        Self {
            url: client.endpoint().to_string(),
            client,
        }
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint").field("url", &self.url).finish()
    }
}
