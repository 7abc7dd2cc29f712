use async_trait::async_trait;
use relay_dns_application::UpstreamResolver;
use relay_dns_domain::{RelayError, RelayQuery};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Resolver that always answers with the given bytes and counts its calls.
pub struct FixedResolver {
    pub name: &'static str,
    pub response: Vec<u8>,
    pub calls: AtomicUsize,
}

impl FixedResolver {
    pub fn new(name: &'static str, response: Vec<u8>) -> Self {
        Self {
            name,
            response,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamResolver for FixedResolver {
    async fn resolve(&self, _query: &RelayQuery) -> Result<Vec<u8>, RelayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }

    fn protocol_name(&self) -> &'static str {
        self.name
    }
}

/// Resolver that always fails with the given error and counts its calls.
pub struct FailingResolver {
    pub name: &'static str,
    pub error: RelayError,
    pub calls: AtomicUsize,
}

impl FailingResolver {
    pub fn new(name: &'static str, error: RelayError) -> Self {
        Self {
            name,
            error,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamResolver for FailingResolver {
    async fn resolve(&self, _query: &RelayQuery) -> Result<Vec<u8>, RelayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }

    fn protocol_name(&self) -> &'static str {
        self.name
    }
}
