use crate::{
    data::{Kind, Response, TestCase},
    error::Error,
    http_client::{HyperHttpTransport, Transport},
};
use async_trait::async_trait;
use std::{collections::HashMap, fmt::Debug, sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Replays a captured test case against the system under test.
#[async_trait]
pub trait RequestEmulator: Debug {
    async fn simulate_request(
        &self,
        cancel: &CancellationToken,
        timeout_secs: u64,
        test_case: &TestCase,
        test_set_id: &str,
    ) -> Result<Response, Error>;
}

/// Dispatches each test case to the transport registered for its kind.
#[derive(Debug, Clone)]
pub struct Emulator {
    api_timeout: u64,
    transports: HashMap<Kind, Arc<dyn Transport + Send + Sync>>,
}

impl Emulator {
    /// An emulator with the http transport registered.
    pub fn new(api_timeout: u64) -> Self {
        let mut emulator = Self::without_transports(api_timeout);
        emulator.register(Arc::new(HyperHttpTransport::new()));
        emulator
    }

    pub fn without_transports(api_timeout: u64) -> Self {
        Self {
            api_timeout,
            transports: HashMap::new(),
        }
    }

    /// Registers `transport` for its kind, replacing any previous one.
    pub fn register(&mut self, transport: Arc<dyn Transport + Send + Sync>) {
        self.transports.insert(transport.kind(), transport);
    }

    pub fn supports(&self, kind: Kind) -> bool {
        self.transports.contains_key(&kind)
    }

    pub fn api_timeout(&self) -> u64 {
        self.api_timeout
    }
}

#[async_trait]
impl RequestEmulator for Emulator {
    async fn simulate_request(
        &self,
        cancel: &CancellationToken,
        timeout_secs: u64,
        test_case: &TestCase,
        test_set_id: &str,
    ) -> Result<Response, Error> {
        let transport = self
            .transports
            .get(&test_case.kind)
            .ok_or(Error::UnsupportedProtocol(test_case.kind))?;

        let timeout_secs = if timeout_secs == 0 {
            self.api_timeout
        } else {
            timeout_secs
        };

        debug!(
            test_case = %test_case.name,
            kind = %test_case.kind,
            test_set_id,
            "Before simulating the request"
        );

        let timeout = Duration::from_secs(timeout_secs);
        let response = tokio::select! {
            _ = cancel.cancelled() => Err(Error::Cancelled),
            response = transport.send(test_case, test_set_id, timeout) => response,
        };

        debug!(
            test_case = %test_case.name,
            ok = response.is_ok(),
            "After simulating the request"
        );

        response
    }
}
