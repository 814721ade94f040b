//! Fakes shared by the command tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use client_query::{BatchResults, BatchRunner, ClientContext, ClientQueryRequest, Error};

/// Answers batches whose XML matches a registered request and rejects everything else.
pub struct FixtureRunner {
    fixtures: HashMap<String, String>,
    sent: Mutex<Vec<String>>,
}

impl FixtureRunner {
    pub fn new() -> Self {
        Self {
            fixtures: HashMap::new(),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Registers `response` as the reply to the request whose body is exactly `request`.
    pub fn with(mut self, request: impl Into<String>, response: impl Into<String>) -> Self {
        self.fixtures.insert(request.into(), response.into());
        self
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl BatchRunner for FixtureRunner {
    async fn run_batch(
        &self,
        context: &ClientContext,
        request: &ClientQueryRequest,
    ) -> Result<BatchResults, Error> {
        let xml = request.to_xml(&context.application_name)?;
        self.sent.lock().unwrap().push(xml.clone());
        match self.fixtures.get(&xml) {
            Some(body) => request.decode_response(body),
            None => Err(Error::TransportError("Invalid request".to_string())),
        }
    }
}

/// Opening tag of every request sent with the application name `spo-batch`.
pub const REQUEST_HEADER: &str = "<Request AddExpandoFieldTypeSuffix=\"true\" SchemaVersion=\"15.0.0.0\" LibraryVersion=\"16.0.0.0\" ApplicationName=\"spo-batch\" xmlns=\"http://schemas.microsoft.com/sharepoint/clientquery/2009\">";
