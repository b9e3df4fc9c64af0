use std::time::Duration;

use pipecall_frame::{MessageConfig, MessageReader, MessageWriter};
use pipecall_transport::{NativeTransport, Transport};
use serde_json::Value;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::connector::Connector;
use crate::error::Result;
use crate::request::Request;

/// Performs one request/response exchange per call.
///
/// Every call opens a fresh channel, writes the serialized request, reads
/// one complete response, and closes the channel on all exit paths.
/// Channels are never reused and never shared; concurrent callers each
/// get their own.
pub struct RequestClient<T: Transport = NativeTransport, C: Clock = SystemClock> {
    connector: Connector<T, C>,
    config: MessageConfig,
}

impl RequestClient {
    /// A client over the platform's native transport.
    pub fn new() -> Self {
        Self::with_connector(Connector::new(NativeTransport::default()))
    }
}

impl Default for RequestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport, C: Clock> RequestClient<T, C> {
    /// A client over an explicit connector (custom transport or clock).
    pub fn with_connector(connector: Connector<T, C>) -> Self {
        Self {
            connector,
            config: MessageConfig::default(),
        }
    }

    /// Override message limits for this client.
    pub fn with_config(mut self, config: MessageConfig) -> Self {
        self.config = config;
        self
    }

    /// Send `request` to `endpoint` and return the parsed JSON response.
    ///
    /// Waits up to `timeout` for the endpoint to become connectable; once
    /// connected, reads and writes block without a mid-transfer deadline.
    pub fn send(&self, endpoint: &str, timeout: Duration, request: &Request) -> Result<Value> {
        let mut channel = self.connector.connect(endpoint, timeout)?;
        // `channel` drops on every path out of this function, closing
        // the connection exactly once.

        let wire = request.to_wire()?;
        debug!(
            endpoint,
            method = request.method(),
            path = request.path(),
            "sending request"
        );
        MessageWriter::with_config(&mut channel, self.config.clone()).write_message(&wire)?;

        let raw = MessageReader::with_config(&mut channel, self.config.clone()).read_message()?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// One-shot exchange over the platform's native transport.
pub fn send_request(endpoint: &str, timeout: Duration, request: &Request) -> Result<Value> {
    RequestClient::new().send(endpoint, timeout, request)
}
