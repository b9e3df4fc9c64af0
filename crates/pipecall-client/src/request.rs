use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;

/// One request to exchange over a channel. Immutable once built.
#[derive(Debug, Clone)]
pub struct Request {
    method: String,
    path: String,
    params: Option<Map<String, Value>>,
    body: Option<Map<String, Value>>,
}

impl Request {
    /// Create a request with no parameters or body.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            params: None,
            body: None,
        }
    }

    /// Attach query-style parameters.
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = Some(params);
        self
    }

    /// Attach a JSON body.
    pub fn with_body(mut self, body: Map<String, Value>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Serialize to the wire envelope.
    ///
    /// `body` and `params` are each re-encoded to their own JSON string,
    /// so the envelope stays flat and self-describing no matter what
    /// shape the payloads take.
    pub(crate) fn to_wire(&self) -> Result<String> {
        let envelope = Envelope {
            method: &self.method,
            path: &self.path,
            body: self.body.as_ref().map(serde_json::to_string).transpose()?,
            params: self.params.as_ref().map(serde_json::to_string).transpose()?,
        };
        Ok(serde_json::to_string(&envelope)?)
    }
}

/// The flat wire form of a request. Absent payloads are omitted, not null.
#[derive(Debug, Serialize)]
struct Envelope<'a> {
    method: &'a str,
    path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<String>,
}
