//! Mock calls loaded from a JSON fixture file.
//!
//! A JSON string body is literal text, `null` (or an absent field) is the
//! empty body, and any other value is a structured body.

use std::path::{Path, PathBuf};

use dnsview_core::{HttpMethod, Param};
use serde::Deserialize;
use serde_json::Value;

use crate::body::MockBody;
use crate::call::{Headers, MockCall};
use crate::error::MockError;
use crate::registry::Registry;

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("failed to read fixture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid fixture: {0}")]
    Json(#[from] serde_json::Error),

    #[error("fixture call #{index} rejected: {source}")]
    Register {
        index: usize,
        #[source]
        source: MockError,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub calls: Vec<FixtureCall>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureCall {
    pub method: HttpMethod,
    pub uri: String,
    #[serde(default = "default_status")]
    pub status: u16,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub request_headers: Headers,
    #[serde(default)]
    pub response_headers: Headers,
    #[serde(default)]
    pub request_body: Value,
    #[serde(default)]
    pub response_body: Value,
}

fn default_status() -> u16 {
    200
}

fn body_from_json(value: Value) -> MockBody {
    match value {
        Value::Null => MockBody::empty(),
        Value::String(text) => MockBody::Text(text),
        other => MockBody::Json(other),
    }
}

impl From<FixtureCall> for MockCall {
    fn from(call: FixtureCall) -> Self {
        MockCall::new(call.method, call.uri)
            .status(call.status)
            .params(call.params)
            .request_headers(call.request_headers)
            .response_headers(call.response_headers)
            .request_body(body_from_json(call.request_body))
            .response_body(body_from_json(call.response_body))
    }
}

impl Fixture {
    pub fn from_json(raw: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let raw = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Register every call in file order. A rejected call leaves the
    /// registry as it was before loading.
    pub fn register_into(self, registry: &Registry) -> Result<usize, FixtureError> {
        registry
            .register_all(self.calls.into_iter().map(MockCall::from))
            .map_err(|(index, source)| FixtureError::Register { index, source })
    }
}
