//! Literal and structured mock bodies.
//!
//! Bodies are resolved to bytes once, at registration. The tag survives so
//! the listener can label structured responses as JSON.

use serde::Serialize;
use serde_json::Value;

/// A body as supplied by the caller.
///
/// `Bytes` and `Text` are stored verbatim. `Json` is marshaled with
/// `serde_json`, which is what the client uses for its own request bodies,
/// so a structured expectation built from the same value matches byte for
/// byte.
#[derive(Debug, Clone, PartialEq)]
pub enum MockBody {
    Bytes(Vec<u8>),
    Text(String),
    Json(Value),
}

impl MockBody {
    pub fn empty() -> Self {
        MockBody::Bytes(Vec::new())
    }

    /// Capture any serializable value as a structured body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(MockBody::Json)
    }

    pub(crate) fn encode(self) -> Result<Body, serde_json::Error> {
        let body = match self {
            MockBody::Bytes(bytes) => Body::literal(bytes),
            MockBody::Text(text) => Body::literal(text.into_bytes()),
            MockBody::Json(value) => Body {
                bytes: serde_json::to_vec(&value)?,
                kind: BodyKind::Structured,
            },
        };
        Ok(body)
    }
}

impl Default for MockBody {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<u8>> for MockBody {
    fn from(bytes: Vec<u8>) -> Self {
        MockBody::Bytes(bytes)
    }
}

impl From<&[u8]> for MockBody {
    fn from(bytes: &[u8]) -> Self {
        MockBody::Bytes(bytes.to_vec())
    }
}

impl From<String> for MockBody {
    fn from(text: String) -> Self {
        MockBody::Text(text)
    }
}

impl From<&str> for MockBody {
    fn from(text: &str) -> Self {
        MockBody::Text(text.to_string())
    }
}

impl From<Value> for MockBody {
    fn from(value: Value) -> Self {
        MockBody::Json(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Supplied as bytes or text.
    Literal,
    /// Marshaled from a structured value.
    Structured,
}

/// A body resolved to bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    bytes: Vec<u8>,
    kind: BodyKind,
}

impl Body {
    pub fn literal(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            kind: BodyKind::Literal,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Compare against an incoming body. Structured bodies compare after the
    /// incoming bytes are marshaled the same way; input that is not JSON
    /// never matches a structured body.
    pub fn matches(&self, incoming: &[u8]) -> bool {
        match self.kind {
            BodyKind::Literal => self.bytes == incoming,
            BodyKind::Structured => serde_json::from_slice::<Value>(incoming)
                .and_then(|value| serde_json::to_vec(&value))
                .is_ok_and(|remarshaled| remarshaled == self.bytes),
        }
    }
}
