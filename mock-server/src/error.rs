//! Errors raised while registering or matching mock calls.

use dnsview_core::{HttpMethod, UriError};

/// Which half of a mock call a body belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPart {
    Request,
    Response,
}

impl std::fmt::Display for BodyPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BodyPart::Request => f.write_str("request"),
            BodyPart::Response => f.write_str("response"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MockError {
    /// The URI could not be parsed or resolved. Nothing was registered.
    #[error("could not parse mock call uri: {0}")]
    MalformedUri(#[from] UriError),

    /// An entry with the same request headers and body already exists for
    /// this method and URI. Nothing was registered.
    #[error("mock call already registered: {method} {uri}")]
    Duplicate { method: HttpMethod, uri: String },

    /// A structured body could not be marshaled to JSON.
    #[error("unable to convert {part} body to bytes: {reason}")]
    Conversion { part: BodyPart, reason: String },

    /// No registered entry answers the incoming call.
    #[error("no mock call registered for {method} {uri}")]
    NoMatch { method: HttpMethod, uri: String },
}
