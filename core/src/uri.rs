//! Request URI normalization shared by the client and the mock registry.
//!
//! Every request URI is rooted under the `/v1/` API prefix, resolved against
//! the server root, extended with the caller's query parameters in the order
//! given, and finally stripped of doubled separators. The client uses this to
//! build request URLs and the mock uses it to key its registry, so a request
//! built by one always lands on the bucket registered through the other.

use std::borrow::Cow;

use url::Url;

use crate::http::Param;

/// Version prefix every API path lives under.
pub const API_PREFIX: &str = "/v1/";

const ROOT: &str = "http://localhost/";

/// The URI could not be parsed or resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UriError {
    #[error("invalid character {found:?} in uri {uri:?}")]
    InvalidCharacter { uri: String, found: char },

    #[error("invalid percent-escape in uri {uri:?}")]
    InvalidEscape { uri: String },

    #[error("could not resolve uri {uri:?}: {reason}")]
    Unresolvable { uri: String, reason: String },
}

/// Normalize `uri` and append `params` as a query string.
///
/// `"views/x"` and `"/v1/views/x"` normalize to the same value; parameters
/// keep their order, so `[a, b]` and `[b, a]` produce different URIs.
/// Parameter keys and values may contain spaces and other characters that
/// are not legal in a query; they are percent-encoded the same way an
/// incoming request line would carry them, so the result normalizes to
/// itself.
pub fn normalize_uri(uri: &str, params: &[Param]) -> Result<String, UriError> {
    validate(uri, false)?;
    for param in params {
        validate(&param.key, true)?;
        validate(&param.value, true)?;
    }

    let prefixed = if uri.starts_with(API_PREFIX) {
        Cow::Borrowed(uri)
    } else {
        Cow::Owned(format!("{API_PREFIX}{uri}"))
    };

    let unresolvable = |reason: url::ParseError| UriError::Unresolvable {
        uri: uri.to_string(),
        reason: reason.to_string(),
    };
    let root = Url::parse(ROOT).map_err(unresolvable)?;
    let mut resolved = root.join(&prefixed).map_err(unresolvable)?;

    if !params.is_empty() {
        let appended = params
            .iter()
            .map(|param| format!("{}={}", param.key, param.value))
            .collect::<Vec<_>>()
            .join("&");
        let query = match resolved.query() {
            Some(existing) => format!("{existing}&{appended}"),
            None => appended,
        };
        resolved.set_query(Some(&query));
    }

    let mut normalized = resolved.path().to_string();
    if let Some(query) = resolved.query() {
        normalized.push('?');
        normalized.push_str(query);
    }

    Ok(collapse_separators(normalized))
}

/// Reject control characters and broken `%` escapes. Plain spaces are
/// allowed only in query parameters, where they get encoded.
fn validate(uri: &str, allow_space: bool) -> Result<(), UriError> {
    let rejected = |c: &char| c.is_control() || (c.is_whitespace() && !(allow_space && *c == ' '));
    if let Some(found) = uri.chars().find(rejected) {
        return Err(UriError::InvalidCharacter {
            uri: uri.to_string(),
            found,
        });
    }

    let bytes = uri.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b != b'%' {
            continue;
        }
        let escaped = bytes.get(i + 1..i + 3);
        if !matches!(escaped, Some(hex) if hex.iter().all(u8::is_ascii_hexdigit)) {
            return Err(UriError::InvalidEscape {
                uri: uri.to_string(),
            });
        }
    }

    Ok(())
}

fn collapse_separators(mut uri: String) -> String {
    while uri.contains("//") {
        uri = uri.replace("//", "/");
    }
    uri
}
