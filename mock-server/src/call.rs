//! Mock call registration builder and the stored entry.
//!
//! Conversion failures from `request_json`/`response_json` are held until
//! `Registry::register`, which reports them as `MockError::Conversion`.

use std::collections::BTreeMap;

use dnsview_core::{normalize_uri, HttpMethod, Param};
use serde::Serialize;

use crate::body::{Body, MockBody};
use crate::error::{BodyPart, MockError};

/// Header name (lowercase) to values, in order.
pub type Headers = BTreeMap<String, Vec<String>>;

/// Build a `Headers` map from pairs. Repeated names accumulate values.
pub fn header_map<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Headers
where
    K: AsRef<str>,
    V: Into<String>,
{
    let mut headers = Headers::new();
    for (name, value) in pairs {
        headers
            .entry(name.as_ref().to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }
    headers
}

fn lowercase_names(headers: Headers) -> Headers {
    let mut lowered = Headers::new();
    for (name, values) in headers {
        lowered
            .entry(name.to_ascii_lowercase())
            .or_default()
            .extend(values);
    }
    lowered
}

/// An expected call and its canned response, ready to register.
///
/// ```
/// use dnsview_core::HttpMethod;
/// use dnsview_mock::{MockCall, Registry};
///
/// let registry = Registry::new();
/// registry
///     .register(
///         MockCall::new(HttpMethod::Get, "views/internal")
///             .response_json(&serde_json::json!({"name": "internal"})),
///     )
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct MockCall {
    method: HttpMethod,
    uri: String,
    params: Vec<Param>,
    status: u16,
    request_headers: Headers,
    response_headers: Headers,
    request_body: Result<MockBody, String>,
    response_body: Result<MockBody, String>,
}

impl MockCall {
    /// A call answering `200` with an empty body.
    pub fn new(method: HttpMethod, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            params: Vec::new(),
            status: 200,
            request_headers: Headers::new(),
            response_headers: Headers::new(),
            request_body: Ok(MockBody::empty()),
            response_body: Ok(MockBody::empty()),
        }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Append a query parameter. Parameters keep the order they are added in.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(Param::new(key, value));
        self
    }

    pub fn params(mut self, params: impl IntoIterator<Item = Param>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn request_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.request_headers
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.into());
        self
    }

    /// Replace the expected request headers.
    pub fn request_headers(mut self, headers: Headers) -> Self {
        self.request_headers = lowercase_names(headers);
        self
    }

    pub fn response_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.response_headers
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.into());
        self
    }

    pub fn response_headers(mut self, headers: Headers) -> Self {
        self.response_headers = lowercase_names(headers);
        self
    }

    pub fn request_body(mut self, body: impl Into<MockBody>) -> Self {
        self.request_body = Ok(body.into());
        self
    }

    pub fn request_json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.request_body = MockBody::json(value).map_err(|e| e.to_string());
        self
    }

    pub fn response_body(mut self, body: impl Into<MockBody>) -> Self {
        self.response_body = Ok(body.into());
        self
    }

    pub fn response_json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.response_body = MockBody::json(value).map_err(|e| e.to_string());
        self
    }

    /// Normalize the URI and resolve both bodies to bytes.
    pub(crate) fn prepare(self) -> Result<(HttpMethod, String, RegisteredCall), MockError> {
        let uri = normalize_uri(&self.uri, &self.params)?;
        let request_body = encode(self.request_body, BodyPart::Request)?;
        let response_body = encode(self.response_body, BodyPart::Response)?;

        let entry = RegisteredCall {
            request_headers: self.request_headers,
            request_body,
            response: MockResponse {
                status: self.status,
                headers: self.response_headers,
                body: response_body,
            },
        };
        Ok((self.method, uri, entry))
    }
}

fn encode(body: Result<MockBody, String>, part: BodyPart) -> Result<Body, MockError> {
    body.and_then(|body| body.encode().map_err(|e| e.to_string()))
        .map_err(|reason| MockError::Conversion { part, reason })
}

/// The canned answer of a registered call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Body,
}

/// A call as stored in its registry bucket.
#[derive(Debug, Clone)]
pub struct RegisteredCall {
    request_headers: Headers,
    request_body: Body,
    response: MockResponse,
}

impl RegisteredCall {
    pub fn status(&self) -> u16 {
        self.response.status
    }

    pub fn request_headers(&self) -> &Headers {
        &self.request_headers
    }

    pub fn request_body(&self) -> &Body {
        &self.request_body
    }

    pub fn response(&self) -> &MockResponse {
        &self.response
    }

    /// Same expected request. Response fields are not compared.
    pub(crate) fn same_request(&self, other: &RegisteredCall) -> bool {
        self.request_headers == other.request_headers
            && self.request_body.bytes() == other.request_body.bytes()
    }

    /// Every expected header is present with exactly the expected values,
    /// and the body matches per its kind.
    pub(crate) fn accepts(&self, headers: &Headers, body: &[u8]) -> bool {
        self.request_body.matches(body)
            && self
                .request_headers
                .iter()
                .all(|(name, values)| headers.get(name) == Some(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn prepared(call: MockCall) -> RegisteredCall {
        call.prepare().unwrap().2
    }

    #[test]
    fn defaults_to_ok_with_empty_bodies() {
        let (method, uri, entry) = MockCall::new(HttpMethod::Get, "views").prepare().unwrap();
        assert_eq!(method, HttpMethod::Get);
        assert_eq!(uri, "/v1/views");
        assert_eq!(entry.status(), 200);
        assert!(entry.request_body().bytes().is_empty());
        assert!(entry.response().body.bytes().is_empty());
    }

    #[test]
    fn header_names_are_lowercased() {
        let entry = prepared(
            MockCall::new(HttpMethod::Get, "views")
                .request_header("X-NSONE-Key", "abc")
                .response_headers(header_map([("Content-Type", "text/plain")])),
        );
        assert_eq!(entry.request_headers(), &header_map([("x-nsone-key", "abc")]));
        assert!(entry.response().headers.contains_key("content-type"));
    }

    #[test]
    fn header_map_accumulates_repeated_names() {
        let headers = header_map([("Accept", "a"), ("accept", "b")]);
        assert_eq!(headers["accept"], vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn conversion_failure_is_deferred_to_prepare() {
        let mut bad = BTreeMap::new();
        bad.insert((1, 2), "v");
        let err = MockCall::new(HttpMethod::Post, "views")
            .response_json(&bad)
            .prepare()
            .unwrap_err();
        assert!(matches!(
            err,
            MockError::Conversion {
                part: BodyPart::Response,
                ..
            }
        ));
    }

    #[test]
    fn malformed_uri_fails_prepare() {
        let err = MockCall::new(HttpMethod::Get, "views/%zz").prepare().unwrap_err();
        assert!(matches!(err, MockError::MalformedUri(_)));
    }

    #[rstest]
    #[case(&[], &[], true)]
    #[case(&[], &[("user-agent", "ureq")], true)]
    #[case(&[("x-key", "abc")], &[("x-key", "abc"), ("host", "localhost")], true)]
    #[case(&[("x-key", "abc")], &[("x-key", "other")], false)]
    #[case(&[("x-key", "abc")], &[], false)]
    #[case(&[("accept", "a")], &[("accept", "a"), ("accept", "b")], false)]
    fn test_accepts_headers(
        #[case] expected: &[(&str, &str)],
        #[case] incoming: &[(&str, &str)],
        #[case] accepted: bool,
    ) {
        let entry = prepared(
            MockCall::new(HttpMethod::Get, "views")
                .request_headers(header_map(expected.iter().copied())),
        );
        let incoming = header_map(incoming.iter().copied());
        assert_eq!(entry.accepts(&incoming, b""), accepted);
    }

    #[test]
    fn accepts_compares_body_bytes() {
        let entry = prepared(MockCall::new(HttpMethod::Post, "views").request_body("abc"));
        assert!(entry.accepts(&Headers::new(), b"abc"));
        assert!(!entry.accepts(&Headers::new(), b"abc\n"));
        assert!(!entry.accepts(&Headers::new(), b""));
    }

    #[test]
    fn accepts_reformatted_json_for_structured_body() {
        let entry = prepared(
            MockCall::new(HttpMethod::Post, "config/views/preference")
                .request_json(&serde_json::json!({"internal": 1})),
        );
        assert!(entry.accepts(&Headers::new(), b"{\"internal\": 1}\n"));
        assert!(!entry.accepts(&Headers::new(), b"{\"internal\": 2}"));
        assert!(!entry.accepts(&Headers::new(), b"internal=1"));
    }

    #[test]
    fn same_request_ignores_response() {
        let a = prepared(MockCall::new(HttpMethod::Get, "views").response_body("one"));
        let b = prepared(
            MockCall::new(HttpMethod::Get, "views")
                .status(500)
                .response_body("two"),
        );
        assert!(a.same_request(&b));
    }
}
