//! Synchronous API client core for the DNS views service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip.
//!
//! # Design
//! - `DnsViewClient` is stateless; it holds only `base_url`.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - `uri::normalize_uri` is public: the mock registry keys its entries with
//!   it, so registered URIs and client-built URIs agree byte for byte.

pub mod client;
pub mod error;
pub mod http;
pub mod types;
pub mod uri;

pub use client::{DnsViewClient, DEFAULT_ENDPOINT};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Param, UnsupportedMethod};
pub use types::{DnsView, Preferences};
pub use uri::{normalize_uri, UriError, API_PREFIX};
