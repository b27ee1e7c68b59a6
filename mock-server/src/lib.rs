//! In-process mock of the DNS views API.
//!
//! # Overview
//! Register expected calls with canned responses, then point a
//! `dnsview_core::DnsViewClient` at a `MockServer` and drive it with any
//! HTTP client. Each incoming call is answered by the first registered call
//! with the same method and normalized URI whose expected headers and body
//! it satisfies; anything else gets a 501 with a JSON diagnostic.
//!
//! # Design
//! - `Registry` is an owned value behind a lock; there is no global state,
//!   so parallel tests each start their own `MockServer`.
//! - URIs are keyed with `dnsview_core::normalize_uri`, the same function
//!   the client builds request URLs with.
//! - Bodies are resolved to bytes once, at registration (`MockBody`).

pub mod body;
pub mod call;
pub mod error;
pub mod fixture;
pub mod registry;
pub mod server;

pub use body::{Body, BodyKind, MockBody};
pub use call::{header_map, Headers, MockCall, MockResponse, RegisteredCall};
pub use error::{BodyPart, MockError};
pub use fixture::{Fixture, FixtureError};
pub use registry::Registry;
pub use server::{app, run, MockServer, SharedRegistry};
