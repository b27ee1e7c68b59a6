//! Fake network listener backed by a `Registry`.
//!
//! Every request falls through to one handler that asks the registry for a
//! match and writes the canned response back verbatim.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use axum::{
    body::{Body as HttpBody, Bytes},
    extract::State,
    http::{
        header::CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    Json, Router,
};
use dnsview_core::HttpMethod;
use serde_json::json;
use tokio::{net::TcpListener, sync::oneshot};
use tracing::warn;

use crate::body::BodyKind;
use crate::call::{Headers, MockCall, MockResponse};
use crate::error::MockError;
use crate::registry::Registry;

pub type SharedRegistry = Arc<Registry>;

pub fn app(registry: SharedRegistry) -> Router {
    Router::new().fallback(answer).with_state(registry)
}

pub async fn run(listener: TcpListener, registry: SharedRegistry) -> Result<(), io::Error> {
    axum::serve(listener, app(registry)).await
}

async fn answer(
    State(registry): State<SharedRegistry>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Ok(method) = method.as_str().parse::<HttpMethod>() else {
        return diagnostic(
            StatusCode::METHOD_NOT_ALLOWED,
            format!("unsupported method {method}"),
        );
    };
    let target = uri
        .path_and_query()
        .map_or_else(|| uri.path(), |pq| pq.as_str());

    match registry.find(method, target, &incoming_headers(&headers), &body) {
        Ok(found) => respond(found),
        Err(err @ MockError::MalformedUri(_)) => diagnostic(StatusCode::BAD_REQUEST, err.to_string()),
        Err(err) => diagnostic(StatusCode::NOT_IMPLEMENTED, err.to_string()),
    }
}

fn incoming_headers(headers: &HeaderMap) -> Headers {
    let mut map = Headers::new();
    for (name, value) in headers {
        match value.to_str() {
            Ok(value) => map
                .entry(name.as_str().to_string())
                .or_default()
                .push(value.to_string()),
            Err(_) => warn!(header = %name, "ignoring non-text request header"),
        }
    }
    map
}

fn respond(found: MockResponse) -> Response {
    let Ok(status) = StatusCode::from_u16(found.status) else {
        return diagnostic(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("registered status {} is not a valid HTTP status", found.status),
        );
    };

    let mut headers = HeaderMap::new();
    for (name, values) in &found.headers {
        let Ok(header) = HeaderName::from_bytes(name.as_bytes()) else {
            warn!(header = %name, "skipping invalid response header name");
            continue;
        };
        for value in values {
            match HeaderValue::from_str(value) {
                Ok(value) => {
                    headers.append(header.clone(), value);
                }
                Err(_) => warn!(header = %name, "skipping invalid response header value"),
            }
        }
    }
    if found.body.kind() == BodyKind::Structured && !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    let mut response = Response::new(HttpBody::from(found.body.into_bytes()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

fn diagnostic(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// An in-process mock server on an ephemeral localhost port.
///
/// The server runs on its own thread and runtime, so it can be driven from
/// plain `#[test]` functions with a blocking client. Dropping it shuts the
/// server down.
pub struct MockServer {
    addr: SocketAddr,
    registry: SharedRegistry,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<io::Result<()>>>,
}

impl MockServer {
    /// Start a server with a fresh, empty registry.
    pub fn start() -> io::Result<Self> {
        Self::with_registry(Arc::new(Registry::new()))
    }

    pub fn with_registry(registry: SharedRegistry) -> io::Result<Self> {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let addr = std_listener.local_addr()?;
        std_listener.set_nonblocking(true)?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let (shutdown, signal) = oneshot::channel::<()>();
        let router = app(Arc::clone(&registry));

        let handle = thread::spawn(move || {
            runtime.block_on(async move {
                let listener = TcpListener::from_std(std_listener)?;
                axum::serve(listener, router)
                    .with_graceful_shutdown(async {
                        let _ = signal.await;
                    })
                    .await
            })
        });

        Ok(Self {
            addr,
            registry,
            shutdown: Some(shutdown),
            handle: Some(handle),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `http://127.0.0.1:<port>`, suitable for `DnsViewClient::new`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn add_test_case(&self, call: MockCall) -> Result<(), MockError> {
        self.registry.register(call)
    }

    pub fn clear_test_cases(&self) {
        self.registry.clear();
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(%err, "mock server stopped with error"),
                Err(_) => warn!("mock server thread panicked"),
            }
        }
    }
}
