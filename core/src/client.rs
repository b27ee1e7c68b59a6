//! Stateless HTTP request builder and response parser for the DNS views API.
//!
//! # Design
//! `DnsViewClient` holds only a `base_url` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller executes the actual HTTP round-trip.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{DnsView, Preferences};
use crate::uri::{normalize_uri, UriError};

/// Production API endpoint used by `DnsViewClient::default()`.
pub const DEFAULT_ENDPOINT: &str = "https://api.nsone.net";

const PREFERENCE_PATH: &str = "config/views/preference";

type Sentinel = (u16, fn() -> ApiError);

const VIEW_EXISTS: Sentinel = (409, || ApiError::ViewExists);
const VIEW_MISSING: Sentinel = (404, || ApiError::ViewMissing);

/// Synchronous, stateless client for the DNS views API.
#[derive(Debug, Clone)]
pub struct DnsViewClient {
    base_url: String,
}

impl Default for DnsViewClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl DnsViewClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_views(&self) -> Result<HttpRequest, ApiError> {
        self.request(HttpMethod::Get, "views", None)
    }

    /// `PUT /v1/views/{name}`. The view must carry at least a name.
    pub fn build_create_view(&self, view: &DnsView) -> Result<HttpRequest, ApiError> {
        let body = encode(view)?;
        self.request(HttpMethod::Put, &view_path(&view.name)?, Some(body))
    }

    pub fn build_get_view(&self, name: &str) -> Result<HttpRequest, ApiError> {
        self.request(HttpMethod::Get, &view_path(name)?, None)
    }

    pub fn build_update_view(&self, view: &DnsView) -> Result<HttpRequest, ApiError> {
        let body = encode(view)?;
        self.request(HttpMethod::Post, &view_path(&view.name)?, Some(body))
    }

    pub fn build_delete_view(&self, name: &str) -> Result<HttpRequest, ApiError> {
        self.request(HttpMethod::Delete, &view_path(name)?, None)
    }

    pub fn build_get_preferences(&self) -> Result<HttpRequest, ApiError> {
        self.request(HttpMethod::Get, PREFERENCE_PATH, None)
    }

    pub fn build_update_preferences(&self, prefs: &Preferences) -> Result<HttpRequest, ApiError> {
        let body = encode(prefs)?;
        self.request(HttpMethod::Post, PREFERENCE_PATH, Some(body))
    }

    pub fn parse_list_views(&self, response: HttpResponse) -> Result<Vec<DnsView>, ApiError> {
        check_status(&response, &[])?;
        decode(&response)
    }

    pub fn parse_create_view(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, &[VIEW_EXISTS])
    }

    pub fn parse_get_view(&self, response: HttpResponse) -> Result<DnsView, ApiError> {
        check_status(&response, &[VIEW_MISSING])?;
        decode(&response)
    }

    /// Returns the view as stored by the server after the update.
    pub fn parse_update_view(&self, response: HttpResponse) -> Result<DnsView, ApiError> {
        check_status(&response, &[VIEW_MISSING])?;
        decode(&response)
    }

    pub fn parse_delete_view(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, &[VIEW_MISSING])
    }

    pub fn parse_get_preferences(&self, response: HttpResponse) -> Result<Preferences, ApiError> {
        check_status(&response, &[])?;
        decode(&response)
    }

    /// A 404 here means the map named a view that does not exist.
    pub fn parse_update_preferences(
        &self,
        response: HttpResponse,
    ) -> Result<Preferences, ApiError> {
        check_status(&response, &[VIEW_MISSING])?;
        decode(&response)
    }

    fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
    ) -> Result<HttpRequest, ApiError> {
        let uri = normalize_uri(path, &[])?;
        let headers = match body {
            Some(_) => vec![("content-type".to_string(), "application/json".to_string())],
            None => Vec::new(),
        };
        Ok(HttpRequest {
            method,
            url: format!("{}{uri}", self.base_url),
            headers,
            body,
        })
    }
}

/// Path of a single view. A name is one path segment, so separators and
/// the query and fragment delimiters are refused rather than letting them
/// address some other resource.
fn view_path(name: &str) -> Result<String, ApiError> {
    if let Some(found) = name.chars().find(|c| matches!(c, '/' | '?' | '#')) {
        return Err(UriError::InvalidCharacter {
            uri: name.to_string(),
            found,
        }
        .into());
    }
    Ok(format!("views/{name}"))
}

/// Error body returned by the API alongside non-2xx statuses.
#[derive(Deserialize)]
struct ErrorEnvelope {
    message: String,
}

/// Map non-success status codes to a sentinel or to `ApiError::Http`.
fn check_status(response: &HttpResponse, sentinels: &[Sentinel]) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if let Some((_, sentinel)) = sentinels.iter().find(|(status, _)| *status == response.status) {
        return Err(sentinel());
    }
    let message = serde_json::from_str::<ErrorEnvelope>(&response.body)
        .map(|envelope| envelope.message)
        .unwrap_or_else(|_| response.body.clone());
    Err(ApiError::Http {
        status: response.status,
        message,
    })
}

fn encode<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
