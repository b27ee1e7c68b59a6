//! Domain DTOs for the DNS views API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A DNS view: a named set of zones served to a set of networks.
///
/// `created_at`, `updated_at` and `preference` are assigned by the server and
/// are omitted from request bodies when unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DnsView {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub read_acls: Vec<String>,
    #[serde(default)]
    pub update_acls: Vec<String>,
    #[serde(default)]
    pub zones: Vec<String>,
    #[serde(default)]
    pub networks: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preference: Option<i64>,
}

impl DnsView {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// View name to preference. Lower values are consulted first by the server.
///
/// A `BTreeMap` keeps the serialized form stable across calls.
pub type Preferences = BTreeMap<String, i64>;
