//! The mock call registry: method → uri → ordered bucket of calls.
//!
//! # Design
//! One `RwLock` guards the whole two-level map. `register`, `register_all`
//! and `clear` take the write lock, `find` takes the read lock, so a lookup never observes a
//! half-inserted entry. Each `Registry` is an owned value; independent test
//! fixtures each construct their own.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dnsview_core::{normalize_uri, HttpMethod};
use tracing::{debug, warn};

use crate::call::{Headers, MockCall, MockResponse, RegisteredCall};
use crate::error::MockError;

type Buckets = HashMap<HttpMethod, HashMap<String, Vec<RegisteredCall>>>;

#[derive(Debug, Default)]
pub struct Registry {
    buckets: RwLock<Buckets>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a call to the bucket for its method and normalized URI.
    ///
    /// Fails without touching the registry if the URI is malformed, a
    /// structured body cannot be marshaled, or the bucket already holds an
    /// entry with the same request headers and body.
    pub fn register(&self, call: MockCall) -> Result<(), MockError> {
        let (method, uri, entry) = call.prepare()?;
        insert(&mut self.write(), method, uri, entry)
    }

    /// Register a batch of calls as one unit: either every call lands or
    /// none does. On failure the index of the offending call is returned
    /// alongside its error.
    pub fn register_all<I>(&self, calls: I) -> Result<usize, (usize, MockError)>
    where
        I: IntoIterator<Item = MockCall>,
    {
        let prepared = calls
            .into_iter()
            .enumerate()
            .map(|(index, call)| call.prepare().map_err(|e| (index, e)))
            .collect::<Result<Vec<_>, _>>()?;
        let count = prepared.len();

        let mut buckets = self.write();
        let mut staged = buckets.clone();
        for (index, (method, uri, entry)) in prepared.into_iter().enumerate() {
            insert(&mut staged, method, uri, entry).map_err(|e| (index, e))?;
        }
        *buckets = staged;
        Ok(count)
    }

    /// Discard every registered call.
    pub fn clear(&self) {
        self.write().clear();
        debug!("cleared mock calls");
    }

    /// Answer an incoming call with the first entry, in registration order,
    /// that accepts its headers and body. Entries are not consumed.
    pub fn find(
        &self,
        method: HttpMethod,
        uri: &str,
        headers: &Headers,
        body: &[u8],
    ) -> Result<MockResponse, MockError> {
        let uri = normalize_uri(uri, &[])?;
        let buckets = self.read();

        let found = buckets
            .get(&method)
            .and_then(|by_uri| by_uri.get(&uri))
            .and_then(|bucket| bucket.iter().find(|entry| entry.accepts(headers, body)));

        match found {
            Some(entry) => {
                debug!(%method, %uri, status = entry.status(), "matched mock call");
                Ok(entry.response().clone())
            }
            None => {
                warn!(%method, %uri, "no mock call matches request");
                Err(MockError::NoMatch { method, uri })
            }
        }
    }

    /// Registered calls for `method` and `uri`, in scan order.
    pub fn calls(&self, method: HttpMethod, uri: &str) -> Result<Vec<RegisteredCall>, MockError> {
        let uri = normalize_uri(uri, &[])?;
        Ok(self
            .read()
            .get(&method)
            .and_then(|by_uri| by_uri.get(&uri))
            .cloned()
            .unwrap_or_default())
    }

    /// Total number of registered calls across all buckets.
    pub fn len(&self) -> usize {
        self.read()
            .values()
            .flat_map(HashMap::values)
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> RwLockReadGuard<'_, Buckets> {
        self.buckets.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Buckets> {
        self.buckets.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn insert(
    buckets: &mut Buckets,
    method: HttpMethod,
    uri: String,
    entry: RegisteredCall,
) -> Result<(), MockError> {
    let bucket = buckets.entry(method).or_default().entry(uri.clone()).or_default();
    if bucket.iter().any(|existing| existing.same_request(&entry)) {
        return Err(MockError::Duplicate { method, uri });
    }
    bucket.push(entry);
    debug!(%method, %uri, bucket_size = bucket.len(), "registered mock call");
    Ok(())
}
