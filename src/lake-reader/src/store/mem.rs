// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! In-memory implementation of [`ObjectStore`], for testing.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;

use crate::store::{ObjectStore, StoreError};

/// An [`ObjectStore`] that keeps every object in memory.
///
/// Records the key of every `get` so tests can assert on what was fetched.
#[derive(Debug, Default)]
pub struct MemStore {
    objects: BTreeMap<String, Bytes>,
    unavailable: bool,
    fetched: Mutex<Vec<String>>,
}

impl MemStore {
    pub fn new() -> Self {
        MemStore::default()
    }

    /// Stores `value` at `key`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Bytes>) {
        self.objects.insert(key.into(), value.into());
    }

    /// When set, every request fails as if the store could not be reached.
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    /// The keys passed to `get`, in call order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched_lock().map(|f| f.clone()).unwrap_or_default()
    }

    fn fetched_lock(&self) -> Result<MutexGuard<'_, Vec<String>>, StoreError> {
        self.fetched
            .lock()
            .map_err(|err| StoreError::Request(format!("poison: {err}")))
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Request("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemStore {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.ensure_available()?;
        Ok(self
            .objects
            .range(prefix.to_owned()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        self.ensure_available()?;
        self.fetched_lock()?.push(key.to_owned());
        self.objects
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_owned(),
            })
    }
}
