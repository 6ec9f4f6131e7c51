// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Abstraction over the object store holding the data lake.

use std::fmt::Debug;

use async_trait::async_trait;
use bytes::Bytes;

pub mod mem;
pub mod s3;

pub use crate::store::mem::MemStore;
pub use crate::store::s3::S3Store;

/// An error talking to an [`ObjectStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("object not found: {key}")]
    NotFound { key: String },
    #[error("{0}")]
    Request(String),
}

/// The read-only subset of an object store that the reader needs.
#[async_trait]
pub trait ObjectStore: Debug + Send + Sync {
    /// Returns every key that starts with `prefix`, recursing into nested
    /// "directories", in lexicographic order.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Returns the full contents of the object at `key`.
    async fn get(&self, key: &str) -> Result<Bytes, StoreError>;
}
