// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! An S3 implementation of [`ObjectStore`].

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use bytes::Bytes;
use cdc_aws_util::s3::Client;
use tracing::{debug, trace};

use crate::config::LakeConfig;
use crate::store::{ObjectStore, StoreError};

/// An [`ObjectStore`] backed by a single S3 (or S3-compatible) bucket.
#[derive(Clone, Debug)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub fn new(client: Client, bucket: String) -> Self {
        S3Store { client, bucket }
    }

    /// Connects to the bucket described by `config`.
    ///
    /// No request is made until the first list or get.
    pub async fn open(config: &LakeConfig) -> Result<Self, anyhow::Error> {
        let sdk_config = config.connect_info()?.load_sdk_config().await;
        let client = cdc_aws_util::s3::new_client(&sdk_config);
        Ok(S3Store::new(client, config.bucket.clone()))
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        let mut continuation_token = None;

        loop {
            let resp = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation_token)
                .send()
                .await
                .map_err(|err| {
                    StoreError::Request(format!("list bucket error: {}", DisplayErrorContext(&err)))
                })?;
            keys.extend(
                resp.contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_owned)),
            );
            trace!(prefix, count = keys.len(), "s3 list page");

            match resp.next_continuation_token() {
                Some(token) => continuation_token = Some(token.to_owned()),
                None => break,
            }
        }

        debug!(bucket = %self.bucket, prefix, count = keys.len(), "s3 ListObjectsV2");
        Ok(keys)
    }

    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        let object = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(object) => object,
            Err(SdkError::ServiceError(err)) if err.err().is_no_such_key() => {
                return Err(StoreError::NotFound {
                    key: key.to_owned(),
                });
            }
            Err(err) => {
                return Err(StoreError::Request(format!(
                    "s3 get meta err: {}",
                    DisplayErrorContext(&err)
                )));
            }
        };

        let body = object
            .body
            .collect()
            .await
            .map_err(|err| StoreError::Request(format!("s3 get body err: {err}")))?
            .into_bytes();
        debug!(bucket = %self.bucket, key, len = body.len(), "s3 GetObject");
        Ok(body)
    }
}
