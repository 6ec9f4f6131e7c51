// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Connection settings for the data lake.
//!
//! The reader targets a single local MinIO deployment, so every value is
//! compiled in.

use std::fmt;

use cdc_aws_util::config::S3ConnectInfo;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:9000";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_ACCESS_KEY_ID: &str = "admin";
pub const DEFAULT_SECRET_ACCESS_KEY: &str = "password123";
pub const DEFAULT_BUCKET: &str = "my-data-lake";

/// The topics read when no path is given on the command line, in order.
pub const DEFAULT_TOPICS: [&str; 4] = ["customers", "products", "orders", "order_items"];

/// Where the data lake lives and what to read from it by default.
#[derive(Clone)]
pub struct LakeConfig {
    pub endpoint: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub topics: Vec<String>,
}

impl Default for LakeConfig {
    fn default() -> Self {
        LakeConfig {
            endpoint: DEFAULT_ENDPOINT.into(),
            region: DEFAULT_REGION.into(),
            access_key_id: DEFAULT_ACCESS_KEY_ID.into(),
            secret_access_key: DEFAULT_SECRET_ACCESS_KEY.into(),
            bucket: DEFAULT_BUCKET.into(),
            topics: DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl fmt::Debug for LakeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LakeConfig")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("topics", &self.topics)
            .finish()
    }
}

impl LakeConfig {
    /// Returns the S3 connection details for this lake.
    pub fn connect_info(&self) -> Result<S3ConnectInfo, anyhow::Error> {
        S3ConnectInfo::new(
            self.endpoint.clone(),
            self.region.clone(),
            Some(self.access_key_id.clone()),
            Some(self.secret_access_key.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LakeConfig::default();
        assert_eq!(config.bucket, "my-data-lake");
        assert_eq!(
            config.topics,
            vec!["customers", "products", "orders", "order_items"]
        );

        let info = config.connect_info().unwrap();
        assert_eq!(info.endpoint, "http://localhost:9000");
        assert!(info.credentials.is_some());

        assert!(!format!("{config:?}").contains("password123"));
    }
}
