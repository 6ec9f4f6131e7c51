// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Connection configuration for S3-compatible object storage.

use std::fmt;

use aws_credential_types::Credentials;
use aws_types::region::Region;
use aws_types::sdk_config::SdkConfig;
use tracing::debug;

/// The name reported by the credentials provider built from
/// [`StaticCredentials`].
const STATIC_PROVIDER_NAME: &str = "cdc-static";

/// Information required to connect to an S3-compatible endpoint.
///
/// Credentials are optional; when absent the SDK's default provider chain
/// looks them up in the process environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct S3ConnectInfo {
    /// The endpoint URL, e.g. `http://localhost:9000`.
    pub endpoint: String,
    /// The region used for request signing.
    pub region: String,
    /// Static credentials, if any.
    pub credentials: Option<StaticCredentials>,
}

/// An access key pair that never expires.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    key: String,
    secret: String,
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl From<StaticCredentials> for Credentials {
    fn from(creds: StaticCredentials) -> Credentials {
        Credentials::new(creds.key, creds.secret, None, None, STATIC_PROVIDER_NAME)
    }
}

impl S3ConnectInfo {
    /// Constructs an `S3ConnectInfo`.
    ///
    /// Both halves of the key pair must be provided, or neither.
    pub fn new(
        endpoint: impl Into<String>,
        region: impl Into<String>,
        key: Option<String>,
        secret: Option<String>,
    ) -> Result<S3ConnectInfo, anyhow::Error> {
        let credentials = match (key, secret) {
            (Some(key), Some(secret)) => Some(StaticCredentials { key, secret }),
            (None, None) => None,
            (_, _) => {
                anyhow::bail!(
                    "Both access_key_id and secret_access_key \
                               must be provided, or neither"
                );
            }
        };
        Ok(S3ConnectInfo {
            endpoint: endpoint.into(),
            region: region.into(),
            credentials,
        })
    }

    /// Loads an SDK configuration that targets this endpoint.
    pub async fn load_sdk_config(&self) -> SdkConfig {
        let mut loader = crate::defaults()
            .region(Region::new(self.region.clone()))
            .endpoint_url(&self.endpoint);
        if let Some(creds) = &self.credentials {
            loader = loader.credentials_provider(Credentials::from(creds.clone()));
        }
        debug!(endpoint = %self.endpoint, region = %self.region, "loading s3 sdk config");
        loader.load().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_both_or_neither_key() {
        let info = S3ConnectInfo::new("http://localhost:9000", "us-east-1", None, None).unwrap();
        assert_eq!(info.credentials, None);

        let info = S3ConnectInfo::new(
            "http://localhost:9000",
            "us-east-1",
            Some("admin".into()),
            Some("password123".into()),
        )
        .unwrap();
        assert!(info.credentials.is_some());

        let err = S3ConnectInfo::new(
            "http://localhost:9000",
            "us-east-1",
            Some("admin".into()),
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("must be provided, or neither"));
    }

    #[test]
    fn debug_redacts_secret() {
        let info = S3ConnectInfo::new(
            "http://localhost:9000",
            "us-east-1",
            Some("admin".into()),
            Some("password123".into()),
        )
        .unwrap();
        let debug = format!("{info:?}");
        assert!(debug.contains("admin"));
        assert!(!debug.contains("password123"));
    }

    #[tokio::test]
    async fn sdk_config_targets_endpoint() {
        let info = S3ConnectInfo::new(
            "http://localhost:9000",
            "us-east-1",
            Some("admin".into()),
            Some("password123".into()),
        )
        .unwrap();
        let sdk_config = info.load_sdk_config().await;
        assert_eq!(sdk_config.region(), Some(&Region::new("us-east-1")));
        assert_eq!(sdk_config.endpoint_url(), Some("http://localhost:9000"));
        assert!(sdk_config.credentials_provider().is_some());
    }
}
