// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! AWS S3 client utilities.

use aws_types::sdk_config::SdkConfig;

pub use aws_sdk_s3::Client;

/// Creates a new S3 client from the provided SDK configuration.
///
/// The client always uses path-style addressing (`<endpoint>/<bucket>/<key>`),
/// which S3-compatible stores like MinIO require when addressed by
/// `host:port`.
pub fn new_client(sdk_config: &SdkConfig) -> Client {
    let conf = aws_sdk_s3::config::Builder::from(sdk_config)
        .force_path_style(true)
        .build();
    Client::from_conf(conf)
}
