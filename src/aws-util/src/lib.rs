// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! AWS utility library for the CDC data lake reader.

#![warn(missing_docs, missing_debug_implementations)]

use aws_config::{BehaviorVersion, ConfigLoader};

pub mod config;
pub mod s3;

/// Returns an AWS SDK configuration loader with the defaults used throughout
/// this workspace.
///
/// Callers layer the region, endpoint, and credentials on top of the
/// returned loader.
pub fn defaults() -> ConfigLoader {
    aws_config::defaults(BehaviorVersion::latest())
}
