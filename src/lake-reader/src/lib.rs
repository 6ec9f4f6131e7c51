// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Inspection of Debezium CDC Parquet files stored in an S3-compatible data
//! lake.
//!
//! A [`LakeReader`] lists the Parquet objects written for a topic (or matched
//! by a user-supplied path), decodes each one, unwraps the Debezium `after`
//! envelope into flat columns, concatenates the results, and prints a
//! human-readable report including a PII masking spot check.

#![warn(missing_debug_implementations)]

pub mod cdc;
pub mod combine;
pub mod config;
pub mod mask;
pub mod outcome;
pub mod present;
pub mod reader;
pub mod resolve;
pub mod store;

pub use crate::config::LakeConfig;
pub use crate::outcome::{Failure, FailureKind, Outcome, ReadError, Success};
pub use crate::reader::LakeReader;
pub use crate::store::{ObjectStore, StoreError};
