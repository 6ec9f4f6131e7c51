// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Arrow and Parquet utilities for inspecting CDC data.
//!
//! Parquet files are decoded into Arrow record batches and then into an owned,
//! schema-less [`Table`] of [`Datum`]s that is easy to reshape and print.

#![warn(missing_debug_implementations)]

pub mod datum;
pub mod error;
pub mod parquet;
pub mod reader;
pub mod table;

pub use crate::datum::{ColumnType, Datum};
pub use crate::error::DecodeError;
pub use crate::parquet::decode_parquet;
pub use crate::table::{Column, Table, TableError};
