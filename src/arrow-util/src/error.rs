// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Decoding errors.

use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use ::parquet::errors::ParquetError;

use crate::table::TableError;

/// An error decoding Parquet or Arrow data into a [`crate::Table`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error(transparent)]
    Parquet(#[from] ParquetError),
    #[error(transparent)]
    Arrow(#[from] ArrowError),
    #[error("column '{column}' has unsupported type {data_type}")]
    UnsupportedType { column: String, data_type: DataType },
    #[error("array does not match its declared type {0}")]
    Downcast(DataType),
    #[error("invalid list offset {0}")]
    InvalidOffset(i64),
    #[error(transparent)]
    Table(#[from] TableError),
}
