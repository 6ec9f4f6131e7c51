// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Decoding of Apache Parquet files into [`Table`]s.

use std::sync::Arc;

use ::parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use tracing::debug;

use crate::error::DecodeError;
use crate::reader::ArrowReader;
use crate::table::Table;

/// Decodes an entire in-memory Parquet file into a [`Table`].
///
/// Columns come from the file's Arrow schema, so a file with no rows still
/// produces a table with the right columns and types.
pub fn decode_parquet(buf: Bytes) -> Result<Table, DecodeError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(buf)?;
    let schema = Arc::clone(builder.schema());
    debug!(
        num_rows = builder.metadata().file_metadata().num_rows(),
        num_row_groups = builder.metadata().num_row_groups(),
        "decoding parquet file"
    );

    let mut table = ArrowReader::from_batch(RecordBatch::new_empty(schema))?.read_all()?;
    for batch in builder.build()? {
        let batch = batch?;
        table.append(ArrowReader::from_batch(batch)?.read_all()?);
    }
    Ok(table)
}
