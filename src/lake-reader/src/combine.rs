// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Concatenation of the tables read from a batch of files.

use cdc_arrow_util::Table;

use crate::outcome::{Failure, FailureKind, Outcome, Success};

/// Concatenates `tables` in order into a single table.
///
/// Empty tables contribute nothing. If no rows remain at all, for example
/// because every fetch in the batch failed, the result is a failure.
pub fn combine(tables: Vec<Table>) -> Outcome<Table> {
    let tables: Vec<_> = tables.into_iter().filter(|t| !t.is_empty()).collect();
    if tables.is_empty() {
        return Err(Failure::new(FailureKind::Empty, "No data found in files"));
    }

    let count = tables.len();
    let combined = Table::concat(tables);
    Ok(Success::new(
        format!("Combined {count} tables into {} rows", combined.num_rows()),
        combined,
    ))
}
