// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Unwrapping of Debezium change event envelopes.
//!
//! A Debezium envelope stores the row state after the change in a nested
//! `after` struct, next to the operation code (`op`: `c`, `u`, `d`, `r`) and
//! the event time in epoch milliseconds (`ts_ms`). Unwrapping promotes the
//! fields of `after` to top-level columns.

use std::collections::BTreeSet;

use cdc_arrow_util::datum::timestamp_from_millis;
use cdc_arrow_util::{Column, ColumnType, Datum, Table, TableError};

pub const AFTER_COLUMN: &str = "after";
pub const OP_COLUMN: &str = "op";
pub const TS_MS_COLUMN: &str = "ts_ms";
pub const CDC_OPERATION_COLUMN: &str = "_cdc_operation";
pub const CDC_TIMESTAMP_COLUMN: &str = "_cdc_timestamp";

/// Flattens a table of Debezium envelopes into a table of row states.
///
/// Tables without an `after` column are returned unchanged. Otherwise the
/// result has exactly one row per input row: rows whose `after` is null (e.g.
/// deletes) or not a struct become rows of nulls. The fields of `after` become
/// columns in the order they are first seen, followed by `_cdc_operation` and
/// `_cdc_timestamp` when `op` and `ts_ms` exist.
pub fn extract_after(table: Table) -> Result<Table, TableError> {
    let Some(after) = table.column(AFTER_COLUMN) else {
        return Ok(table);
    };

    let rows: Vec<&[(String, Datum)]> = after
        .values()
        .iter()
        .map(|datum| datum.as_struct().unwrap_or(&[]))
        .collect();

    let mut seen = BTreeSet::new();
    let mut names = Vec::new();
    for (name, _) in rows.iter().flat_map(|row| row.iter()) {
        if seen.insert(name.as_str()) {
            names.push(name.as_str());
        }
    }

    let columns = names
        .into_iter()
        .map(|name| {
            let values = rows
                .iter()
                .map(|row| {
                    row.iter()
                        .find(|(field, _)| field == name)
                        .map(|(_, value)| value.clone())
                        .unwrap_or(Datum::Null)
                })
                .collect();
            Column::from_values(name, values)
        })
        .collect();
    let mut flattened = Table::new(table.num_rows(), columns)?;

    if let Some(op) = table.column(OP_COLUMN) {
        flattened.set_column(op.clone().renamed(CDC_OPERATION_COLUMN))?;
    }
    if let Some(ts_ms) = table.column(TS_MS_COLUMN) {
        let values = ts_ms.values().iter().map(millis_to_timestamp).collect();
        flattened.set_column(Column::new(
            CDC_TIMESTAMP_COLUMN,
            ColumnType::Timestamp,
            values,
        ))?;
    }

    Ok(flattened)
}

fn millis_to_timestamp(datum: &Datum) -> Datum {
    let ts = match datum {
        Datum::Int(millis) => timestamp_from_millis(*millis),
        Datum::UInt(millis) => i64::try_from(*millis).ok().and_then(timestamp_from_millis),
        Datum::Timestamp(ts) => Some(*ts),
        _ => None,
    };
    ts.map(Datum::Timestamp).unwrap_or(Datum::Null)
}
