// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Spot checks that PII columns were masked upstream.
//!
//! The pipeline masks emails as `john***@MASKED.com`, phone numbers with `*`
//! and addresses as `REDACTED`. A column counts as masked when at least one of
//! its string values carries the marker; this does not prove every row was
//! masked.

use cdc_arrow_util::{Datum, Table};

pub const EMAIL_COLUMN: &str = "email";
pub const PHONE_COLUMN: &str = "phone";
pub const ADDRESS_COLUMN: &str = "address";

/// Number of sample values reported per column.
pub const SAMPLE_SIZE: usize = 5;

/// The masking check for one PII column.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCheck {
    /// Human-readable field name.
    pub label: &'static str,
    pub column: &'static str,
    /// The first values of the column, or `None` if the column is absent.
    pub samples: Option<Vec<Datum>>,
    pub masked: bool,
}

impl FieldCheck {
    fn new(table: &Table, label: &'static str, column: &'static str, marker: &str) -> Self {
        match table.column(column) {
            Some(values) => FieldCheck {
                label,
                column,
                samples: Some(values.head(SAMPLE_SIZE).to_vec()),
                masked: values
                    .values()
                    .iter()
                    .filter_map(Datum::as_str)
                    .any(|value| value.contains(marker)),
            },
            None => FieldCheck {
                label,
                column,
                samples: None,
                masked: false,
            },
        }
    }
}

/// Masking checks for the email, phone, and address columns of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskingReport {
    pub email: FieldCheck,
    pub phone: FieldCheck,
    pub address: FieldCheck,
}

impl MaskingReport {
    /// Checks `table`, or returns `None` if it has no `email` column and so
    /// does not look like it holds PII.
    pub fn new(table: &Table) -> Option<Self> {
        table.column(EMAIL_COLUMN)?;
        Some(MaskingReport {
            email: FieldCheck::new(table, "Email", EMAIL_COLUMN, "MASKED"),
            // Any asterisk counts, even one that was in the original number.
            phone: FieldCheck::new(table, "Phone", PHONE_COLUMN, "*"),
            address: FieldCheck::new(table, "Address", ADDRESS_COLUMN, "REDACTED"),
        })
    }

    pub fn fields(&self) -> [&FieldCheck; 3] {
        [&self.email, &self.phone, &self.address]
    }
}
