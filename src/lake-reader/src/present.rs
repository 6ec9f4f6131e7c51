// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Plain-text rendering of tables and masking reports.
//!
//! Nothing is truncated: every row and every column of a table is printed.

use std::fmt::Write as _;
use std::io::{self, Write};

use cdc_arrow_util::Table;

use crate::mask::{
    ADDRESS_COLUMN, EMAIL_COLUMN, FieldCheck, MaskingReport, PHONE_COLUMN, SAMPLE_SIZE,
};

const RULE_WIDTH: usize = 80;
const COLUMN_SEPARATOR: &str = "  ";

/// Writes a blank line followed by `title` between two rules of `=`.
pub fn banner<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "\n{rule}\n{title}\n{rule}")
}

/// Writes `table` under a banner titled `title`, followed by its shape,
/// every row, and the type of each column.
pub fn print_table<W: Write>(out: &mut W, table: &Table, title: &str) -> io::Result<()> {
    banner(out, title)?;

    if table.is_empty() {
        return writeln!(out, "No data to display");
    }

    writeln!(
        out,
        "Shape: {} rows × {} columns\n",
        table.num_rows(),
        table.num_columns()
    )?;
    write_table(out, table)?;

    let rule = "-".repeat(RULE_WIDTH);
    writeln!(out, "\n{rule}\nData Types:\n{rule}")?;
    for column in table.columns() {
        writeln!(out, "  {:30} {}", column.name(), column.typ())?;
    }
    Ok(())
}

/// Writes every row of `table`, prefixed by its index.
pub fn write_table<W: Write>(out: &mut W, table: &Table) -> io::Result<()> {
    let headers: Vec<String> = table.column_names().map(str::to_owned).collect();
    let rows: Vec<Vec<String>> = (0..table.num_rows())
        .map(|idx| {
            table
                .columns()
                .iter()
                .map(|column| column.values()[idx].to_string())
                .collect()
        })
        .collect();
    write_grid(out, &headers, &rows, true)
}

/// Writes the sample values of the PII columns of `table`, one row per table
/// row: `email`, `phone`, and `address` if all three exist, otherwise `email`
/// alone.
pub fn print_sample_rows<W: Write>(out: &mut W, table: &Table) -> io::Result<()> {
    banner(out, "PII Masking Verification")?;

    let pii = [EMAIL_COLUMN, PHONE_COLUMN, ADDRESS_COLUMN];
    let columns: &[&str] = if pii.iter().all(|c| table.column(c).is_some()) {
        &pii
    } else {
        &[EMAIL_COLUMN]
    };
    writeln!(out, "\nSample Values:")?;
    write_table(out, &table.select(columns).head(SAMPLE_SIZE))
}

/// Writes the sample values of each PII column of `report`, one row per
/// column.
pub fn print_sample_fields<W: Write>(out: &mut W, report: &MaskingReport) -> io::Result<()> {
    banner(out, "PII Masking Verification")?;

    let headers = ["Field".to_owned(), "Sample Values".to_owned()];
    let rows: Vec<Vec<String>> = report
        .fields()
        .iter()
        .map(|check| vec![check.label.to_owned(), format_samples(check)])
        .collect();
    write_grid(out, &headers, &rows, false)
}

/// Writes whether each PII column of `report` looks masked.
pub fn print_masking_status<W: Write>(out: &mut W, report: &MaskingReport) -> io::Result<()> {
    banner(out, "Masking Status:")?;

    let headers = ["Field".to_owned(), "Masked".to_owned()];
    let rows: Vec<Vec<String>> = report
        .fields()
        .iter()
        .map(|check| {
            let masked = if check.masked { "YES" } else { "NO" };
            vec![check.label.to_owned(), masked.to_owned()]
        })
        .collect();
    write_grid(out, &headers, &rows, false)
}

fn format_samples(check: &FieldCheck) -> String {
    match &check.samples {
        None => "N/A".to_owned(),
        Some(samples) => {
            let samples: Vec<String> = samples.iter().map(|s| s.to_string()).collect();
            format!("[{}]", samples.join(", "))
        }
    }
}

/// Writes `rows` under `headers` with every cell right-aligned to the widest
/// entry of its column. With `index`, each row is prefixed by its position.
fn write_grid<W: Write>(
    out: &mut W,
    headers: &[String],
    rows: &[Vec<String>],
    index: bool,
) -> io::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    let index_width = index.then(|| rows.len().saturating_sub(1).to_string().len());

    writeln!(out, "{}", format_line("", index_width, headers, &widths))?;
    for (idx, row) in rows.iter().enumerate() {
        let label = idx.to_string();
        writeln!(out, "{}", format_line(&label, index_width, row, &widths))?;
    }
    Ok(())
}

fn format_line(label: &str, label_width: Option<usize>, cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    if let Some(label_width) = label_width {
        let _ = write!(line, "{label:<label_width$}");
    }
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 || label_width.is_some() {
            line.push_str(COLUMN_SEPARATOR);
        }
        let _ = write!(line, "{cell:>width$}");
    }
    line.truncate(line.trim_end().len());
    line
}
