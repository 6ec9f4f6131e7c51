// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Owned scalar values and their logical types.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Days between 0001-01-01 (CE day 1) and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// A single owned value in a [`crate::Table`].
///
/// Arrow's many physical widths are collapsed into a handful of logical
/// variants: every signed integer becomes [`Datum::Int`], every float becomes
/// [`Datum::Float`], and so on.
#[derive(Clone, Debug, PartialEq)]
pub enum Datum {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    /// A decimal, already rendered with its scale applied.
    Decimal(String),
    String(String),
    Binary(Vec<u8>),
    Date(NaiveDate),
    /// A time of day without timezone.
    Time(NaiveTime),
    /// A timestamp without timezone, in UTC wall-clock time.
    Timestamp(NaiveDateTime),
    List(Vec<Datum>),
    /// A nested mapping from field name to value, in field order.
    Struct(Vec<(String, Datum)>),
}

impl Datum {
    /// Returns the string slice if this is a [`Datum::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Datum::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the fields if this is a [`Datum::Struct`].
    pub fn as_struct(&self) -> Option<&[(String, Datum)]> {
        match self {
            Datum::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// The logical type of this value. [`Datum::Null`] reports
    /// [`ColumnType::Null`].
    pub fn column_type(&self) -> ColumnType {
        match self {
            Datum::Null => ColumnType::Null,
            Datum::Bool(_) => ColumnType::Bool,
            Datum::Int(_) => ColumnType::Int64,
            Datum::UInt(_) => ColumnType::UInt64,
            Datum::Float(_) => ColumnType::Float64,
            Datum::Decimal(_) => ColumnType::Decimal,
            Datum::String(_) => ColumnType::String,
            Datum::Binary(_) => ColumnType::Binary,
            Datum::Date(_) => ColumnType::Date,
            Datum::Time(_) => ColumnType::Time,
            Datum::Timestamp(_) => ColumnType::Timestamp,
            Datum::List(_) => ColumnType::List,
            Datum::Struct(_) => ColumnType::Struct,
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Null => f.write_str("null"),
            Datum::Bool(b) => write!(f, "{b}"),
            Datum::Int(i) => write!(f, "{i}"),
            Datum::UInt(u) => write!(f, "{u}"),
            Datum::Float(x) => write!(f, "{x}"),
            Datum::Decimal(d) => f.write_str(d),
            Datum::String(s) => f.write_str(s),
            Datum::Binary(bytes) => {
                f.write_str("0x")?;
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            Datum::Date(d) => write!(f, "{d}"),
            Datum::Time(t) => write!(f, "{t}"),
            Datum::Timestamp(ts) => write!(f, "{ts}"),
            Datum::List(elems) => {
                f.write_str("[")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{elem}")?;
                }
                f.write_str("]")
            }
            Datum::Struct(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// The logical type of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Every value is null, so nothing is known about the type.
    Null,
    Bool,
    Int64,
    UInt64,
    Float64,
    Decimal,
    String,
    Binary,
    Date,
    Time,
    Timestamp,
    List,
    /// A list of key/value entries.
    Map,
    Struct,
    /// Values of more than one type.
    Mixed,
}

impl ColumnType {
    /// Returns the type of a column holding values of both `self` and
    /// `other`.
    pub fn unify(self, other: ColumnType) -> ColumnType {
        match (self, other) {
            (ColumnType::Null, other) => other,
            (this, ColumnType::Null) => this,
            (this, other) if this == other => this,
            _ => ColumnType::Mixed,
        }
    }

    /// Infers the type of a column from its values.
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a Datum>) -> ColumnType {
        values
            .into_iter()
            .fold(ColumnType::Null, |typ, datum| typ.unify(datum.column_type()))
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnType::Null => "null",
            ColumnType::Bool => "bool",
            ColumnType::Int64 => "int64",
            ColumnType::UInt64 => "uint64",
            ColumnType::Float64 => "float64",
            ColumnType::Decimal => "decimal",
            ColumnType::String => "string",
            ColumnType::Binary => "binary",
            ColumnType::Date => "date",
            ColumnType::Time => "time",
            ColumnType::Timestamp => "timestamp",
            ColumnType::List => "list",
            ColumnType::Map => "map",
            ColumnType::Struct => "struct",
            ColumnType::Mixed => "mixed",
        })
    }
}

/// Converts a count of milliseconds since the Unix epoch into a timestamp.
///
/// Returns `None` if the instant is outside the representable range.
pub fn timestamp_from_millis(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|ts| ts.naive_utc())
}

/// Converts a count of days since the Unix epoch into a date.
pub fn date_from_days(days: i32) -> Option<NaiveDate> {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
}
