// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Reader for [`arrow`] data that outputs [`Table`]s.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BinaryArray, BooleanArray, Date32Array, Date64Array, Decimal128Array,
    Decimal256Array, FixedSizeBinaryArray, FixedSizeListArray, Float16Array, Float32Array,
    Float64Array, Int8Array, Int16Array, Int32Array, Int64Array, LargeBinaryArray,
    LargeListArray, LargeStringArray, ListArray, MapArray, StringArray, StringViewArray,
    StructArray, Time32MillisecondArray, Time32SecondArray, Time64MicrosecondArray,
    Time64NanosecondArray, TimestampMicrosecondArray, TimestampMillisecondArray,
    TimestampNanosecondArray, TimestampSecondArray, UInt8Array, UInt16Array, UInt32Array,
    UInt64Array,
};
use arrow::buffer::NullBuffer;
use arrow::compute::cast;
use arrow::datatypes::{DataType, Int32Type, Int64Type, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveTime};

use crate::datum::{ColumnType, Datum, date_from_days};
use crate::error::DecodeError;
use crate::table::{Column, Table};

/// Reads the rows of a [`StructArray`] (or a [`RecordBatch`]) into a [`Table`].
///
/// All type dispatch happens once, in [`ArrowReader::new`]; reading a value
/// is then a matter of indexing into an already-downcast array.
#[derive(Debug)]
pub struct ArrowReader {
    len: usize,
    readers: Vec<(String, ColReader)>,
}

impl ArrowReader {
    pub fn new(array: &StructArray) -> Result<Self, DecodeError> {
        let readers = array
            .fields()
            .iter()
            .zip(array.columns())
            .map(|(field, column)| {
                let reader = array_to_reader(field.name(), column)?;
                Ok((field.name().clone(), reader))
            })
            .collect::<Result<_, DecodeError>>()?;

        Ok(ArrowReader {
            len: array.len(),
            readers,
        })
    }

    pub fn from_batch(batch: RecordBatch) -> Result<Self, DecodeError> {
        ArrowReader::new(&StructArray::from(batch))
    }

    /// Reads every row into a new [`Table`].
    ///
    /// Fails if two top-level fields share a name.
    pub fn read_all(&self) -> Result<Table, DecodeError> {
        let columns = self
            .readers
            .iter()
            .map(|(name, reader)| {
                let values = (0..self.len).map(|idx| reader.read(idx)).collect();
                Column::new(name.clone(), reader.column_type(), values)
            })
            .collect();
        Ok(Table::new(self.len, columns)?)
    }
}

fn downcast_array<T: Array + Clone + 'static>(array: &ArrayRef) -> Result<T, DecodeError> {
    array
        .as_any()
        .downcast_ref::<T>()
        .cloned()
        .ok_or_else(|| DecodeError::Downcast(array.data_type().clone()))
}

fn offsets_to_usize<O>(offsets: &[O]) -> Result<Vec<usize>, DecodeError>
where
    O: Copy + Into<i64>,
{
    offsets
        .iter()
        .map(|o| {
            let o: i64 = (*o).into();
            usize::try_from(o).map_err(|_| DecodeError::InvalidOffset(o))
        })
        .collect()
}

fn unsupported(name: &str, data_type: &DataType) -> DecodeError {
    DecodeError::UnsupportedType {
        column: name.to_string(),
        data_type: data_type.clone(),
    }
}

fn array_to_reader(name: &str, array: &ArrayRef) -> Result<ColReader, DecodeError> {
    let reader = match array.data_type() {
        DataType::Null => ColReader::Null,
        DataType::Boolean => ColReader::Boolean(downcast_array::<BooleanArray>(array)?),
        DataType::Int8 => ColReader::Int8(downcast_array::<Int8Array>(array)?),
        DataType::Int16 => ColReader::Int16(downcast_array::<Int16Array>(array)?),
        DataType::Int32 => ColReader::Int32(downcast_array::<Int32Array>(array)?),
        DataType::Int64 => ColReader::Int64(downcast_array::<Int64Array>(array)?),
        DataType::UInt8 => ColReader::UInt8(downcast_array::<UInt8Array>(array)?),
        DataType::UInt16 => ColReader::UInt16(downcast_array::<UInt16Array>(array)?),
        DataType::UInt32 => ColReader::UInt32(downcast_array::<UInt32Array>(array)?),
        DataType::UInt64 => ColReader::UInt64(downcast_array::<UInt64Array>(array)?),
        DataType::Float16 => ColReader::Float16(downcast_array::<Float16Array>(array)?),
        DataType::Float32 => ColReader::Float32(downcast_array::<Float32Array>(array)?),
        DataType::Float64 => ColReader::Float64(downcast_array::<Float64Array>(array)?),
        DataType::Decimal128(_, _) => {
            ColReader::Decimal128(downcast_array::<Decimal128Array>(array)?)
        }
        DataType::Decimal256(_, _) => {
            ColReader::Decimal256(downcast_array::<Decimal256Array>(array)?)
        }
        DataType::Utf8 => ColReader::String(downcast_array::<StringArray>(array)?),
        DataType::LargeUtf8 => ColReader::LargeString(downcast_array::<LargeStringArray>(array)?),
        DataType::Utf8View => ColReader::StringView(downcast_array::<StringViewArray>(array)?),
        DataType::Binary => ColReader::Binary(downcast_array::<BinaryArray>(array)?),
        DataType::LargeBinary => {
            ColReader::LargeBinary(downcast_array::<LargeBinaryArray>(array)?)
        }
        DataType::FixedSizeBinary(_) => {
            ColReader::FixedSizeBinary(downcast_array::<FixedSizeBinaryArray>(array)?)
        }
        DataType::Date32 => ColReader::Date32(downcast_array::<Date32Array>(array)?),
        DataType::Date64 => ColReader::Date64(downcast_array::<Date64Array>(array)?),
        DataType::Time32(unit) => {
            let array = match unit {
                TimeUnit::Second => {
                    downcast_array::<Time32SecondArray>(array)?.reinterpret_cast::<Int32Type>()
                }
                TimeUnit::Millisecond => downcast_array::<Time32MillisecondArray>(array)?
                    .reinterpret_cast::<Int32Type>(),
                _ => return Err(unsupported(name, array.data_type())),
            };
            ColReader::Time32 { array, unit: *unit }
        }
        DataType::Time64(unit) => {
            let array = match unit {
                TimeUnit::Microsecond => downcast_array::<Time64MicrosecondArray>(array)?
                    .reinterpret_cast::<Int64Type>(),
                TimeUnit::Nanosecond => downcast_array::<Time64NanosecondArray>(array)?
                    .reinterpret_cast::<Int64Type>(),
                _ => return Err(unsupported(name, array.data_type())),
            };
            ColReader::Time64 { array, unit: *unit }
        }
        DataType::Timestamp(unit, _tz) => {
            // Every timestamp unit is stored as i64, so collapse them into a
            // single reader that remembers the unit.
            let array = match unit {
                TimeUnit::Second => {
                    downcast_array::<TimestampSecondArray>(array)?.reinterpret_cast::<Int64Type>()
                }
                TimeUnit::Millisecond => downcast_array::<TimestampMillisecondArray>(array)?
                    .reinterpret_cast::<Int64Type>(),
                TimeUnit::Microsecond => downcast_array::<TimestampMicrosecondArray>(array)?
                    .reinterpret_cast::<Int64Type>(),
                TimeUnit::Nanosecond => downcast_array::<TimestampNanosecondArray>(array)?
                    .reinterpret_cast::<Int64Type>(),
            };
            ColReader::Timestamp { array, unit: *unit }
        }
        DataType::List(_) => {
            let list = downcast_array::<ListArray>(array)?;
            ColReader::List(ListReader {
                offsets: offsets_to_usize(list.value_offsets())?,
                nulls: list.nulls().cloned(),
                values: Box::new(array_to_reader(name, list.values())?),
            })
        }
        DataType::LargeList(_) => {
            let list = downcast_array::<LargeListArray>(array)?;
            ColReader::List(ListReader {
                offsets: offsets_to_usize(list.value_offsets())?,
                nulls: list.nulls().cloned(),
                values: Box::new(array_to_reader(name, list.values())?),
            })
        }
        DataType::FixedSizeList(_, _) => {
            let list = downcast_array::<FixedSizeListArray>(array)?;
            let size = list.value_length();
            let size =
                usize::try_from(size).map_err(|_| DecodeError::InvalidOffset(i64::from(size)))?;
            ColReader::List(ListReader {
                offsets: (0..=list.len()).map(|i| i * size).collect(),
                nulls: list.nulls().cloned(),
                values: Box::new(array_to_reader(name, list.values())?),
            })
        }
        DataType::Map(_, _) => {
            // Each map is read as a list of its key/value entry structs.
            let map = downcast_array::<MapArray>(array)?;
            let entries: ArrayRef = Arc::new(map.entries().clone());
            ColReader::Map(ListReader {
                offsets: offsets_to_usize(map.value_offsets())?,
                nulls: map.nulls().cloned(),
                values: Box::new(array_to_reader(name, &entries)?),
            })
        }
        DataType::Dictionary(_, value_type) => {
            let values = cast(array, value_type)?;
            array_to_reader(name, &values)?
        }
        DataType::Struct(_) => {
            let record = downcast_array::<StructArray>(array)?;
            let fields = record
                .fields()
                .iter()
                .zip(record.columns())
                .map(|(field, column)| {
                    let path = format!("{name}.{}", field.name());
                    Ok((field.name().clone(), array_to_reader(&path, column)?))
                })
                .collect::<Result<_, DecodeError>>()?;
            ColReader::Record {
                fields,
                nulls: record.nulls().cloned(),
            }
        }
        other => return Err(unsupported(name, other)),
    };
    Ok(reader)
}

#[derive(Debug)]
enum ColReader {
    Null,
    Boolean(BooleanArray),
    Int8(Int8Array),
    Int16(Int16Array),
    Int32(Int32Array),
    Int64(Int64Array),
    UInt8(UInt8Array),
    UInt16(UInt16Array),
    UInt32(UInt32Array),
    UInt64(UInt64Array),
    Float16(Float16Array),
    Float32(Float32Array),
    Float64(Float64Array),
    Decimal128(Decimal128Array),
    Decimal256(Decimal256Array),
    String(StringArray),
    LargeString(LargeStringArray),
    StringView(StringViewArray),
    Binary(BinaryArray),
    LargeBinary(LargeBinaryArray),
    FixedSizeBinary(FixedSizeBinaryArray),
    Date32(Date32Array),
    Date64(Date64Array),
    Time32 {
        array: Int32Array,
        unit: TimeUnit,
    },
    Time64 {
        array: Int64Array,
        unit: TimeUnit,
    },
    Timestamp {
        array: Int64Array,
        unit: TimeUnit,
    },
    List(ListReader),
    Map(ListReader),
    Record {
        fields: Vec<(String, ColReader)>,
        nulls: Option<NullBuffer>,
    },
}

/// Reads variable-length runs of a child array, one run per row.
#[derive(Debug)]
struct ListReader {
    /// `offsets[i]..offsets[i + 1]` are the child indexes of row `i`.
    offsets: Vec<usize>,
    nulls: Option<NullBuffer>,
    values: Box<ColReader>,
}

impl ListReader {
    fn read(&self, idx: usize) -> Option<Datum> {
        let is_valid = self.nulls.as_ref().map(|n| n.is_valid(idx)).unwrap_or(true);
        match (is_valid, self.offsets.get(idx), self.offsets.get(idx + 1)) {
            (true, Some(start), Some(end)) => Some(Datum::List(
                (*start..*end).map(|i| self.values.read(i)).collect(),
            )),
            _ => None,
        }
    }
}

impl ColReader {
    fn column_type(&self) -> ColumnType {
        match self {
            ColReader::Null => ColumnType::Null,
            ColReader::Boolean(_) => ColumnType::Bool,
            ColReader::Int8(_) | ColReader::Int16(_) | ColReader::Int32(_) | ColReader::Int64(_) => {
                ColumnType::Int64
            }
            ColReader::UInt8(_)
            | ColReader::UInt16(_)
            | ColReader::UInt32(_)
            | ColReader::UInt64(_) => ColumnType::UInt64,
            ColReader::Float16(_) | ColReader::Float32(_) | ColReader::Float64(_) => {
                ColumnType::Float64
            }
            ColReader::Decimal128(_) | ColReader::Decimal256(_) => ColumnType::Decimal,
            ColReader::String(_) | ColReader::LargeString(_) | ColReader::StringView(_) => {
                ColumnType::String
            }
            ColReader::Binary(_) | ColReader::LargeBinary(_) | ColReader::FixedSizeBinary(_) => {
                ColumnType::Binary
            }
            ColReader::Date32(_) | ColReader::Date64(_) => ColumnType::Date,
            ColReader::Time32 { .. } | ColReader::Time64 { .. } => ColumnType::Time,
            ColReader::Timestamp { .. } => ColumnType::Timestamp,
            ColReader::List(_) => ColumnType::List,
            ColReader::Map(_) => ColumnType::Map,
            ColReader::Record { .. } => ColumnType::Struct,
        }
    }

    fn read(&self, idx: usize) -> Datum {
        let datum = match self {
            ColReader::Null => None,
            ColReader::Boolean(array) => array
                .is_valid(idx)
                .then(|| Datum::Bool(array.value(idx))),
            ColReader::Int8(array) => array
                .is_valid(idx)
                .then(|| Datum::Int(i64::from(array.value(idx)))),
            ColReader::Int16(array) => array
                .is_valid(idx)
                .then(|| Datum::Int(i64::from(array.value(idx)))),
            ColReader::Int32(array) => array
                .is_valid(idx)
                .then(|| Datum::Int(i64::from(array.value(idx)))),
            ColReader::Int64(array) => array.is_valid(idx).then(|| Datum::Int(array.value(idx))),
            ColReader::UInt8(array) => array
                .is_valid(idx)
                .then(|| Datum::UInt(u64::from(array.value(idx)))),
            ColReader::UInt16(array) => array
                .is_valid(idx)
                .then(|| Datum::UInt(u64::from(array.value(idx)))),
            ColReader::UInt32(array) => array
                .is_valid(idx)
                .then(|| Datum::UInt(u64::from(array.value(idx)))),
            ColReader::UInt64(array) => array.is_valid(idx).then(|| Datum::UInt(array.value(idx))),
            ColReader::Float16(array) => array
                .is_valid(idx)
                .then(|| Datum::Float(array.value(idx).to_f64())),
            ColReader::Float32(array) => array
                .is_valid(idx)
                .then(|| Datum::Float(f64::from(array.value(idx)))),
            ColReader::Float64(array) => {
                array.is_valid(idx).then(|| Datum::Float(array.value(idx)))
            }
            ColReader::Decimal128(array) => array
                .is_valid(idx)
                .then(|| Datum::Decimal(array.value_as_string(idx))),
            ColReader::Decimal256(array) => array
                .is_valid(idx)
                .then(|| Datum::Decimal(array.value_as_string(idx))),
            ColReader::String(array) => array
                .is_valid(idx)
                .then(|| Datum::String(array.value(idx).to_owned())),
            ColReader::LargeString(array) => array
                .is_valid(idx)
                .then(|| Datum::String(array.value(idx).to_owned())),
            ColReader::StringView(array) => array
                .is_valid(idx)
                .then(|| Datum::String(array.value(idx).to_owned())),
            ColReader::Binary(array) => array
                .is_valid(idx)
                .then(|| Datum::Binary(array.value(idx).to_vec())),
            ColReader::LargeBinary(array) => array
                .is_valid(idx)
                .then(|| Datum::Binary(array.value(idx).to_vec())),
            ColReader::FixedSizeBinary(array) => array
                .is_valid(idx)
                .then(|| Datum::Binary(array.value(idx).to_vec())),
            ColReader::Date32(array) => array
                .is_valid(idx)
                .then(|| date_from_days(array.value(idx)).map(Datum::Date))
                .flatten(),
            ColReader::Date64(array) => array
                .is_valid(idx)
                .then(|| DateTime::from_timestamp_millis(array.value(idx)))
                .flatten()
                .map(|ts| Datum::Date(ts.date_naive())),
            ColReader::Time32 { array, unit } => array
                .is_valid(idx)
                .then(|| time(i64::from(array.value(idx)), *unit))
                .flatten(),
            ColReader::Time64 { array, unit } => array
                .is_valid(idx)
                .then(|| time(array.value(idx), *unit))
                .flatten(),
            ColReader::Timestamp { array, unit } => array
                .is_valid(idx)
                .then(|| timestamp(array.value(idx), *unit))
                .flatten(),
            ColReader::List(list) | ColReader::Map(list) => list.read(idx),
            ColReader::Record { fields, nulls } => {
                let is_valid = nulls.as_ref().map(|n| n.is_valid(idx)).unwrap_or(true);
                is_valid.then(|| {
                    Datum::Struct(
                        fields
                            .iter()
                            .map(|(name, field)| (name.clone(), field.read(idx)))
                            .collect(),
                    )
                })
            }
        };
        datum.unwrap_or(Datum::Null)
    }
}

fn timestamp(value: i64, unit: TimeUnit) -> Option<Datum> {
    let ts = match unit {
        TimeUnit::Second => DateTime::from_timestamp(value, 0),
        TimeUnit::Millisecond => DateTime::from_timestamp_millis(value),
        TimeUnit::Microsecond => DateTime::from_timestamp_micros(value),
        TimeUnit::Nanosecond => Some(DateTime::from_timestamp_nanos(value)),
    };
    ts.map(|ts| Datum::Timestamp(ts.naive_utc()))
}

/// Converts `value` units since midnight into a time of day. Values outside
/// a single day are null.
fn time(value: i64, unit: TimeUnit) -> Option<Datum> {
    let per_second: i64 = match unit {
        TimeUnit::Second => 1,
        TimeUnit::Millisecond => 1_000,
        TimeUnit::Microsecond => 1_000_000,
        TimeUnit::Nanosecond => 1_000_000_000,
    };
    let secs = u32::try_from(value.div_euclid(per_second)).ok()?;
    let nanos =
        u32::try_from(value.rem_euclid(per_second) * (1_000_000_000 / per_second)).ok()?;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos).map(Datum::Time)
}
