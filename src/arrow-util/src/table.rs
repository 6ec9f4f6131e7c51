// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! An owned, column-oriented table of [`Datum`]s.

use std::iter;

use crate::datum::{ColumnType, Datum};

/// An error constructing or modifying a [`Table`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TableError {
    #[error("column '{column}' has {actual} values but the table has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
}

/// A named column of values sharing a logical type.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    typ: ColumnType,
    values: Vec<Datum>,
}

impl Column {
    pub fn new(name: impl Into<String>, typ: ColumnType, values: Vec<Datum>) -> Self {
        Column {
            name: name.into(),
            typ,
            values,
        }
    }

    /// Creates a column whose type is inferred from `values`.
    pub fn from_values(name: impl Into<String>, values: Vec<Datum>) -> Self {
        let typ = ColumnType::infer(&values);
        Column::new(name, typ, values)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn typ(&self) -> ColumnType {
        self.typ
    }

    pub fn values(&self) -> &[Datum] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns up to the first `n` values.
    pub fn head(&self, n: usize) -> &[Datum] {
        &self.values[..n.min(self.values.len())]
    }

    /// Renames the column, keeping its values.
    pub fn renamed(self, name: impl Into<String>) -> Self {
        Column {
            name: name.into(),
            ..self
        }
    }
}

/// An ordered set of equal-length, uniquely named columns.
///
/// The row count is tracked separately so that a table can have rows but no
/// columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    num_rows: usize,
    columns: Vec<Column>,
}

impl Table {
    /// Creates a table from `columns`, each of which must hold exactly
    /// `num_rows` values.
    pub fn new(num_rows: usize, columns: Vec<Column>) -> Result<Self, TableError> {
        let mut table = Table::with_rows(num_rows);
        for column in columns {
            if table.column(column.name()).is_some() {
                return Err(TableError::DuplicateColumn(column.name));
            }
            table.set_column(column)?;
        }
        Ok(table)
    }

    /// Creates a table with `num_rows` rows and no columns.
    pub fn with_rows(num_rows: usize) -> Self {
        Table {
            num_rows,
            columns: Vec::new(),
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name())
    }

    /// Adds `column` to the end of the table, or replaces the existing column
    /// of the same name in place.
    pub fn set_column(&mut self, column: Column) -> Result<(), TableError> {
        if column.len() != self.num_rows {
            return Err(TableError::LengthMismatch {
                column: column.name,
                expected: self.num_rows,
                actual: column.values.len(),
            });
        }
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        Ok(())
    }

    /// Appends the rows of `other` below the rows of `self`.
    ///
    /// The resulting columns are the union of both tables' columns: those of
    /// `self` first, then any new columns of `other` in their original order.
    /// Cells a table has no column for are filled with [`Datum::Null`].
    pub fn append(&mut self, other: Table) {
        let Table {
            num_rows: other_rows,
            columns: mut other_columns,
        } = other;

        for column in &mut self.columns {
            match other_columns.iter().position(|c| c.name == column.name) {
                Some(pos) => {
                    let other = other_columns.remove(pos);
                    column.typ = column.typ.unify(other.typ);
                    column.values.extend(other.values);
                }
                None => column
                    .values
                    .extend(iter::repeat_n(Datum::Null, other_rows)),
            }
        }

        for other in other_columns {
            let mut values = Vec::with_capacity(self.num_rows + other_rows);
            values.extend(iter::repeat_n(Datum::Null, self.num_rows));
            values.extend(other.values);
            self.columns.push(Column {
                name: other.name,
                typ: ColumnType::Null.unify(other.typ),
                values,
            });
        }

        self.num_rows += other_rows;
    }

    /// Concatenates `tables` in order. See [`Table::append`].
    pub fn concat(tables: impl IntoIterator<Item = Table>) -> Table {
        let mut tables = tables.into_iter();
        let mut combined = tables.next().unwrap_or_default();
        for table in tables {
            combined.append(table);
        }
        combined
    }

    /// Returns a table holding the named columns, in the given order. Names
    /// with no matching column are skipped.
    pub fn select(&self, names: &[&str]) -> Table {
        Table {
            num_rows: self.num_rows,
            columns: names
                .iter()
                .filter_map(|name| self.column(name).cloned())
                .collect(),
        }
    }

    /// Returns a table holding up to the first `n` rows.
    pub fn head(&self, n: usize) -> Table {
        let num_rows = n.min(self.num_rows);
        Table {
            num_rows,
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    typ: c.typ,
                    values: c.values[..num_rows].to_vec(),
                })
                .collect(),
        }
    }
}
