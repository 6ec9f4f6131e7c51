// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The result of every reader operation.

use std::io;

use cdc_arrow_util::{DecodeError, TableError};

use crate::store::StoreError;

/// The result of a reader operation.
pub type Outcome<T> = Result<Success<T>, Failure>;

/// A successful operation: a message for the user plus the produced data.
#[derive(Debug, Clone, PartialEq)]
pub struct Success<T> {
    pub message: String,
    pub data: T,
}

impl<T> Success<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Success {
            message: message.into(),
            data,
        }
    }
}

/// What went wrong in a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The object store could not be reached or rejected a request.
    Storage,
    /// A requested object or file does not exist.
    NotFound,
    /// An object could not be decoded as a table.
    Decode,
    /// Nothing was found to read.
    Empty,
    /// The report could not be written.
    Output,
}

/// A failed operation: a message for the user and, when the failure was
/// caused by an underlying error, that error's description.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
    pub detail: Option<String>,
}

impl Failure {
    /// A failure with no underlying cause.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Failure {
            kind,
            message: message.into(),
            detail: None,
        }
    }

    /// A failure caused by `cause`, whose kind and description it takes.
    pub fn with_cause(message: impl Into<String>, cause: impl Into<ReadError>) -> Self {
        let cause = cause.into();
        Failure {
            kind: cause.kind(),
            message: message.into(),
            detail: Some(cause.to_string()),
        }
    }

    /// Returns the failure as an [`io::Error`] if it means the report itself
    /// can no longer be written.
    pub fn as_output_error(&self) -> Option<io::Error> {
        (self.kind == FailureKind::Output).then(|| {
            io::Error::other(
                self.detail
                    .clone()
                    .unwrap_or_else(|| self.message.clone()),
            )
        })
    }
}

impl From<io::Error> for Failure {
    fn from(err: io::Error) -> Self {
        Failure {
            kind: FailureKind::Output,
            message: "Failed to write output".into(),
            detail: Some(err.to_string()),
        }
    }
}

/// An error fetching or decoding a single file.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Table(#[from] TableError),
}

impl ReadError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ReadError::Store(StoreError::NotFound { .. }) => FailureKind::NotFound,
            ReadError::Store(StoreError::Request(_)) => FailureKind::Storage,
            ReadError::Decode(_) | ReadError::Table(_) => FailureKind::Decode,
        }
    }
}
