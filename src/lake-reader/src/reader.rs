// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Reading topics and paths from the data lake.

use std::io::{self, Write};

use cdc_arrow_util::{Table, decode_parquet};
use tracing::{debug, info, warn};

use crate::cdc;
use crate::combine::combine;
use crate::mask::MaskingReport;
use crate::outcome::{Failure, FailureKind, Outcome, ReadError, Success};
use crate::present;
use crate::resolve::{ResolvedPath, TOPICS_PREFIX, is_parquet};
use crate::store::ObjectStore;

/// The most files read for a single topic or path. Any further matches are
/// ignored.
pub const MAX_FILES_PER_READ: usize = 20;

/// The most keys printed when listing a topic.
pub const LIST_PREVIEW_LIMIT: usize = 10;

/// Reads Parquet files out of an [`ObjectStore`] and writes a report of what
/// it finds to `out`.
///
/// Every operation reports its result as an [`Outcome`]; failures are meant to
/// be printed and skipped, never to end the run.
#[derive(Debug)]
pub struct LakeReader<S, W> {
    pub(crate) store: S,
    pub(crate) out: W,
}

impl<S: ObjectStore, W: Write> LakeReader<S, W> {
    pub fn new(store: S, out: W) -> Self {
        LakeReader { store, out }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the reader, returning the report writer.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Runs the command-line workflow: reads `path` if one is given, and
    /// otherwise each of `topics` in turn.
    ///
    /// Read failures are written to the report. Only a failure to write the
    /// report itself is returned.
    pub async fn run(&mut self, path: Option<&str>, topics: &[String]) -> io::Result<()> {
        present::banner(&mut self.out, "CDC Data Lake Parquet Reader")?;
        writeln!(self.out)?;

        match path {
            Some(path) => match self.read_from_path(path).await {
                Ok(success) => writeln!(self.out, "\nSuccess: {}", success.message)?,
                Err(failure) => {
                    if let Some(err) = failure.as_output_error() {
                        return Err(err);
                    }
                    writeln!(self.out, "\nError: {}", failure.message)?;
                    if let Some(detail) = &failure.detail {
                        writeln!(self.out, "   Details: {detail}")?;
                    }
                }
            },
            None => {
                for topic in topics {
                    present::banner(&mut self.out, &format!("{} DATA", topic.to_uppercase()))?;
                    if let Err(failure) = self.read_topic(topic).await {
                        if let Some(err) = failure.as_output_error() {
                            return Err(err);
                        }
                        writeln!(self.out, "Error: {}", failure.message)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Lists the Parquet files of `topic` and prints the first few.
    ///
    /// The returned list holds every file, not just the printed ones.
    pub async fn list_parquet_files(&mut self, topic: &str) -> Outcome<Vec<String>> {
        let prefix = format!("{TOPICS_PREFIX}{topic}/");
        let files: Vec<String> = match self.store.list(&prefix).await {
            Ok(keys) => keys.into_iter().filter(|key| is_parquet(key)).collect(),
            Err(err) => {
                warn!(topic, "listing failed: {err}");
                return Err(Failure::with_cause(
                    format!("Failed to list files for topic: {topic}"),
                    err,
                ));
            }
        };

        writeln!(self.out, "\n{topic} files: {} found", files.len())?;
        for (i, file) in files.iter().take(LIST_PREVIEW_LIMIT).enumerate() {
            writeln!(self.out, "  {}. {file}", i + 1)?;
        }
        if files.len() > LIST_PREVIEW_LIMIT {
            writeln!(self.out, "  ... and {} more", files.len() - LIST_PREVIEW_LIMIT)?;
        }

        Ok(Success::new(format!("Found {} files", files.len()), files))
    }

    /// Fetches, decodes, and unwraps the file at `key`, then prints it.
    pub async fn read_parquet(&mut self, key: &str) -> Outcome<Table> {
        let table = match self.fetch_table(key).await {
            Ok(table) => table,
            Err(err) => {
                warn!(key, "skipping unreadable file: {err}");
                writeln!(self.out, "Error reading {key}: {err}")?;
                return Err(Failure::with_cause(format!("Failed to read file: {key}"), err));
            }
        };

        present::banner(&mut self.out, &format!("File: {key}"))?;
        present::print_table(&mut self.out, &table, &format!("Data from {}", file_name(key)))?;

        Ok(Success::new("File read successfully", table))
    }

    async fn fetch_table(&self, key: &str) -> Result<Table, ReadError> {
        let buf = self.store.get(key).await?;
        debug!(key, len = buf.len(), "fetched object");
        let table = decode_parquet(buf)?;
        Ok(cdc::extract_after(table)?)
    }

    /// Reads up to [`MAX_FILES_PER_READ`] of `keys`, in order, returning the
    /// non-empty tables. Files that fail to read are skipped.
    pub async fn read_files(&mut self, keys: &[String]) -> Result<Vec<Table>, Failure> {
        if keys.len() > MAX_FILES_PER_READ {
            info!(
                "reading the first {MAX_FILES_PER_READ} of {} files",
                keys.len()
            );
        }

        let mut tables = Vec::new();
        for key in keys.iter().take(MAX_FILES_PER_READ) {
            match self.read_parquet(key).await {
                Ok(Success { data, .. }) if !data.is_empty() => tables.push(data),
                Ok(_) => debug!(key, "skipping empty file"),
                Err(failure) if failure.kind == FailureKind::Output => return Err(failure),
                Err(_) => {}
            }
        }
        Ok(tables)
    }

    /// Reads and combines the files of `topic`, then prints the combined
    /// table and, if it holds PII, the masking verification.
    pub async fn read_topic(&mut self, topic: &str) -> Outcome<Table> {
        let files = self.list_parquet_files(topic).await?.data;
        if files.is_empty() {
            return Err(Failure::new(
                FailureKind::Empty,
                format!("No files found for topic: {topic}"),
            ));
        }

        let tables = self.read_files(&files).await?;
        let combined = combine(tables)?.data;
        present::print_table(
            &mut self.out,
            &combined,
            &format!("Combined Data for {}", topic.to_uppercase()),
        )?;

        if let Some(report) = MaskingReport::new(&combined) {
            present::print_sample_rows(&mut self.out, &combined)?;
            present::print_masking_status(&mut self.out, &report)?;
        }

        Ok(Success::new(
            format!("Successfully processed {} files", files.len()),
            combined,
        ))
    }

    /// Reads and combines the files matched by `path` (see
    /// [`LakeReader::resolve_path`]), then prints the combined table and, if
    /// it holds PII, the masking verification.
    pub async fn read_from_path(&mut self, path: &str) -> Outcome<Table> {
        let ResolvedPath {
            files,
            display_path,
        } = self.resolve_path(path).await?.data;

        present::banner(
            &mut self.out,
            &format!("Reading {} file(s) from: {display_path}", files.len()),
        )?;

        let tables = self.read_files(&files).await?;
        let combined = combine(tables)?.data;
        present::print_table(
            &mut self.out,
            &combined,
            &format!("Combined Data - Total Rows: {}", combined.num_rows()),
        )?;

        if let Some(report) = MaskingReport::new(&combined) {
            present::print_sample_fields(&mut self.out, &report)?;
            present::print_masking_status(&mut self.out, &report)?;
        }

        Ok(Success::new(
            format!("Successfully read {} files", files.len()),
            combined,
        ))
    }
}

/// The last component of an object key.
fn file_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
