// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Resolution of user-supplied paths to object keys.

use std::io::Write;

use tracing::info;

use crate::outcome::{Failure, FailureKind, Outcome, Success};
use crate::reader::LakeReader;
use crate::store::{ObjectStore, StoreError};

/// The prefix under which the sink connector writes every topic.
pub const TOPICS_PREFIX: &str = "topics/";

pub const PARQUET_EXTENSION: &str = ".parquet";

/// The most keys suggested when a file name matches nothing.
pub const HINT_LIMIT: usize = 10;

pub fn is_parquet(key: &str) -> bool {
    key.ends_with(PARQUET_EXTENSION)
}

/// How a user-supplied path selects files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSpec {
    /// A bare file name such as `users.parquet`, matched against the end of
    /// every key in the lake.
    FileName(String),
    /// A pattern such as `customers/*`: every Parquet key under the prefix
    /// before the `*`.
    Wildcard { prefix: String },
    /// A single key, which is not checked for existence.
    Key(String),
    /// Every Parquet key under a folder.
    Folder(String),
}

impl PathSpec {
    /// Classifies `path`. The first matching rule wins: a bare file name, then
    /// a wildcard, then a key, then a folder.
    pub fn parse(path: &str) -> PathSpec {
        if !path.contains('/') && is_parquet(path) {
            PathSpec::FileName(path.to_owned())
        } else if let Some((before, _)) = path.split_once('*') {
            PathSpec::Wildcard {
                prefix: format!("{TOPICS_PREFIX}{}", before.replace(TOPICS_PREFIX, "")),
            }
        } else if is_parquet(path) {
            PathSpec::Key(with_topics_prefix(path))
        } else {
            PathSpec::Folder(with_topics_prefix(path))
        }
    }
}

fn with_topics_prefix(path: &str) -> String {
    if path.starts_with(TOPICS_PREFIX) {
        path.to_owned()
    } else {
        format!("{TOPICS_PREFIX}{path}")
    }
}

/// The files a path resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub files: Vec<String>,
    /// The path as shown to the user: the original path for file names and
    /// wildcards, the `topics/`-qualified path otherwise.
    pub display_path: String,
}

impl<S: ObjectStore, W: Write> LakeReader<S, W> {
    /// Resolves `path` to the object keys it names. See [`PathSpec::parse`].
    ///
    /// A file name that matches nothing fails immediately, after printing a
    /// few of the files that do exist.
    pub async fn resolve_path(&mut self, path: &str) -> Outcome<ResolvedPath> {
        let spec = PathSpec::parse(path);
        info!(?spec, "resolving {path}");

        let (files, display_path) = match spec {
            PathSpec::FileName(name) => {
                writeln!(self.out, "Searching for file: {name}")?;
                let all = self.list_keys(path, TOPICS_PREFIX).await?;
                let files: Vec<String> = all.iter().filter(|k| k.ends_with(&name)).cloned().collect();
                if files.is_empty() {
                    writeln!(self.out, "File not found: {name}")?;
                    writeln!(self.out, "\nAvailable files (first {HINT_LIMIT}):")?;
                    let available = all.iter().filter(|k| is_parquet(k)).take(HINT_LIMIT);
                    for (i, key) in available.enumerate() {
                        writeln!(self.out, "  {}. {key}", i + 1)?;
                    }
                    return Err(Failure::new(
                        FailureKind::NotFound,
                        format!("File not found: {name}"),
                    ));
                }
                (files, path.to_owned())
            }
            PathSpec::Wildcard { prefix } => {
                let files = self.list_parquet_keys(path, &prefix).await?;
                (files, path.to_owned())
            }
            PathSpec::Key(key) => (vec![key.clone()], key),
            PathSpec::Folder(prefix) => {
                let files = self.list_parquet_keys(path, &prefix).await?;
                (files, prefix)
            }
        };

        Ok(Success::new(
            format!("Resolved {} file(s)", files.len()),
            ResolvedPath {
                files,
                display_path,
            },
        ))
    }

    async fn list_keys(&self, path: &str, prefix: &str) -> Result<Vec<String>, Failure> {
        self.store
            .list(prefix)
            .await
            .map_err(|err: StoreError| {
                Failure::with_cause(format!("Failed to read from path: {path}"), err)
            })
    }

    async fn list_parquet_keys(&self, path: &str, prefix: &str) -> Result<Vec<String>, Failure> {
        let mut keys = self.list_keys(path, prefix).await?;
        keys.retain(|key| is_parquet(key));
        Ok(keys)
    }
}
