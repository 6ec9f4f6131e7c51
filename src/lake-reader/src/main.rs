// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Prints the contents of the CDC data lake.
//!
//! With no arguments, reads every default topic. Otherwise reads the given
//! path, which may be a bare file name (`users.parquet`), a wildcard
//! (`customers/*`), a full key (`topics/orders/file1.parquet`), or a folder
//! (`products`).

use std::io;
use std::process;

use anyhow::Context;
use cdc_lake_reader::LakeConfig;
use cdc_lake_reader::LakeReader;
use cdc_lake_reader::store::S3Store;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static DEFAULT_ENV_FILTER: &str = "read_parquet=warn,cdc_lake_reader=warn,cdc_arrow_util=warn";

#[derive(Parser, Debug)]
#[clap(name = "read-parquet", about = "Inspect CDC Parquet files in the data lake.")]
struct Args {
    /// A file name, wildcard pattern, object key, or folder to read. Reads
    /// every default topic when omitted.
    path: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    // The report goes to stdout, so keep log lines on stderr.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_ENV_FILTER));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .without_time();
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init();

    if let Err(err) = run(args, LakeConfig::default()).await {
        error!("read-parquet: fatal: {err:#}");
        process::exit(1);
    }
}

async fn run(args: Args, config: LakeConfig) -> Result<(), anyhow::Error> {
    let store = S3Store::open(&config)
        .await
        .context("connecting to object storage")?;
    let mut reader = LakeReader::new(store, io::stdout().lock());
    reader
        .run(args.path.as_deref(), &config.topics)
        .await
        .context("writing report")?;
    Ok(())
}
