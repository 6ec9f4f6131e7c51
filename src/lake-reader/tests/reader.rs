// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! End-to-end tests of [`LakeReader`] against an in-memory store.

use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, StringArray, StructArray};
use arrow::buffer::NullBuffer;
use arrow::datatypes::{DataType, Field, Fields, Schema};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use cdc_arrow_util::{ColumnType, Datum};
use cdc_lake_reader::reader::MAX_FILES_PER_READ;
use cdc_lake_reader::resolve::ResolvedPath;
use cdc_lake_reader::store::MemStore;
use cdc_lake_reader::{FailureKind, LakeReader};
use parquet::arrow::ArrowWriter;

/// A customer row state: `(id, email, phone, address)`.
type Customer<'a> = (i64, &'a str, &'a str, &'a str);

fn write_parquet(batch: RecordBatch) -> Bytes {
    let mut buf = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buf, batch.schema(), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    Bytes::from(buf)
}

/// Encodes Debezium envelopes for the customers table. A `None` row state is
/// a delete, whose `after` is null.
fn customer_envelopes(events: &[(Option<Customer>, &str, i64)]) -> Bytes {
    let fields = Fields::from(vec![
        Field::new("id", DataType::Int64, true),
        Field::new("email", DataType::Utf8, true),
        Field::new("phone", DataType::Utf8, true),
        Field::new("address", DataType::Utf8, true),
    ]);
    let afters: Vec<_> = events.iter().map(|(after, _, _)| *after).collect();
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(
            afters.iter().map(|a| a.map(|c| c.0)).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            afters.iter().map(|a| a.map(|c| c.1)).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            afters.iter().map(|a| a.map(|c| c.2)).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            afters.iter().map(|a| a.map(|c| c.3)).collect::<Vec<_>>(),
        )),
    ];
    let valid = NullBuffer::from(afters.iter().map(Option::is_some).collect::<Vec<_>>());
    let after = StructArray::try_new(fields.clone(), columns, Some(valid)).unwrap();

    let schema = Arc::new(Schema::new(vec![
        Field::new("after", DataType::Struct(fields), true),
        Field::new("op", DataType::Utf8, false),
        Field::new("ts_ms", DataType::Int64, false),
    ]));
    let ops: Vec<&str> = events.iter().map(|(_, op, _)| *op).collect();
    let ts: Vec<i64> = events.iter().map(|(_, _, ts)| *ts).collect();
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(after),
            Arc::new(StringArray::from(ops)),
            Arc::new(Int64Array::from(ts)),
        ],
    )
    .unwrap();
    write_parquet(batch)
}

/// Encodes a plain (non-CDC) products table.
fn products(rows: &[(i64, &str)]) -> Bytes {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, false),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(
                rows.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                rows.iter().map(|(_, name)| *name).collect::<Vec<_>>(),
            )),
        ],
    )
    .unwrap();
    write_parquet(batch)
}

fn lake() -> MemStore {
    let mut store = MemStore::new();
    store.insert(
        "topics/customers/partition=0/customers+0+0000000000.parquet",
        customer_envelopes(&[
            (
                Some((1, "john***@MASKED.com", "***-***-1234", "REDACTED")),
                "r",
                1_700_000_000_000,
            ),
            (
                Some((2, "jane***@MASKED.com", "***-***-9876", "REDACTED")),
                "c",
                1_700_000_001_000,
            ),
        ]),
    );
    store.insert(
        "topics/customers/partition=0/customers+0+0000000002.parquet",
        customer_envelopes(&[(None, "d", 1_700_000_002_000)]),
    );
    store.insert(
        "topics/customers/partition=0/customers+0+0000000003.parquet",
        Bytes::from_static(b"truncated upload"),
    );
    store.insert(
        "topics/products/partition=0/products+0+0000000000.parquet",
        products(&[(10, "widget"), (11, "gadget")]),
    );
    store.insert("topics/products/partition=0/_SUCCESS", "");
    store
}

fn output<S: cdc_lake_reader::ObjectStore>(reader: LakeReader<S, Vec<u8>>) -> String {
    String::from_utf8(reader.into_output()).unwrap()
}

#[tokio::test]
async fn read_topic_unwraps_and_combines() {
    let mut reader = LakeReader::new(lake(), Vec::new());
    let success = reader.read_topic("customers").await.unwrap();

    assert_eq!(success.message, "Successfully processed 3 files");
    let combined = &success.data;
    assert_eq!(combined.num_rows(), 3);
    assert_eq!(
        combined.column_names().collect::<Vec<_>>(),
        vec![
            "id",
            "email",
            "phone",
            "address",
            "_cdc_operation",
            "_cdc_timestamp"
        ]
    );
    assert_eq!(
        combined.column("id").unwrap().values(),
        &[Datum::Int(1), Datum::Int(2), Datum::Null]
    );
    assert_eq!(
        combined.column("_cdc_operation").unwrap().values(),
        &[
            Datum::String("r".into()),
            Datum::String("c".into()),
            Datum::String("d".into())
        ]
    );
    assert_eq!(
        combined.column("_cdc_timestamp").unwrap().typ(),
        ColumnType::Timestamp
    );

    let text = output(reader);
    assert!(text.contains("\ncustomers files: 3 found\n"));
    assert!(text.contains("  1. topics/customers/partition=0/customers+0+0000000000.parquet\n"));
    assert!(text.contains("File: topics/customers/partition=0/customers+0+0000000000.parquet"));
    assert!(text.contains("Data from customers+0+0000000000.parquet"));
    assert!(text.contains(
        "Error reading topics/customers/partition=0/customers+0+0000000003.parquet: "
    ));
    assert!(text.contains("Combined Data for CUSTOMERS"));
    assert!(text.contains("Shape: 3 rows × 6 columns"));
    assert!(text.contains("  _cdc_timestamp                 timestamp\n"));
    assert!(text.contains("\nSample Values:\n"));
    assert!(text.contains("Masking Status:"));
    assert!(text.contains("  Email     YES\n"));
    assert!(text.contains("  Phone     YES\n"));
    assert!(text.contains("Address     YES\n"));
}

#[tokio::test]
async fn empty_topic() {
    let mut reader = LakeReader::new(lake(), Vec::new());
    let failure = reader.read_topic("orders").await.unwrap_err();
    assert_eq!(failure.kind, FailureKind::Empty);
    assert_eq!(failure.message, "No files found for topic: orders");
    assert!(output(reader).contains("\norders files: 0 found\n"));
}

#[tokio::test]
async fn unreachable_store() {
    let mut store = lake();
    store.set_unavailable(true);
    let mut reader = LakeReader::new(store, Vec::new());

    let failure = reader.read_topic("customers").await.unwrap_err();
    assert_eq!(failure.kind, FailureKind::Storage);
    assert_eq!(failure.message, "Failed to list files for topic: customers");
    assert_eq!(failure.detail.as_deref(), Some("connection refused"));

    let failure = reader.read_from_path("customers").await.unwrap_err();
    assert_eq!(failure.kind, FailureKind::Storage);
    assert_eq!(failure.message, "Failed to read from path: customers");
}

#[tokio::test]
async fn at_most_twenty_files_per_read() {
    let mut store = MemStore::new();
    for i in 0..25 {
        store.insert(
            format!("topics/orders/orders+0+{i:010}.parquet"),
            products(&[(i, "order")]),
        );
    }
    let mut reader = LakeReader::new(store, Vec::new());

    let success = reader.read_topic("orders").await.unwrap();
    assert_eq!(success.data.num_rows(), MAX_FILES_PER_READ);
    assert_eq!(success.message, "Successfully processed 25 files");
    assert_eq!(reader.store().fetched().len(), MAX_FILES_PER_READ);
    assert_eq!(
        reader.store().fetched().last().map(String::as_str),
        Some("topics/orders/orders+0+0000000019.parquet")
    );

    let text = output(reader);
    assert!(text.contains("  10. topics/orders/orders+0+0000000009.parquet\n"));
    assert!(!text.contains("  11. "));
    assert!(text.contains("  ... and 15 more\n"));
}

#[tokio::test]
async fn resolves_bare_file_names_by_suffix() {
    let mut reader = LakeReader::new(lake(), Vec::new());
    let resolved = reader
        .resolve_path("products+0+0000000000.parquet")
        .await
        .unwrap()
        .data;
    assert_eq!(
        resolved,
        ResolvedPath {
            files: vec!["topics/products/partition=0/products+0+0000000000.parquet".into()],
            display_path: "products+0+0000000000.parquet".into(),
        }
    );
    assert!(output(reader).contains("Searching for file: products+0+0000000000.parquet\n"));
}

#[tokio::test]
async fn missing_file_name_lists_hints() {
    let mut reader = LakeReader::new(lake(), Vec::new());
    let failure = reader.resolve_path("users.parquet").await.unwrap_err();
    assert_eq!(failure.kind, FailureKind::NotFound);
    assert_eq!(failure.message, "File not found: users.parquet");
    assert!(reader.store().fetched().is_empty());

    let text = output(reader);
    assert!(text.contains("File not found: users.parquet\n\nAvailable files (first 10):\n"));
    assert!(text.contains("  4. topics/products/partition=0/products+0+0000000000.parquet\n"));
    assert!(!text.contains("_SUCCESS"));
}

#[tokio::test]
async fn resolves_wildcards_keys_and_folders() {
    let mut reader = LakeReader::new(lake(), Vec::new());

    let resolved = reader.resolve_path("customers/*").await.unwrap().data;
    assert_eq!(resolved.files.len(), 3);
    assert_eq!(resolved.display_path, "customers/*");

    let resolved = reader
        .resolve_path("topics/products/*")
        .await
        .unwrap()
        .data;
    assert_eq!(
        resolved.files,
        vec!["topics/products/partition=0/products+0+0000000000.parquet"]
    );

    let resolved = reader
        .resolve_path("topics/orders/file1.parquet")
        .await
        .unwrap()
        .data;
    assert_eq!(resolved.files, vec!["topics/orders/file1.parquet"]);
    assert_eq!(resolved.display_path, "topics/orders/file1.parquet");

    let resolved = reader.resolve_path("products").await.unwrap().data;
    assert_eq!(
        resolved.files,
        vec!["topics/products/partition=0/products+0+0000000000.parquet"]
    );
    assert_eq!(resolved.display_path, "topics/products");
}

#[tokio::test]
async fn path_read_of_missing_key() {
    let mut reader = LakeReader::new(lake(), Vec::new());
    let failure = reader
        .read_from_path("orders/file1.parquet")
        .await
        .unwrap_err();
    assert_eq!(failure.kind, FailureKind::Empty);
    assert_eq!(failure.message, "No data found in files");

    let text = output(reader);
    assert!(text.contains("Reading 1 file(s) from: topics/orders/file1.parquet\n"));
    assert!(text.contains(
        "Error reading topics/orders/file1.parquet: object not found: topics/orders/file1.parquet\n"
    ));
}

#[tokio::test]
async fn path_read_of_plain_parquet() {
    let mut reader = LakeReader::new(lake(), Vec::new());
    let success = reader.read_from_path("products").await.unwrap();
    assert_eq!(success.message, "Successfully read 1 files");
    assert_eq!(
        success.data.column_names().collect::<Vec<_>>(),
        vec!["id", "name"]
    );

    let text = output(reader);
    assert!(text.contains("Combined Data - Total Rows: 2\n"));
    assert!(!text.contains("PII Masking Verification"));
}

#[tokio::test]
async fn path_read_reports_masking() {
    let mut reader = LakeReader::new(lake(), Vec::new());
    let success = reader.read_from_path("customers/*").await.unwrap();
    assert_eq!(success.message, "Successfully read 3 files");

    let text = output(reader);
    assert!(text.contains("Combined Data - Total Rows: 3\n"));
    assert!(text.contains("  Field"));
    assert!(text.contains("Sample Values"));
    assert!(text.contains("[john***@MASKED.com, jane***@MASKED.com, null]"));
    assert!(text.contains("  Email     YES\n"));
}

#[tokio::test]
async fn run_reads_every_topic() {
    let mut reader = LakeReader::new(lake(), Vec::new());
    let topics: Vec<String> = ["customers", "products", "orders"]
        .iter()
        .map(|t| t.to_string())
        .collect();
    reader.run(None, &topics).await.unwrap();

    let text = output(reader);
    assert!(text.starts_with(&format!(
        "\n{rule}\nCDC Data Lake Parquet Reader\n{rule}\n\n",
        rule = "=".repeat(80)
    )));
    let customers = text.find("CUSTOMERS DATA").unwrap();
    let products = text.find("PRODUCTS DATA").unwrap();
    let orders = text.find("ORDERS DATA").unwrap();
    assert!(customers < products && products < orders);
    assert!(text.contains("Combined Data for PRODUCTS"));
    assert!(text.ends_with("Error: No files found for topic: orders\n"));
}

#[tokio::test]
async fn run_reports_path_results() {
    let mut reader = LakeReader::new(lake(), Vec::new());
    reader.run(Some("products"), &[]).await.unwrap();
    assert!(output(reader).ends_with("\nSuccess: Successfully read 1 files\n"));

    let mut reader = LakeReader::new(lake(), Vec::new());
    reader.run(Some("users.parquet"), &[]).await.unwrap();
    assert!(output(reader).ends_with("\nError: File not found: users.parquet\n"));

    let mut store = lake();
    store.set_unavailable(true);
    let mut reader = LakeReader::new(store, Vec::new());
    reader.run(Some("products"), &[]).await.unwrap();
    assert!(output(reader).ends_with(
        "\nError: Failed to read from path: products\n   Details: connection refused\n"
    ));
}
