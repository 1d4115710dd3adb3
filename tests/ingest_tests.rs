use std::sync::Arc;

use bytes::Bytes;
use chrono::{Duration, Utc};
use patterns_matter::ingest::{IngestError, Ingestor, UploadRequest};
use patterns_matter::object_store::{LocalStore, ObjectStore};
use patterns_matter::storage::models::{SubCategory, Value};
use patterns_matter::storage::Database;

const SAMPLE_CSV: &[u8] = b"material,bandgap\nSi,1.12\nGaAs,1.42\nGe,0.66\n";

struct Harness {
    _dir: tempfile::TempDir,
    db: Database,
    store: Arc<LocalStore>,
    ingestor: Ingestor,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("data").join("test.db")).unwrap();
    let store = Arc::new(LocalStore::new(dir.path().join("uploads")).unwrap());
    let ingestor = Ingestor::new(db.clone(), store.clone());
    Harness {
        _dir: dir,
        db,
        store,
        ingestor,
    }
}

fn upload(property: &str, sub_category: SubCategory, filename: &str, data: &[u8]) -> UploadRequest {
    UploadRequest {
        property: property.to_string(),
        sub_category,
        filename: filename.to_string(),
        data: Bytes::copy_from_slice(data),
    }
}

/// Version 1.0 NPY file around a header dict and raw little-endian data.
fn npy_file(header: &str, data: &[u8]) -> Vec<u8> {
    let mut dict = header.to_string();
    let unpadded = 10 + dict.len() + 1;
    dict.push_str(&" ".repeat((64 - unpadded % 64) % 64));
    dict.push('\n');

    let mut out = b"\x93NUMPY\x01\x00".to_vec();
    out.extend_from_slice(&(dict.len() as u16).to_le_bytes());
    out.extend_from_slice(dict.as_bytes());
    out.extend_from_slice(data);
    out
}

#[tokio::test]
async fn test_upload_dataset_catalogs_and_imports() {
    let h = harness();
    let before = Utc::now();

    let outcome = h
        .ingestor
        .upload(upload("bandgap", SubCategory::Dataset, "sample.csv", SAMPLE_CSV), true)
        .await
        .unwrap();

    assert_eq!(outcome.key, "bandgap/dataset/sample.csv");
    assert!(outcome.cataloged);
    assert_eq!(outcome.table.as_deref(), Some("sample_csv"));
    assert!(outcome.import_error.is_none());
    assert!(h.store.exists("bandgap/dataset/sample.csv").await.unwrap());

    let entries = h.db.list_all().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].property, "bandgap");
    assert_eq!(entries[0].sub_category, SubCategory::Dataset);
    assert_eq!(entries[0].filename, "sample.csv");
    assert!(entries[0].uploaded_at >= before - Duration::seconds(1));
    assert!(entries[0].uploaded_at <= Utc::now());

    let table = h.db.read_table("sample_csv").unwrap().unwrap();
    assert_eq!(table.columns.len(), 2);
    assert_eq!(table.rows.len(), 3);
}

#[tokio::test]
async fn test_upload_disallowed_extension_is_rejected_without_mutation() {
    let h = harness();

    let err = h
        .ingestor
        .upload(upload("bandgap", SubCategory::Results, "chart.txt", b"hello"), true)
        .await
        .unwrap_err();

    match err {
        IngestError::Validation(msg) => assert!(msg.contains("JPG, PNG, GIF, PDF, or DOCX"), "{msg}"),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(h.store.list().await.unwrap().is_empty());
    assert!(h.db.list_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_non_admin_cannot_mutate() {
    let h = harness();

    let err = h
        .ingestor
        .upload(upload("bandgap", SubCategory::Dataset, "sample.csv", SAMPLE_CSV), false)
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::Forbidden));
    assert!(h.store.list().await.unwrap().is_empty());

    assert!(matches!(
        h.ingestor
            .delete("bandgap", SubCategory::Dataset, "sample.csv", false)
            .await,
        Err(IngestError::Forbidden)
    ));
    assert!(matches!(
        h.ingestor.delete_clip(1, false).await,
        Err(IngestError::Forbidden)
    ));
}

#[tokio::test]
async fn test_reupload_keeps_one_catalog_row() {
    let h = harness();

    h.ingestor
        .upload(upload("bandgap", SubCategory::Dataset, "sample.csv", SAMPLE_CSV), true)
        .await
        .unwrap();
    let second = h
        .ingestor
        .upload(
            upload("bandgap", SubCategory::Dataset, "sample.csv", b"material,bandgap\nC,5.5\n"),
            true,
        )
        .await
        .unwrap();

    assert!(!second.cataloged);
    assert_eq!(h.db.list_all().unwrap().len(), 1);
    // Last writer wins for the bytes and the table
    assert_eq!(h.db.read_table("sample_csv").unwrap().unwrap().rows.len(), 1);
}

#[tokio::test]
async fn test_unreadable_dataset_is_stored_with_import_error() {
    let h = harness();

    let outcome = h
        .ingestor
        .upload(upload("bandgap", SubCategory::Dataset, "broken.npy", b"not numpy"), true)
        .await
        .unwrap();

    assert!(outcome.table.is_none());
    assert!(outcome.import_error.is_some());
    assert!(h.store.exists("bandgap/dataset/broken.npy").await.unwrap());
    assert_eq!(h.db.list_all().unwrap().len(), 1);
    assert!(h.db.read_table("broken_npy").unwrap().is_none());
}

#[tokio::test]
async fn test_delete_removes_file_and_exactly_one_row() {
    let h = harness();
    for name in ["a.csv", "b.csv"] {
        h.ingestor
            .upload(upload("bandgap", SubCategory::Dataset, name, SAMPLE_CSV), true)
            .await
            .unwrap();
    }

    let outcome = h
        .ingestor
        .delete("bandgap", SubCategory::Dataset, "a.csv", true)
        .await
        .unwrap();
    assert!(outcome.file_removed);
    assert!(outcome.entry_removed);
    assert!(!h.store.exists("bandgap/dataset/a.csv").await.unwrap());

    let remaining = h.db.list_all().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].filename, "b.csv");

    // Second delete is a no-op
    let again = h
        .ingestor
        .delete("bandgap", SubCategory::Dataset, "a.csv", true)
        .await
        .unwrap();
    assert!(!again.file_removed);
    assert!(!again.entry_removed);
}

#[tokio::test]
async fn test_reimport_is_idempotent() {
    let h = harness();
    h.ingestor
        .upload(upload("bandgap", SubCategory::Dataset, "sample.csv", SAMPLE_CSV), true)
        .await
        .unwrap();
    let first = h.db.read_table("sample_csv").unwrap().unwrap();

    let summary = h
        .ingestor
        .import_dataset("bandgap/dataset/sample.csv", true)
        .await
        .unwrap();
    assert_eq!(summary.table, "sample_csv");
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.columns, 2);

    let second = h.db.read_table("sample_csv").unwrap().unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_import_missing_file_is_not_found() {
    let h = harness();
    assert!(matches!(
        h.ingestor
            .import_dataset("bandgap/dataset/ghost.csv", true)
            .await,
        Err(IngestError::NotFound(_))
    ));
    assert!(matches!(
        h.ingestor.preview("bandgap/results/chart.png").await,
        Err(IngestError::Validation(_))
    ));
}

#[tokio::test]
async fn test_preview_does_not_persist() {
    let h = harness();
    h.store
        .put("bandgap/dataset/sample.csv", Bytes::from_static(SAMPLE_CSV))
        .await
        .unwrap();

    let table = h.ingestor.preview("bandgap/dataset/sample.csv").await.unwrap();
    assert_eq!(table.columns, vec!["material", "bandgap"]);
    assert_eq!(table.rows[2][1], Value::Real(0.66));
    assert!(h.db.read_table("sample_csv").unwrap().is_none());
}

#[tokio::test]
async fn test_reconcile_backfills_catalog_and_tables() {
    let h = harness();
    h.store
        .put(
            "formation_energy/dataset/x.csv",
            Bytes::from_static(b"compound,energy\nNaCl,-4.2\nMgO,-6.0\n"),
        )
        .await
        .unwrap();

    let stats = h.ingestor.reconcile().await.unwrap();
    assert_eq!(stats.seen, 1);
    assert_eq!(stats.imported, 1);
    assert_eq!(stats.cataloged, 1);

    let entries = h.db.list_all().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].property, "formation_energy");
    assert_eq!(entries[0].sub_category, SubCategory::Dataset);
    assert_eq!(entries[0].filename, "x.csv");

    let table = h.db.read_table("x_csv").unwrap().unwrap();
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[1][1], Value::Real(-6.0));

    // A second scan re-imports but adds no catalog rows
    let again = h.ingestor.reconcile().await.unwrap();
    assert_eq!(again.imported, 1);
    assert_eq!(again.cataloged, 0);
    assert_eq!(h.db.list_all().unwrap().len(), 1);
}

#[tokio::test]
async fn test_reconcile_skips_odd_layouts_and_survives_bad_files() {
    let h = harness();
    let files: &[(&str, &[u8])] = &[
        ("bandgap/dataset/good.csv", SAMPLE_CSV),
        ("bandgap/dataset/bad.npy", b"garbage"),
        ("bandgap/results/plot.png", b"png"),
        ("loose.csv", b"a\n1\n"),
        ("bandgap/extra/deep/z.pdf", b"pdf"),
        ("bandgap/drafts/notes.pdf", b"pdf"),
        ("clips/theme.mp3", b"mp3"),
        ("bandgap/dataset/readme.txt", b"text"),
    ];
    for (key, data) in files {
        h.store.put(key, Bytes::copy_from_slice(data)).await.unwrap();
    }

    let stats = h.ingestor.reconcile().await.unwrap();
    assert_eq!(stats.seen, 8);
    assert_eq!(stats.imported, 2); // good.csv, loose.csv
    assert_eq!(stats.import_failures, 1); // bad.npy
    assert_eq!(stats.cataloged, 3); // good.csv, bad.npy, plot.png
    assert_eq!(stats.skipped, 4); // loose.csv, deep, drafts, readme.txt

    let mut cataloged: Vec<String> = h
        .db
        .list_all()
        .unwrap()
        .into_iter()
        .map(|e| format!("{}/{}/{}", e.property, e.sub_category, e.filename))
        .collect();
    cataloged.sort();
    assert_eq!(
        cataloged,
        vec![
            "bandgap/dataset/bad.npy",
            "bandgap/dataset/good.csv",
            "bandgap/results/plot.png",
        ]
    );
    assert!(h.db.read_table("good_csv").unwrap().is_some());
    assert!(h.db.read_table("loose_csv").unwrap().is_some());
}

#[tokio::test]
async fn test_reconcile_survives_npy_with_impossible_sizes() {
    let h = harness();
    let wide_unicode = npy_file(
        "{'descr': '<U4611686018427387904', 'fortran_order': False, 'shape': (1,), }",
        &[0; 16],
    );
    let zero_width = npy_file(
        "{'descr': '|S0', 'fortran_order': False, 'shape': (1000000000000000000,), }",
        &[],
    );
    h.store
        .put("bandgap/dataset/wide.npy", Bytes::from(wide_unicode))
        .await
        .unwrap();
    h.store
        .put("bandgap/dataset/empty.npy", Bytes::from(zero_width))
        .await
        .unwrap();
    h.store
        .put("bandgap/dataset/good.csv", Bytes::from_static(SAMPLE_CSV))
        .await
        .unwrap();

    let stats = h.ingestor.reconcile().await.unwrap();
    assert_eq!(stats.seen, 3);
    assert_eq!(stats.imported, 1);
    assert_eq!(stats.import_failures, 2);
    assert_eq!(stats.cataloged, 3);
    assert!(h.db.read_table("good_csv").unwrap().is_some());
    assert!(h.db.read_table("wide_npy").unwrap().is_none());
}

#[tokio::test]
async fn test_npy_upload_imports_matrix() {
    let h = harness();
    let mut data = Vec::new();
    for v in [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0] {
        data.extend_from_slice(&v.to_le_bytes());
    }
    let file = npy_file(
        "{'descr': '<f8', 'fortran_order': False, 'shape': (3, 2), }",
        &data,
    );

    let outcome = h
        .ingestor
        .upload(upload("melting_point", SubCategory::Dataset, "grid.npy", &file), true)
        .await
        .unwrap();
    assert_eq!(outcome.table.as_deref(), Some("grid_npy"));

    let table = h.db.read_table("grid_npy").unwrap().unwrap();
    assert_eq!(table.columns, vec!["0", "1"]);
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[2], vec![Value::Real(5.0), Value::Real(6.0)]);
}

#[tokio::test]
async fn test_clip_upload_and_delete() {
    let h = harness();

    let clip = h
        .ingestor
        .upload_clip("My Theme.mp3", Bytes::from_static(b"ID3"), "Theme", Some("  "), true)
        .await
        .unwrap();
    assert_eq!(clip.filename, "clips/My_Theme.mp3");
    assert_eq!(clip.description, None);
    assert!(h.store.exists("clips/My_Theme.mp3").await.unwrap());

    let err = h
        .ingestor
        .upload_clip("song.flac", Bytes::from_static(b"x"), "Song", None, true)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("MP3, WAV, M4A, OGG, or MP4"));

    assert!(h.ingestor.delete_clip(clip.id, true).await.unwrap());
    assert!(!h.store.exists("clips/My_Theme.mp3").await.unwrap());
    assert!(h.db.list_clips().unwrap().is_empty());
    assert!(!h.ingestor.delete_clip(clip.id, true).await.unwrap());
}
