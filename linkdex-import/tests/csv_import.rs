use std::io::Write;

use linkdex_db::*;
use linkdex_import::{ImportError, import_resources, import_upload};

fn setup_db() -> rusqlite::Connection {
    let conn = open_memory().unwrap();
    create_type(&conn, "Video").unwrap();
    create_type(&conn, "Article").unwrap();
    conn
}

fn count_resources(conn: &rusqlite::Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM resources", [], |r| r.get(0))
        .unwrap()
}

#[test]
fn import_full_rows() {
    let conn = setup_db();
    let csv = "\
Name,Description,URL,Type,Internal,Date Created,Tags,Obsolete
Rust Book,Official guide,https://doc.rust-lang.org/book,Article,false,2024-01-01,\"rust, docs\",false
Deploy Video,Legacy walkthrough,https://example.com/deploy,Video,true,2023-06-01 09:30:00,deploy,1";

    let summary = import_resources(&conn, csv.as_bytes(), None).unwrap();
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.errors, 0);
    assert!(summary.error_details.is_empty());

    let views = list_resources(&conn, &ResourceFilter::default()).unwrap();
    assert_eq!(views.len(), 2);

    let deploy = views
        .iter()
        .find(|v| v.resource.name == "Deploy Video")
        .unwrap();
    assert_eq!(deploy.type_name.as_deref(), Some("Video"));
    assert!(deploy.resource.internal);
    assert!(deploy.resource.obsolete);
    assert_eq!(deploy.resource.date_created, "2023-06-01T09:30:00+00:00");
    assert_eq!(deploy.resource.tags, "deploy");
}

#[test]
fn row_failure_does_not_abort_batch() {
    let conn = setup_db();
    let csv = "\
Name,Description,URL,Type,Internal,Date Created,Tags,Obsolete
First,ok,https://example.com/1,,false,2024-01-01,,false
,missing name,https://example.com/2,,false,2024-01-01,,false
Third,ok,https://example.com/3,,false,2024-01-01,,false";

    let summary = import_resources(&conn, csv.as_bytes(), None).unwrap();
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.error_details.len(), 1);
    assert_eq!(summary.error_details[0].row, 2);
    assert!(summary.error_details[0].message.contains("name"));

    // Exactly the two valid rows landed in storage.
    assert_eq!(count_resources(&conn), 2);
}

#[test]
fn failed_rows_keep_original_order() {
    let conn = setup_db();
    let csv = "\
Name
,
Ok One
,
Ok Two
,";

    let summary = import_resources(&conn, csv.as_bytes(), None).unwrap();
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.errors, 3);
    let rows: Vec<usize> = summary.error_details.iter().map(|e| e.row).collect();
    assert_eq!(rows, vec![1, 3, 5]);
}

#[test]
fn type_resolution_is_case_insensitive() {
    let conn = setup_db();
    let csv = "\
Name,Type
Lowercase,video
Uppercase,VIDEO
Unknown,Webinar
Empty,";

    let summary = import_resources(&conn, csv.as_bytes(), None).unwrap();
    assert_eq!(summary.imported, 4);

    let views = list_resources(&conn, &ResourceFilter::default()).unwrap();
    let type_of = |name: &str| {
        views
            .iter()
            .find(|v| v.resource.name == name)
            .unwrap()
            .type_name
            .clone()
    };
    assert_eq!(type_of("Lowercase").as_deref(), Some("Video"));
    assert_eq!(type_of("Uppercase").as_deref(), Some("Video"));
    // Unresolved names map to no type instead of failing the row.
    assert_eq!(type_of("Unknown"), None);
    assert_eq!(type_of("Empty"), None);
}

#[test]
fn missing_columns_default_and_extra_columns_are_ignored() {
    let conn = setup_db();
    let csv = "\
Color,Name,Mood
blue,Just A Name,happy";

    let summary = import_resources(&conn, csv.as_bytes(), None).unwrap();
    assert_eq!(summary.imported, 1);

    let views = list_resources(&conn, &ResourceFilter::default()).unwrap();
    let r = &views[0].resource;
    assert_eq!(r.name, "Just A Name");
    assert_eq!(r.description, "");
    assert_eq!(r.url, "");
    assert_eq!(r.tags, "");
    assert!(!r.internal);
    assert!(!r.obsolete);
    assert_eq!(r.type_id, None);
    // Missing Date Created defaults to now
    assert!(!r.date_created.is_empty());
}

#[test]
fn structural_parse_error_aborts_pipeline() {
    let conn = setup_db();
    // Invalid UTF-8 in a data row is a structural failure, not a row error.
    let mut bytes = b"Name,Description\n".to_vec();
    bytes.extend_from_slice(b"Bad Row,\xff\xfe\n");

    let err = import_resources(&conn, bytes.as_slice(), None).unwrap_err();
    assert!(matches!(err, ImportError::Parse(_)));

    // Nothing was written before the abort.
    assert_eq!(count_resources(&conn), 0);
}

#[test]
fn upload_file_is_removed_after_success() {
    let conn = setup_db();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("upload.csv");
    std::fs::write(&path, "Name\nUploaded Resource\n").unwrap();

    let summary = import_upload(&conn, &path, None).unwrap();
    assert_eq!(summary.imported, 1);
    assert!(!path.exists());
}

#[test]
fn upload_file_is_removed_after_parse_failure() {
    let conn = setup_db();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("upload.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"Name,Description\nBad Row,\xff\xfe\n").unwrap();
    drop(file);

    let err = import_upload(&conn, &path, None).unwrap_err();
    assert!(matches!(err, ImportError::Parse(_)));
    assert!(!path.exists());
}
