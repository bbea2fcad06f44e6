/// Reports page tests: export submission and artifact handling.
use std::fs;
use std::path::Path;

use promconsole::client::{ExportQuery, Method, MockTransport, EXPORT_PATH};
use promconsole::notify::{BannerBoard, NotificationSurface};
use promconsole::page::{ActionOutcome, ExportPage, ExportRequest};
use serde_json::json;

fn request(format: &str, dir: &Path) -> ExportRequest {
    ExportRequest {
        query: ExportQuery {
            expr: "up".to_string(),
            start: "0".to_string(),
            end: "10".to_string(),
            step: "5".to_string(),
            timestamp_format: "rfc3339".to_string(),
            replace_fields: false,
        },
        format: format.to_string(),
        output_dir: dir.to_path_buf(),
    }
}

fn page() -> ExportPage<MockTransport, BannerBoard> {
    ExportPage::new(MockTransport::new(), BannerBoard::default())
}

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn csv_export_is_written_as_data_csv() {
    let dir = tempfile::tempdir().unwrap();
    let mut page = page();
    let csv = "timestamp,value\n2024-01-30T00:00:00.000+00:00,1\n";
    page.api()
        .transport()
        .respond(Method::Post, EXPORT_PATH, 200, csv);

    assert!(page.submit(&request("csv", dir.path())).is_completed());

    let sent = page.api().transport().last(Method::Post, EXPORT_PATH).unwrap();
    assert_eq!(sent.query, vec![("format".to_string(), "csv".to_string())]);
    let body: serde_json::Value = serde_json::from_str(&sent.body_text().unwrap()).unwrap();
    assert_eq!(
        body,
        json!({
            "expr": "up", "start": "0", "end": "10", "step": "5",
            "timestamp_format": "rfc3339", "replace_fields": false
        })
    );

    let artifact = dir.path().join("data.csv");
    assert_eq!(page.artifact(), Some(artifact.as_path()));
    assert_eq!(fs::read_to_string(&artifact).unwrap(), csv);
    assert_eq!(dir_entries(dir.path()), vec!["data.csv"]);
    assert!(!page.surface().is_loading());
}

#[test]
fn json_export_uses_json_extension() {
    let dir = tempfile::tempdir().unwrap();
    let mut page = page();
    page.api()
        .transport()
        .respond(Method::Post, EXPORT_PATH, 200, "[]");

    page.submit(&request("json", dir.path()));

    assert_eq!(dir_entries(dir.path()), vec!["data.json"]);
}

#[test]
fn rejected_export_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut page = page();
    page.api()
        .transport()
        .respond(Method::Post, EXPORT_PATH, 500, "boom");

    assert_eq!(page.submit(&request("csv", dir.path())), ActionOutcome::Failed);

    assert!(dir_entries(dir.path()).is_empty());
    assert!(page.artifact().is_none());
    assert_eq!(page.surface().errors(), vec!["Error: Internal Server Error"]);
}

#[test]
fn backend_error_text_is_shown_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let mut page = page();
    page.api().transport().respond_json(
        Method::Post,
        EXPORT_PATH,
        400,
        &json!({"status": "error", "error": "bad_data: invalid parameter \"query\""}),
    );

    page.submit(&request("csv", dir.path()));

    assert_eq!(
        page.surface().errors(),
        vec!["bad_data: invalid parameter \"query\""]
    );
}

#[test]
fn unsupported_format_is_rejected_locally() {
    let dir = tempfile::tempdir().unwrap();
    let mut page = page();

    assert_eq!(page.submit(&request("xlsx", dir.path())), ActionOutcome::Failed);

    assert!(page.api().transport().requests().is_empty());
    assert!(page.surface().errors()[0].contains("xlsx"));
}

#[test]
fn missing_output_directory_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("reports/2024");
    let mut page = page();
    page.api()
        .transport()
        .respond(Method::Post, EXPORT_PATH, 200, "a\n");

    assert!(page.submit(&request("csv", &nested)).is_completed());
    assert!(nested.join("data.csv").exists());
}
