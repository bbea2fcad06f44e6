/// Configuration page tests.
///
/// Drives the config page through fetch, edit, save, apply and cancel
/// against a scripted transport, asserting on the view state, the editor,
/// the banners raised, and the requests that reached the backend.
use promconsole::activity::{ActivityLog, Level};
use promconsole::client::{ConsoleError, Method, MockTransport, CONFIGS_PATH};
use promconsole::editor::{BufferEditor, TextEditor};
use promconsole::notify::{BannerBoard, NotificationSurface};
use promconsole::page::{ActionOutcome, ConfigPage, ViewState};
use serde_json::json;

type Page = ConfigPage<MockTransport, BufferEditor, BannerBoard>;

const CONFIG_YAML: &str = "# managed by promconsole\nglobal:\n  scrape_interval:   15s\nscrape_configs:\n  - job_name: prometheus\n    static_configs:\n      - targets: ['localhost:9090']\n";

fn page() -> Page {
    ConfigPage::new(MockTransport::new(), BufferEditor::new(), BannerBoard::default())
}

fn editing_page() -> Page {
    let mut page = page();
    page.api()
        .transport()
        .respond(Method::Get, CONFIGS_PATH, 200, CONFIG_YAML);
    assert!(page.edit().is_completed());
    page
}

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

#[test]
fn fetched_config_is_shown_verbatim() {
    let page = editing_page();

    assert_eq!(page.state(), ViewState::Editing);
    assert_eq!(page.editor().get_value(), CONFIG_YAML);
    assert!(page.editor().is_visible());
    assert!(!page.surface().is_loading());
    assert!(page.surface().history().is_empty());
}

#[test]
fn fetch_rejection_stays_read_only_with_status_text() {
    let mut page = page();
    page.api()
        .transport()
        .respond(Method::Get, CONFIGS_PATH, 503, "upstream down");

    assert_eq!(page.edit(), ActionOutcome::Failed);
    assert_eq!(page.state(), ViewState::ReadOnly);
    assert!(!page.editor().is_visible());
    assert_eq!(
        page.surface().errors(),
        vec!["Error: Failed to fetch config: Service Unavailable"]
    );
}

#[test]
fn fetch_transport_failure_is_reported() {
    let mut page = page();
    page.api()
        .transport()
        .fail(Method::Get, CONFIGS_PATH, "connection refused");

    assert_eq!(page.edit(), ActionOutcome::Failed);
    assert_eq!(page.surface().errors(), vec!["Error: connection refused"]);
}

#[test]
fn non_utf8_config_is_refused_not_shown() {
    let mut page = page();
    page.api().transport().respond_bytes(
        Method::Get,
        CONFIGS_PATH,
        200,
        b"global:\n  external_labels:\n    site: caf\xe9\n",
    );

    assert_eq!(page.edit(), ActionOutcome::Failed);
    assert_eq!(page.state(), ViewState::ReadOnly);
    assert_eq!(page.editor().get_value(), "");
    assert!(!page.editor().is_visible());
    let errors = page.surface().errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Error: response is not UTF-8"));

    // Nothing can be written back from a document that was never opened.
    assert_eq!(page.save(), ActionOutcome::Ignored);
    assert_eq!(page.api().transport().count(Method::Put, CONFIGS_PATH), 0);
}

// ---------------------------------------------------------------------------
// Save / apply
// ---------------------------------------------------------------------------

#[test]
fn invalid_yaml_is_never_sent() {
    let mut page = editing_page();
    page.editor_mut().edit("global: [unclosed");

    assert_eq!(page.save(), ActionOutcome::Failed);
    assert_eq!(page.apply(), ActionOutcome::Failed);

    assert_eq!(page.api().transport().count(Method::Put, CONFIGS_PATH), 0);
    assert_eq!(page.state(), ViewState::Editing);
    assert_eq!(page.editor().get_value(), "global: [unclosed");
    let errors = page.surface().errors();
    assert_eq!(errors.len(), 2);
    assert!(errors[0].starts_with("Error: invalid YAML"));
}

#[test]
fn backend_rejection_keeps_editing_and_shows_backend_message() {
    let mut page = editing_page();
    page.api().transport().respond_json(
        Method::Put,
        CONFIGS_PATH,
        422,
        &json!({"status": "error", "message": "scrape_interval must be a duration"}),
    );
    page.editor_mut().edit("global:\n  scrape_interval: often\n");

    assert_eq!(page.save(), ActionOutcome::Failed);

    assert_eq!(page.state(), ViewState::Editing);
    assert_eq!(
        page.editor().get_value(),
        "global:\n  scrape_interval: often\n"
    );
    assert_eq!(
        page.surface().errors(),
        vec!["Error: scrape_interval must be a duration"]
    );
}

#[test]
fn rejection_without_message_uses_generic_text() {
    let mut page = editing_page();
    page.api()
        .transport()
        .respond(Method::Put, CONFIGS_PATH, 500, "<html>oops</html>");

    page.apply();
    assert_eq!(page.surface().errors(), vec!["Error: Unknown error"]);
}

#[test]
fn save_clears_editor_and_returns_to_read_only() {
    let mut page = editing_page();
    page.api()
        .transport()
        .respond_json(Method::Put, CONFIGS_PATH, 200, &json!({"status": "success"}));

    assert!(page.save().is_completed());

    assert_eq!(page.state(), ViewState::ReadOnly);
    assert_eq!(page.editor().get_value(), "");
    assert!(!page.editor().is_visible());
    assert_eq!(
        page.surface().successes(),
        vec!["Configuration saved successfully."]
    );
    assert!(!page.surface().is_loading());
}

#[test]
fn save_sends_edited_yaml_as_json() {
    let mut page = editing_page();
    page.api()
        .transport()
        .respond(Method::Put, CONFIGS_PATH, 200, "{}");
    page.editor_mut()
        .edit("global:\n  scrape_interval: 30s\nrule_files: [rules.yml]\n");

    page.save();

    let sent = page.api().transport().last(Method::Put, CONFIGS_PATH).unwrap();
    let body: serde_json::Value = serde_json::from_str(&sent.body_text().unwrap()).unwrap();
    assert_eq!(
        body,
        json!({"global": {"scrape_interval": "30s"}, "rule_files": ["rules.yml"]})
    );
}

#[test]
fn apply_keeps_content_and_editing_view() {
    let mut page = editing_page();
    page.api()
        .transport()
        .respond(Method::Put, CONFIGS_PATH, 200, "{}");

    assert!(page.apply().is_completed());

    assert_eq!(page.state(), ViewState::Editing);
    assert_eq!(page.editor().get_value(), CONFIG_YAML);
    assert!(page.editor().is_visible());
    assert_eq!(
        page.surface().successes(),
        vec!["Configuration applied successfully."]
    );
}

#[test]
fn cancel_discards_without_network() {
    let mut page = editing_page();
    page.editor_mut().edit("global: {}");
    let before = page.api().transport().requests().len();

    assert!(page.cancel().is_completed());

    assert_eq!(page.api().transport().requests().len(), before);
    assert_eq!(page.state(), ViewState::ReadOnly);
    assert_eq!(page.editor().get_value(), "");
}

// ---------------------------------------------------------------------------
// Activity log
// ---------------------------------------------------------------------------

#[test]
fn outcomes_are_logged() {
    let dir = tempfile::tempdir().unwrap();
    let log = ActivityLog::to_file(dir.path().join("activity.jsonl"), Level::Info);
    let mut page = page().with_activity(log);
    page.api()
        .transport()
        .respond(Method::Get, CONFIGS_PATH, 200, "global: {}\n")
        .respond(Method::Put, CONFIGS_PATH, 500, "{}");

    page.edit();
    page.save();

    let entries = page.activity().read_all();
    let summary: Vec<(&str, &str)> = entries
        .iter()
        .map(|e| (e.action.as_str(), e.outcome.as_str()))
        .collect();
    assert_eq!(summary, vec![("open", "ok"), ("save", "rejected")]);
    assert_eq!(entries[1].level, Level::Error);
    assert!(entries.iter().all(|e| e.page == "config"));
}

#[test]
fn validation_error_kind_is_local() {
    let err = ConsoleError::LocalValidation("invalid YAML".to_string());
    assert!(err.is_local());
    assert_eq!(err.kind(), "invalid");
}
