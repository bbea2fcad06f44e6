/// Remote resource client for the management backend.
///
/// One [`ApiClient`] wraps an injected [`Transport`] and exposes typed calls
/// per resource kind:
///
/// | Kind    | Read                         | Write / remove                      |
/// |---------|------------------------------|-------------------------------------|
/// | config  | `GET /api/v1/configs` (YAML) | `PUT /api/v1/configs` (JSON)        |
/// | rules   | `GET /api/v1/rules[/{name}]` | `POST /api/v1/rules` (YAML)         |
/// | metrics | `GET /api/v1/metrics`        | `DELETE /api/v1/metrics/{name}`     |
/// | export  | n/a                          | `POST /api/v1/export?format={fmt}`  |
///
/// Every call separates transport failures from backend rejections; see
/// [`ConsoleError`].
pub mod error;
pub mod mock;
pub mod transport;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Serialize;

use crate::document::{Ack, MetricDescriptor, ResourceDocument, RuleSummary};

pub use error::ConsoleError;
pub use mock::MockTransport;
pub use transport::{ApiRequest, ApiResponse, Method, Transport, UreqTransport};

pub const CONFIGS_PATH: &str = "/api/v1/configs";
pub const RULES_PATH: &str = "/api/v1/rules";
pub const METRICS_PATH: &str = "/api/v1/metrics";
pub const EXPORT_PATH: &str = "/api/v1/export";
pub const SIDEBAR_PATH: &str = "/components/templates/sidebar.html";

const YAML: &str = "application/yaml";
const YAML_UPLOAD: &str = "application/x-yaml";
const JSON: &str = "application/json";

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

// ---------------------------------------------------------------------------
// Export query
// ---------------------------------------------------------------------------

/// Body of `POST /api/v1/export`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportQuery {
    pub expr: String,
    pub start: String,
    pub end: String,
    pub step: String,
    pub timestamp_format: String,
    pub replace_fields: bool,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct ApiClient<T> {
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `request` and turn a non-2xx status into a rejection.
    fn exchange(&self, request: ApiRequest) -> Result<ApiResponse, ConsoleError> {
        let response = self.transport.send(&request)?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(ConsoleError::RemoteRejection {
                status: response.status,
                reason: response.reason.clone(),
                message: rejection_message(&response.body),
            })
        }
    }

    // -- config -------------------------------------------------------------

    /// Current configuration as YAML text, byte-for-byte.
    pub fn fetch_config(&self) -> Result<String, ConsoleError> {
        let request = ApiRequest::get(CONFIGS_PATH).with_header("Accept", YAML);
        self.exchange(request)?.text()
    }

    /// Replace the configuration with the JSON form of `document`.
    pub fn write_config(&self, document: &ResourceDocument) -> Result<Ack, ConsoleError> {
        let json = document.to_json()?;
        let request = ApiRequest::new(Method::Put, CONFIGS_PATH).with_body(JSON, json.to_string());
        let response = self.exchange(request)?;
        Ok(parse_ack(&response))
    }

    // -- rules --------------------------------------------------------------

    pub fn list_rules(&self) -> Result<Vec<RuleSummary>, ConsoleError> {
        self.exchange(ApiRequest::get(RULES_PATH))?.json()
    }

    pub fn fetch_rule(&self, name: &str) -> Result<String, ConsoleError> {
        let request =
            ApiRequest::get(format!("{RULES_PATH}/{}", encode_segment(name))).with_header("Accept", YAML);
        self.exchange(request)?.text()
    }

    /// Create or replace a rule file from raw YAML.
    pub fn write_rule(&self, document: &ResourceDocument) -> Result<Ack, ConsoleError> {
        let request = ApiRequest::new(Method::Post, RULES_PATH)
            .with_body(YAML_UPLOAD, document.content().as_bytes().to_vec());
        let response = self.exchange(request)?;
        Ok(parse_ack(&response))
    }

    // -- metrics ------------------------------------------------------------

    pub fn list_metrics(&self) -> Result<Vec<MetricDescriptor>, ConsoleError> {
        self.exchange(ApiRequest::get(METRICS_PATH))?.json()
    }

    pub fn remove_metric(&self, name: &str) -> Result<Ack, ConsoleError> {
        let request = ApiRequest::new(
            Method::Delete,
            format!("{METRICS_PATH}/{}", encode_segment(name)),
        );
        let response = self.exchange(request)?;
        Ok(parse_ack(&response))
    }

    // -- export -------------------------------------------------------------

    /// Run an export and return the artifact bytes.
    pub fn export(&self, query: &ExportQuery, format: &str) -> Result<Vec<u8>, ConsoleError> {
        let body = serde_json::to_vec(query)
            .map_err(|e| ConsoleError::LocalValidation(format!("cannot encode export query: {e}")))?;
        let request = ApiRequest::new(Method::Post, EXPORT_PATH)
            .with_query("format", format)
            .with_body(JSON, body);
        Ok(self.exchange(request)?.body)
    }

    // -- static assets ------------------------------------------------------

    pub fn fetch_sidebar(&self) -> Result<String, ConsoleError> {
        self.exchange(ApiRequest::get(SIDEBAR_PATH))?.text()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Backend error text from a failed response body.
///
/// Looks at the JSON fields the backend uses (`message`, `error`,
/// `detail`). A non-JSON body yields `None` so callers fall back to a
/// generic message.
pub fn rejection_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["message", "error", "detail"]
        .iter()
        .filter_map(|key| value.get(*key))
        .find_map(|field| match field {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            serde_json::Value::Null => None,
            serde_json::Value::String(_) => None,
            other => Some(other.to_string()),
        })
}

/// Acks are informational; an unparseable success body is still success.
fn parse_ack(response: &ApiResponse) -> Ack {
    serde_json::from_slice(&response.body).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> ApiClient<MockTransport> {
        ApiClient::new(MockTransport::new())
    }

    #[test]
    fn fetch_config_returns_body_verbatim() {
        let api = client();
        let yaml = "global:\n  scrape_interval: 15s\n";
        api.transport().respond(Method::Get, CONFIGS_PATH, 200, yaml);

        assert_eq!(api.fetch_config().unwrap(), yaml);
        let sent = api.transport().last(Method::Get, CONFIGS_PATH).unwrap();
        assert_eq!(sent.header("Accept"), Some("application/yaml"));
    }

    #[test]
    fn non_2xx_becomes_rejection_with_backend_message() {
        let api = client();
        api.transport().respond_json(
            Method::Put,
            CONFIGS_PATH,
            500,
            &json!({"status": "error", "message": "reload failed"}),
        );

        let doc = ResourceDocument::from_text("global: {}");
        let err = api.write_config(&doc).unwrap_err();
        assert_eq!(
            err,
            ConsoleError::RemoteRejection {
                status: 500,
                reason: "Internal Server Error".to_string(),
                message: Some("reload failed".to_string()),
            }
        );
    }

    #[test]
    fn write_config_sends_json_converted_from_yaml() {
        let api = client();
        api.transport()
            .respond_json(Method::Put, CONFIGS_PATH, 200, &json!({"status": "success"}));

        let doc = ResourceDocument::from_text("global:\n  scrape_interval: 30s\n");
        let ack = api.write_config(&doc).unwrap();
        assert_eq!(ack.status.as_deref(), Some("success"));

        let sent = api.transport().last(Method::Put, CONFIGS_PATH).unwrap();
        assert_eq!(sent.header("Content-Type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(&sent.body_text().unwrap()).unwrap();
        assert_eq!(body, json!({"global": {"scrape_interval": "30s"}}));
    }

    #[test]
    fn write_config_with_invalid_yaml_sends_nothing() {
        let api = client();
        let err = api
            .write_config(&ResourceDocument::from_text("a: [b"))
            .unwrap_err();
        assert!(err.is_local());
        assert!(api.transport().requests().is_empty());
    }

    #[test]
    fn rule_and_metric_names_are_path_encoded() {
        let api = client();
        api.transport()
            .respond(Method::Get, "/api/v1/rules/disk%20alerts", 200, "groups: []");
        api.transport()
            .respond(Method::Delete, "/api/v1/metrics/a%2Fb", 200, "{}");

        assert_eq!(api.fetch_rule("disk alerts").unwrap(), "groups: []");
        assert!(api.remove_metric("a/b").is_ok());
    }

    #[test]
    fn export_posts_query_with_format_parameter() {
        let api = client();
        api.transport().respond(Method::Post, EXPORT_PATH, 200, "a,b\n1,2\n");

        let query = ExportQuery {
            expr: "up".to_string(),
            start: "0".to_string(),
            end: "10".to_string(),
            step: "5".to_string(),
            timestamp_format: "rfc3339".to_string(),
            replace_fields: false,
        };
        let bytes = api.export(&query, "csv").unwrap();
        assert_eq!(bytes, b"a,b\n1,2\n");

        let sent = api.transport().last(Method::Post, EXPORT_PATH).unwrap();
        assert_eq!(sent.query, vec![("format".to_string(), "csv".to_string())]);
        let body: serde_json::Value = serde_json::from_str(&sent.body_text().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "expr": "up", "start": "0", "end": "10", "step": "5",
                "timestamp_format": "rfc3339", "replace_fields": false
            })
        );
    }

    #[test]
    fn rejection_message_prefers_message_then_error_then_detail() {
        assert_eq!(
            rejection_message(br#"{"message":"m","error":"e"}"#).as_deref(),
            Some("m")
        );
        assert_eq!(
            rejection_message(br#"{"status":"error","error":"e"}"#).as_deref(),
            Some("e")
        );
        assert_eq!(
            rejection_message(br#"{"detail":"Not Found"}"#).as_deref(),
            Some("Not Found")
        );
        assert_eq!(rejection_message(b"Bad Gateway"), None);
        assert_eq!(rejection_message(br#"{"message":""}"#), None);
    }

    #[test]
    fn transport_failure_passes_through() {
        let api = client();
        api.transport()
            .fail(Method::Get, METRICS_PATH, "connection refused");
        let err = api.list_metrics().unwrap_err();
        assert_eq!(err, ConsoleError::Transport("connection refused".to_string()));
    }
}
