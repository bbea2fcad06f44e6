//! Resource documents and list records exchanged with the backend.
//!
//! Configuration and rules travel as YAML text. The console never rewrites
//! that text; parsing only decides validity, extracts a rule name, and
//! (for configuration writes) converts the edited YAML into JSON.

use serde::{Deserialize, Serialize};

use crate::client::ConsoleError;

// ---------------------------------------------------------------------------
// Resource document
// ---------------------------------------------------------------------------

/// Editable YAML blob: a Prometheus configuration or a rule file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDocument {
    content: String,
    parsed: Option<serde_yaml::Value>,
    parse_error: Option<String>,
    name: Option<String>,
}

impl ResourceDocument {
    /// Wrap raw text, recording whether it parses.
    pub fn from_text(text: impl Into<String>) -> Self {
        let content = text.into();
        match serde_yaml::from_str::<serde_yaml::Value>(&content) {
            Ok(value) => {
                let name = structured_name(&value);
                Self {
                    content,
                    parsed: Some(value),
                    parse_error: None,
                    name,
                }
            }
            Err(err) => Self {
                content,
                parsed: None,
                parse_error: Some(err.to_string()),
                name: None,
            },
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_valid(&self) -> bool {
        self.parsed.is_some()
    }

    /// Rule name: a top-level `name`, else the first `groups[].name`.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Fail with a [`ConsoleError::LocalValidation`] unless the text parses.
    pub fn validate(&self) -> Result<&serde_yaml::Value, ConsoleError> {
        match (&self.parsed, &self.parse_error) {
            (Some(value), _) => Ok(value),
            (None, Some(err)) => Err(ConsoleError::LocalValidation(format!("invalid YAML: {err}"))),
            (None, None) => Err(ConsoleError::LocalValidation("invalid YAML".to_string())),
        }
    }

    /// Structured form of the document as JSON, for the config write.
    pub fn to_json(&self) -> Result<serde_json::Value, ConsoleError> {
        let value = self.validate()?;
        serde_json::to_value(value).map_err(|e| {
            ConsoleError::LocalValidation(format!("configuration cannot be sent as JSON: {e}"))
        })
    }
}

fn structured_name(value: &serde_yaml::Value) -> Option<String> {
    if let Some(name) = value.get("name").and_then(|n| n.as_str()) {
        return Some(name.to_string());
    }
    value
        .get("groups")
        .and_then(|g| g.as_sequence())
        .and_then(|groups| groups.first())
        .and_then(|group| group.get("name"))
        .and_then(|n| n.as_str())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// List records
// ---------------------------------------------------------------------------

/// A metric as listed by `GET /api/v1/metrics`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// One entry of `GET /api/v1/rules`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSummary {
    pub name: String,
}

/// Minimal acknowledgment body of a write or delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
