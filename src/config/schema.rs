/// Configuration schema and defaults for promconsole.
///
/// Defines the TOML-serializable settings with sections `[backend]`,
/// `[notifications]`, `[editor]`, `[export]` and `[logging]`. Every field has
/// a built-in default; users only set what they want to change.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level console settings.
///
/// Maps to `~/.promconsole/config.toml` and `.promconsole.toml`. Missing
/// sections and fields fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub backend: BackendConfig,
    pub notifications: NotificationConfig,
    pub editor: EditorConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [backend]
// ---------------------------------------------------------------------------

/// Where the management backend lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend origin; the console pages live under this URL.
    pub url: String,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5000".to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl BackendConfig {
    /// Backend origin without a trailing slash.
    pub fn origin(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

// ---------------------------------------------------------------------------
// [notifications]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// How long an error/success banner stays up (milliseconds).
    pub banner_ms: u64,
    /// Colorize terminal banners.
    pub color: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            banner_ms: 3000,
            color: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [editor]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Editor command. Empty means `$VISUAL`, then `$EDITOR`, then `vi`.
    pub command: String,
}

// ---------------------------------------------------------------------------
// [export]
// ---------------------------------------------------------------------------

/// Defaults for the reports page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory the `data.{format}` artifact is written to.
    pub output_dir: String,
    /// `csv` or `json`.
    pub format: String,
    /// `unix`, `rfc2822`, `iso8601`, `rfc3339` or `friendly`.
    pub timestamp_format: String,
    /// Query step; `auto` lets the backend pick the resolution.
    pub step: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
            format: "csv".to_string(),
            timestamp_format: "unix".to_string(),
            step: "auto".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Activity log settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether console actions are recorded.
    pub enabled: bool,
    /// Path to the JSONL activity log. `~` expands to the home directory.
    pub path: String,
    /// Minimum level written: `"debug"`, `"info"`, `"warn"`, `"error"`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.promconsole/activity.jsonl".to_string(),
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Annotated default file
// ---------------------------------------------------------------------------

impl ConsoleConfig {
    /// Contents written by `promconsole settings init`.
    pub fn default_toml() -> String {
        r#"# promconsole Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Command-line flags (--url)
#   2. Environment variables (PROMCONSOLE_*)
#   3. Project config (.promconsole.toml in current directory)
#   4. User global config (~/.promconsole/config.toml)
#   5. Built-in defaults

[backend]
url = "http://localhost:5000"
timeout_ms = 30000            # Requests taking longer are reported as failed

[notifications]
banner_ms = 3000              # Banner lifetime
color = true

[editor]
command = ""                  # Empty: $VISUAL, then $EDITOR, then vi

[export]
output_dir = "."
format = "csv"                # csv | json
timestamp_format = "unix"     # unix | rfc2822 | iso8601 | rfc3339 | friendly
step = "auto"

[logging]
enabled = true
path = "~/.promconsole/activity.jsonl"
level = "info"                # debug | info | warn | error
"#
        .to_string()
    }
}
