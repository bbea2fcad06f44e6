//! Configuration page: the backend's whole Prometheus configuration as one
//! YAML document.

use crate::client::{ApiClient, ConsoleError, Transport};
use crate::document::{Ack, ResourceDocument};
use crate::editor::TextEditor;
use crate::notify::NotificationSurface;

use super::document::{DocumentKind, DocumentPage};
use super::{ActionOutcome, NavLink, ViewState, WriteMode};

pub struct ConfigKind;

impl DocumentKind for ConfigKind {
    const PAGE: &'static str = "config";
    const IDLE: ViewState = ViewState::ReadOnly;

    fn fetch<T: Transport>(api: &ApiClient<T>, _: Option<&str>) -> Result<String, ConsoleError> {
        api.fetch_config()
    }

    /// Save and apply are the same `PUT`; they differ only in what the
    /// page does afterwards.
    fn write<T: Transport>(
        api: &ApiClient<T>,
        document: &ResourceDocument,
        _: WriteMode,
    ) -> Result<Ack, ConsoleError> {
        api.write_config(document)
    }

    fn fetch_failed(err: &ConsoleError) -> String {
        let text = err.describe_or(|reason| format!("Failed to fetch config: {reason}"));
        format!("Error: {text}")
    }

    fn write_failed(err: &ConsoleError) -> String {
        let text = err.describe_or(|_| "Unknown error".to_string());
        format!("Error: {text}")
    }

    fn written(mode: WriteMode) -> String {
        match mode {
            WriteMode::Save => "Configuration saved successfully.".to_string(),
            WriteMode::Apply => "Configuration applied successfully.".to_string(),
        }
    }
}

pub type ConfigPage<T, E, N> = DocumentPage<ConfigKind, T, E, N>;

impl<T, E, N> DocumentPage<ConfigKind, T, E, N>
where
    T: Transport,
    E: TextEditor,
    N: NotificationSurface,
{
    /// Fetch the configuration into the editor.
    pub fn edit(&mut self) -> ActionOutcome {
        self.begin_edit(None)
    }
}

/// "Home" and "Prometheus" shortcuts for a backend at `origin`.
pub fn links(origin: &str) -> Vec<NavLink> {
    let origin = origin.trim_end_matches('/');
    vec![
        NavLink {
            label: "Home".to_string(),
            href: origin.to_string(),
        },
        NavLink {
            label: "Prometheus".to_string(),
            href: format!("{origin}/graph"),
        },
    ]
}
