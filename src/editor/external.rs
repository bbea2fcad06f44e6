/// Editor adapter backed by the operator's own text editor.
///
/// `focus()` writes the buffer to a temporary `.yaml` file, runs the editor
/// command on it, waits for it to exit, and reads the file back as a single
/// operator edit (undoable). Everything else is delegated to the wrapped
/// [`BufferEditor`].
use std::fs;
use std::process::Command;

use anyhow::{Context, Result};

use super::{BufferEditor, Geometry, TextEditor};

const FALLBACK_EDITOR: &str = "vi";

#[derive(Debug, Clone)]
pub struct ExternalEditor {
    buffer: BufferEditor,
    command: String,
}

impl ExternalEditor {
    /// `command` may carry arguments (`"code --wait"`). Empty means
    /// `$VISUAL`, then `$EDITOR`, then `vi`.
    pub fn new(command: &str) -> Self {
        Self {
            buffer: BufferEditor::new(),
            command: resolve_command(command, |key| std::env::var(key).ok()),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn buffer(&self) -> &BufferEditor {
        &self.buffer
    }

    fn run_editor(&self, text: &str) -> Result<String> {
        let file = tempfile::Builder::new()
            .prefix("promconsole-")
            .suffix(".yaml")
            .tempfile()
            .context("failed to create temporary file for editing")?;
        fs::write(file.path(), text).context("failed to write temporary file")?;

        let mut parts = self.command.split_whitespace();
        let program = parts.next().unwrap_or(FALLBACK_EDITOR);
        let status = Command::new(program)
            .args(parts)
            .arg(file.path())
            .status()
            .with_context(|| format!("failed to launch editor '{program}'"))?;

        if !status.success() {
            anyhow::bail!("editor '{program}' exited with {status}");
        }

        fs::read_to_string(file.path()).context("failed to read edited file")
    }
}

impl TextEditor for ExternalEditor {
    fn set_value(&mut self, text: &str) {
        self.buffer.set_value(text);
    }

    fn get_value(&self) -> String {
        self.buffer.get_value()
    }

    fn focus(&mut self) -> Result<()> {
        self.buffer.focus()?;
        let edited = self.run_editor(&self.buffer.get_value())?;
        self.buffer.edit(&edited);
        Ok(())
    }

    fn refresh(&mut self) -> Geometry {
        self.buffer.refresh()
    }

    fn set_visible(&mut self, visible: bool) {
        self.buffer.set_visible(visible);
    }

    fn is_visible(&self) -> bool {
        self.buffer.is_visible()
    }
}

/// Pick the editor command: configured, `$VISUAL`, `$EDITOR`, `vi`.
fn resolve_command(configured: &str, env: impl Fn(&str) -> Option<String>) -> String {
    if !configured.trim().is_empty() {
        return configured.trim().to_string();
    }
    ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|key| env(key))
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_EDITOR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_command_wins() {
        let cmd = resolve_command("nano", |_| Some("emacs".to_string()));
        assert_eq!(cmd, "nano");
    }

    #[test]
    fn visual_before_editor() {
        let cmd = resolve_command("", |key| match key {
            "VISUAL" => Some("hx".to_string()),
            "EDITOR" => Some("nano".to_string()),
            _ => None,
        });
        assert_eq!(cmd, "hx");
    }

    #[test]
    fn empty_env_falls_back_to_vi() {
        let cmd = resolve_command("  ", |key| match key {
            "EDITOR" => Some(String::new()),
            _ => None,
        });
        assert_eq!(cmd, "vi");
    }

    #[cfg(unix)]
    #[test]
    fn editor_that_changes_nothing_keeps_content() {
        let mut editor = ExternalEditor::new("true");
        editor.set_value("groups: []\n");
        editor.focus().unwrap();
        assert_eq!(editor.get_value(), "groups: []\n");
        assert_eq!(editor.buffer().history_len(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn failing_editor_is_an_error_and_keeps_content() {
        let mut editor = ExternalEditor::new("false");
        editor.set_value("a: 1\n");
        assert!(editor.focus().is_err());
        assert_eq!(editor.get_value(), "a: 1\n");
    }
}
