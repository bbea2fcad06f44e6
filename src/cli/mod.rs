//! CLI command implementations for promconsole.
//!
//! Provides subcommand handlers for:
//! - `promconsole config show|edit|push|links` - the configuration page
//! - `promconsole rules list|show|edit|new|push` - the alerting rules page
//! - `promconsole metrics list|delete` - the metrics page
//! - `promconsole export ...` - the reports page
//! - `promconsole activity` - read back the activity log
//! - `promconsole settings show|init|set|reset` - console settings

pub mod edit;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::activity::{ActivityEntry, ActivityLog};
use crate::client::{ExportQuery, UreqTransport};
use crate::config::{self, schema::ConsoleConfig};
use crate::editor::{BufferEditor, ExternalEditor, TextEditor};
use crate::notify::TerminalSurface;
use crate::page::config::{self as config_page, ConfigPage};
use crate::page::metrics::TABLE_HEADER;
use crate::page::{ActionOutcome, ExportPage, ExportRequest, MetricsPage, NavLink, RulesPage};
use crate::prompt::{ConfirmGate, PresetAnswer, TerminalPrompt};

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// Session: collaborators built from the effective settings
// ---------------------------------------------------------------------------

/// Effective settings plus factories for every page collaborator.
pub struct Session {
    config: ConsoleConfig,
}

impl Session {
    /// Load the layered settings; `url` (from `--url`) wins over all of them.
    pub fn load(url: Option<String>) -> Self {
        let mut config = config::load();
        if let Some(url) = url {
            config.backend.url = url;
        }
        Self::from_config(config)
    }

    pub fn from_config(config: ConsoleConfig) -> Self {
        if !config.notifications.color {
            colored::control::set_override(false);
        }
        Self { config }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    fn transport(&self) -> UreqTransport {
        UreqTransport::new(
            &self.config.backend.url,
            Duration::from_millis(self.config.backend.timeout_ms),
        )
    }

    fn surface(&self) -> TerminalSurface {
        TerminalSurface::new(
            Duration::from_millis(self.config.notifications.banner_ms),
            self.config.notifications.color,
        )
    }

    fn activity(&self) -> ActivityLog {
        ActivityLog::from_config(&self.config.logging)
    }

    fn editor(&self) -> ExternalEditor {
        ExternalEditor::new(&self.config.editor.command)
    }

    fn config_page<E: TextEditor>(&self, editor: E) -> ConfigPage<UreqTransport, E, TerminalSurface> {
        let mut page = ConfigPage::new(self.transport(), editor, self.surface())
            .with_activity(self.activity());
        page.initialize();
        page
    }

    fn rules_page<E: TextEditor>(&self, editor: E) -> RulesPage<UreqTransport, E, TerminalSurface> {
        RulesPage::new(self.transport(), editor, self.surface()).with_activity(self.activity())
    }
}

/// Turn a page outcome into the process result.
///
/// The banner has already told the operator what went wrong.
fn finish(outcome: ActionOutcome) -> Result<()> {
    match outcome {
        ActionOutcome::Completed | ActionOutcome::Declined => Ok(()),
        ActionOutcome::Failed => anyhow::bail!("action failed"),
        ActionOutcome::Stale => anyhow::bail!("response arrived after the page was left"),
        ActionOutcome::Ignored => anyhow::bail!("nothing to do in the current view"),
    }
}

fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

// ---------------------------------------------------------------------------
// promconsole config
// ---------------------------------------------------------------------------

/// Print the current configuration exactly as the backend returned it.
pub fn run_config_show(session: &Session) -> Result<()> {
    let mut page = session.config_page(BufferEditor::new());
    finish(page.edit())?;
    print!("{}", page.editor().get_value());
    page.cancel();
    Ok(())
}

/// Fetch the configuration into `$EDITOR` and iterate until saved or
/// cancelled.
pub fn run_config_edit(session: &Session) -> Result<()> {
    let mut page = session.config_page(session.editor());
    finish(page.edit())?;
    finish(edit::run_loop(&mut page, edit::ask_choice)?)
}

/// Send a local YAML file as the new configuration.
pub fn run_config_push(session: &Session, file: &Path, apply: bool) -> Result<()> {
    let content = read_document(file)?;
    let mut page = session.config_page(BufferEditor::new());
    page.begin_new();
    page.editor_mut().set_value(&content);
    let outcome = if apply { page.apply() } else { page.save() };
    finish(outcome)
}

/// Print the navigation shortcuts and the sidebar's links.
pub fn run_config_links(session: &Session) -> Result<()> {
    let page = session.config_page(BufferEditor::new());

    println!("{}", "Navigation".bold().cyan());
    println!("{}", "=".repeat(50));
    print_links(&config_page::links(session.config().backend.origin()));

    let sidebar = page.sidebar().links();
    if !sidebar.is_empty() {
        println!();
        println!("{}", "Sidebar".bold().cyan());
        print_links(&sidebar);
    }
    Ok(())
}

fn print_links(links: &[NavLink]) {
    for link in links {
        println!("  {:<20} {}", link.label.bold(), link.href.dimmed());
    }
}

// ---------------------------------------------------------------------------
// promconsole rules
// ---------------------------------------------------------------------------

pub fn run_rules_list(session: &Session) -> Result<()> {
    let mut page = session.rules_page(BufferEditor::new());
    finish(page.initialize())?;

    let names = page.render_list();
    if names.is_empty() {
        println!("{}", "No rule files on the backend.".yellow());
        return Ok(());
    }
    println!("{}", "Alerting Rules".bold().cyan());
    println!("{}", "=".repeat(50));
    for name in names {
        println!("  {name}");
    }
    Ok(())
}

pub fn run_rules_show(session: &Session, name: &str) -> Result<()> {
    let mut page = session.rules_page(BufferEditor::new());
    finish(page.open_rule(name))?;
    print!("{}", page.editor().get_value());
    Ok(())
}

pub fn run_rules_edit(session: &Session, name: &str) -> Result<()> {
    let mut page = session.rules_page(session.editor());
    finish(page.initialize())?;
    finish(page.open_rule(name))?;
    finish(edit::run_loop(&mut page, edit::ask_choice)?)
}

pub fn run_rules_new(session: &Session) -> Result<()> {
    let mut page = session.rules_page(session.editor());
    finish(page.initialize())?;
    page.new_rule();
    finish(edit::run_loop(&mut page, edit::ask_choice)?)
}

/// Upload a local rule file.
pub fn run_rules_push(session: &Session, file: &Path) -> Result<()> {
    let content = read_document(file)?;
    let mut page = session.rules_page(BufferEditor::new());
    page.new_rule();
    page.editor_mut().set_value(&content);
    finish(page.save())
}

// ---------------------------------------------------------------------------
// promconsole metrics
// ---------------------------------------------------------------------------

pub fn run_metrics_list(session: &Session, format: OutputFormat) -> Result<()> {
    let mut page = MetricsPage::new(session.transport(), session.surface(), PresetAnswer::no())
        .with_activity(session.activity());
    finish(page.initialize())?;

    let rows = page.render_table();
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(page.metrics())?);
        }
        OutputFormat::Csv => {
            println!("name,type,labels");
            for row in &rows {
                println!("{}", csv_row(row));
            }
        }
        OutputFormat::Table => print_metrics_table(&rows),
    }
    Ok(())
}

fn print_metrics_table(rows: &[[String; 3]]) {
    if rows.is_empty() {
        println!("{}", "No metrics reported.".yellow());
        return;
    }
    let width = rows
        .iter()
        .map(|[name, ..]| name.chars().count())
        .max()
        .unwrap_or(0)
        .max(TABLE_HEADER[0].len());

    println!(
        "  {:<width$} {:<10} {}",
        TABLE_HEADER[0].bold(),
        TABLE_HEADER[1].bold(),
        TABLE_HEADER[2].bold(),
    );
    println!("  {}", "-".repeat(width + 30));
    for (i, [name, kind, labels]) in rows.iter().enumerate() {
        let line = format!("  {name:<width$} {kind:<10} {labels}");
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

pub fn run_metrics_delete(session: &Session, name: &str, yes: bool) -> Result<()> {
    if yes {
        delete_metric(session, name, PresetAnswer::yes())
    } else {
        delete_metric(session, name, TerminalPrompt)
    }
}

fn delete_metric<C: ConfirmGate>(session: &Session, name: &str, gate: C) -> Result<()> {
    let mut page = MetricsPage::new(session.transport(), session.surface(), gate)
        .with_activity(session.activity());
    finish(page.initialize())?;

    let outcome = page.delete_metric(name);
    if outcome == ActionOutcome::Declined {
        println!("{}", "Nothing deleted.".dimmed());
    }
    finish(outcome)?;
    if outcome.is_completed() {
        println!(
            "{} Deleted {} ({} metrics remain)",
            "✓".green().bold(),
            name.bold(),
            page.metrics().len()
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// promconsole export
// ---------------------------------------------------------------------------

/// Export form fields; `None` falls back to the `[export]` settings.
#[derive(Debug, Clone, Default)]
pub struct ExportArgs {
    pub expr: String,
    pub start: String,
    pub end: String,
    pub step: Option<String>,
    pub timestamp_format: Option<String>,
    pub replace_fields: bool,
    pub format: Option<String>,
    pub output_dir: Option<PathBuf>,
}

impl ExportArgs {
    pub fn into_request(self, config: &ConsoleConfig) -> ExportRequest {
        let defaults = &config.export;
        ExportRequest {
            query: ExportQuery {
                expr: self.expr,
                start: self.start,
                end: self.end,
                step: self.step.unwrap_or_else(|| defaults.step.clone()),
                timestamp_format: self
                    .timestamp_format
                    .unwrap_or_else(|| defaults.timestamp_format.clone()),
                replace_fields: self.replace_fields,
            },
            format: self.format.unwrap_or_else(|| defaults.format.clone()),
            output_dir: self
                .output_dir
                .unwrap_or_else(|| config::expand_home(&defaults.output_dir)),
        }
    }
}

pub fn run_export(session: &Session, args: ExportArgs) -> Result<()> {
    let request = args.into_request(session.config());
    let mut page =
        ExportPage::new(session.transport(), session.surface()).with_activity(session.activity());
    page.initialize();

    finish(page.submit(&request))?;
    if let Some(path) = page.artifact() {
        println!("{} Saved {}", "✓".green().bold(), path.display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// promconsole activity
// ---------------------------------------------------------------------------

pub fn run_activity(session: &Session, limit: usize, format: OutputFormat) -> Result<()> {
    let log = session.activity();
    let entries = log.read_recent(limit);

    if entries.is_empty() {
        println!("{}", "No activity recorded yet.".yellow());
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Csv => print_activity_csv(&entries),
        OutputFormat::Table => print_activity_table(&entries),
    }
    Ok(())
}

fn print_activity_table(entries: &[ActivityEntry]) {
    println!("{}", "Console Activity".bold().cyan());
    println!("{}", "=".repeat(72));
    println!(
        "  {:<20} {:<6} {:<8} {:<8} {:<10} Message",
        "Time", "Level", "Page", "Action", "Outcome"
    );
    println!("  {}", "-".repeat(70));

    for entry in entries {
        let time = entry.timestamp.get(..19).unwrap_or(&entry.timestamp);
        let outcome = if entry.outcome == "ok" {
            entry.outcome.green()
        } else {
            entry.outcome.red()
        };
        println!(
            "  {:<20} {:<6} {:<8} {:<8} {:<10} {}",
            time,
            entry.level.to_string(),
            entry.page,
            entry.action,
            outcome,
            truncate(entry.message.as_deref().unwrap_or(""), 40).dimmed(),
        );
    }
}

fn print_activity_csv(entries: &[ActivityEntry]) {
    println!("timestamp,level,page,action,outcome,message");
    for entry in entries {
        println!(
            "{},{},{},{},{},{}",
            entry.timestamp,
            entry.level,
            entry.page,
            entry.action,
            entry.outcome,
            csv_field(entry.message.as_deref().unwrap_or("")),
        );
    }
}

// ---------------------------------------------------------------------------
// promconsole settings show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) settings as TOML.
pub fn run_settings_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective promconsole Settings".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source(global_exists, "~/.promconsole/config.toml");
    print_source(project_exists, ".promconsole.toml");
    println!(
        "  {} {}",
        "·".dimmed(),
        "PROMCONSOLE_* environment variables".dimmed()
    );
    println!("  {} {}", "·".dimmed(), "--url".dimmed());
    Ok(())
}

fn print_source(exists: bool, label: &str) {
    if exists {
        println!("  {} {}", "✓".green(), label.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{label} (not found)").dimmed());
    }
}

pub fn run_settings_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Settings written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

pub fn run_settings_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

pub fn run_settings_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Settings reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Truncate to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

/// Quote a CSV field when it contains a separator, quote, or newline.
fn csv_row(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
