use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use promconsole::cli::{self, ExportArgs, OutputFormat, Session};

#[derive(Debug, Parser)]
#[command(name = "promconsole")]
#[command(about = "Operator console for a Prometheus management backend")]
struct App {
    /// Backend base URL (overrides settings and PROMCONSOLE_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// View and edit the Prometheus configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// List and edit alerting rule files
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },
    /// List and delete metrics
    Metrics {
        #[command(subcommand)]
        action: MetricsAction,
    },
    /// Export a range query as data.csv or data.json
    Export {
        /// PromQL expression
        #[arg(long)]
        expr: String,
        /// Range start, e.g. 2024-01-30T00:00:00Z
        #[arg(long)]
        start: String,
        /// Range end
        #[arg(long)]
        end: String,
        /// Resolution step, or "auto"
        #[arg(long)]
        step: Option<String>,
        /// unix, rfc2822, iso8601, rfc3339 or friendly
        #[arg(long)]
        timestamp_format: Option<String>,
        /// Ask the backend to substitute field names
        #[arg(long)]
        replace_fields: bool,
        /// Artifact format: csv or json
        #[arg(long)]
        format: Option<String>,
        /// Directory the artifact is written to
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Show recent console activity
    Activity {
        /// Number of most recent entries
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Manage promconsole's own settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the current configuration
    Show,
    /// Edit the configuration in $EDITOR
    Edit,
    /// Upload a YAML file as the configuration
    Push {
        file: PathBuf,
        /// Apply instead of save
        #[arg(long)]
        apply: bool,
    },
    /// Print navigation links
    Links,
}

#[derive(Debug, Subcommand)]
enum RulesAction {
    /// List rule files
    List,
    /// Print one rule file
    Show { name: String },
    /// Edit a rule file in $EDITOR
    Edit { name: String },
    /// Write a new rule file in $EDITOR
    New,
    /// Upload a YAML rule file
    Push { file: PathBuf },
}

#[derive(Debug, Subcommand)]
enum MetricsAction {
    /// List metrics
    List {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Delete a metric after confirmation
    Delete {
        name: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
enum SettingsAction {
    /// Show the effective settings and their sources
    Show,
    /// Write a default settings file to ~/.promconsole/config.toml
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Set one value, e.g. `backend.url http://prom:5000`
    Set { key: String, value: String },
    /// Overwrite the settings file with defaults
    Reset,
}

fn main() -> Result<()> {
    let App { url, command } = App::parse();
    let session = || Session::load(url.clone());

    match command {
        Commands::Config { action } => {
            let session = session();
            match action {
                ConfigAction::Show => cli::run_config_show(&session),
                ConfigAction::Edit => cli::run_config_edit(&session),
                ConfigAction::Push { file, apply } => cli::run_config_push(&session, &file, apply),
                ConfigAction::Links => cli::run_config_links(&session),
            }
        }
        Commands::Rules { action } => {
            let session = session();
            match action {
                RulesAction::List => cli::run_rules_list(&session),
                RulesAction::Show { name } => cli::run_rules_show(&session, &name),
                RulesAction::Edit { name } => cli::run_rules_edit(&session, &name),
                RulesAction::New => cli::run_rules_new(&session),
                RulesAction::Push { file } => cli::run_rules_push(&session, &file),
            }
        }
        Commands::Metrics { action } => {
            let session = session();
            match action {
                MetricsAction::List { format } => {
                    let fmt = OutputFormat::from_str_opt(Some(&format));
                    cli::run_metrics_list(&session, fmt)
                }
                MetricsAction::Delete { name, yes } => {
                    cli::run_metrics_delete(&session, &name, yes)
                }
            }
        }
        Commands::Export {
            expr,
            start,
            end,
            step,
            timestamp_format,
            replace_fields,
            format,
            output_dir,
        } => cli::run_export(
            &session(),
            ExportArgs {
                expr,
                start,
                end,
                step,
                timestamp_format,
                replace_fields,
                format,
                output_dir,
            },
        ),
        Commands::Activity { limit, format } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_activity(&session(), limit, fmt)
        }
        Commands::Settings { action } => match action {
            SettingsAction::Show => cli::run_settings_show(),
            SettingsAction::Init { force } => cli::run_settings_init(force),
            SettingsAction::Set { key, value } => cli::run_settings_set(&key, &value),
            SettingsAction::Reset => cli::run_settings_reset(),
        },
    }
}
