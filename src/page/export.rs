//! Reports page: run a range query export and store the artifact as
//! `data.{format}`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::activity::{ActivityLog, Level};
use crate::client::{ApiClient, ConsoleError, ExportQuery, Transport};
use crate::notify::NotificationSurface;

use super::{ActionOutcome, PageContext, PageHandle, Settled, SidebarSlot};

pub const FORMATS: [&str; 2] = ["csv", "json"];

pub const TIMESTAMP_FORMATS: [&str; 5] = ["unix", "rfc2822", "iso8601", "rfc3339", "friendly"];

/// One submission of the export form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub query: ExportQuery,
    /// Artifact format, `csv` or `json`.
    pub format: String,
    pub output_dir: PathBuf,
}

impl ExportRequest {
    /// Reject what the backend would reject anyway, before sending.
    pub fn validate(&self) -> Result<(), ConsoleError> {
        if self.query.expr.trim().is_empty() {
            return Err(ConsoleError::LocalValidation(
                "expression is required".to_string(),
            ));
        }
        if self.query.start.trim().is_empty() || self.query.end.trim().is_empty() {
            return Err(ConsoleError::LocalValidation(
                "start and end are required".to_string(),
            ));
        }
        if !FORMATS.contains(&self.format.as_str()) {
            return Err(ConsoleError::LocalValidation(format!(
                "unsupported format \"{}\" (expected csv or json)",
                self.format
            )));
        }
        if !TIMESTAMP_FORMATS.contains(&self.query.timestamp_format.as_str()) {
            return Err(ConsoleError::LocalValidation(format!(
                "unsupported timestamp format \"{}\"",
                self.query.timestamp_format
            )));
        }
        Ok(())
    }

    pub fn file_name(&self) -> String {
        format!("data.{}", self.format)
    }
}

pub struct ExportPage<T, N> {
    ctx: PageContext<T, N>,
    artifact: Option<PathBuf>,
}

impl<T: Transport, N: NotificationSurface> ExportPage<T, N> {
    pub fn new(transport: T, surface: N) -> Self {
        Self {
            ctx: PageContext::new("export", transport, surface),
            artifact: None,
        }
    }

    pub fn with_activity(mut self, activity: ActivityLog) -> Self {
        self.ctx = self.ctx.with_activity(activity);
        self
    }

    pub fn initialize(&mut self) {
        self.ctx.load_sidebar();
    }

    /// Run the export and write the artifact into `request.output_dir`.
    ///
    /// Nothing is left in the output directory unless the whole artifact
    /// was received and written.
    pub fn submit(&mut self, request: &ExportRequest) -> ActionOutcome {
        if let Err(err) = request.validate() {
            let banner = err.to_string();
            return self.ctx.fail("submit", &err, &banner);
        }

        let query = &request.query;
        let format = request.format.as_str();
        let bytes = match self.ctx.request("submit", |api| api.export(query, format)) {
            Settled::Stale => return ActionOutcome::Stale,
            Settled::Current(Ok(bytes)) => bytes,
            Settled::Current(Err(err)) => {
                let banner = err.describe_or(|reason| format!("Error: {reason}"));
                return self.ctx.fail("submit", &err, &banner);
            }
        };

        match write_artifact(&request.output_dir, &request.file_name(), &bytes) {
            Ok(path) => {
                let note = path.display().to_string();
                self.artifact = Some(path);
                self.ctx.succeed("submit", None);
                self.ctx
                    .activity()
                    .record(Level::Debug, "export", "write", "ok", Some(&note));
                ActionOutcome::Completed
            }
            Err(err) => {
                let banner = format!("Error: {err:#}");
                self.ctx.surface_mut().show_error(&banner);
                self.ctx
                    .activity()
                    .record(Level::Error, "export", "write", "io", Some(&banner));
                ActionOutcome::Failed
            }
        }
    }

    /// Where the last successful export was written.
    pub fn artifact(&self) -> Option<&Path> {
        self.artifact.as_deref()
    }

    pub fn surface(&self) -> &N {
        self.ctx.surface()
    }

    pub fn sidebar(&self) -> &SidebarSlot {
        self.ctx.sidebar()
    }

    pub fn handle(&self) -> &PageHandle {
        self.ctx.handle()
    }

    pub fn api(&self) -> &ApiClient<T> {
        self.ctx.api()
    }
}

/// Stage `bytes` next to the target, then rename into place.
fn write_artifact(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("cannot create output directory {}", dir.display()))?;

    let target = dir.join(file_name);
    let mut staged = tempfile::Builder::new()
        .prefix(".promconsole-")
        .tempfile_in(dir)
        .with_context(|| format!("cannot stage {file_name}"))?;
    staged
        .write_all(bytes)
        .with_context(|| format!("cannot write {file_name}"))?;
    staged
        .persist(&target)
        .with_context(|| format!("cannot move {file_name} into place"))?;

    Ok(target)
}
