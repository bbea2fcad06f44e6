//! Metrics page: a read-only table of metric descriptors with a guarded
//! delete per row.

use crate::activity::{ActivityLog, Level};
use crate::client::{ApiClient, Transport};
use crate::document::MetricDescriptor;
use crate::notify::NotificationSurface;
use crate::prompt::ConfirmGate;

use super::{ActionOutcome, PageContext, PageHandle, Settled, SidebarSlot, ViewState};

pub const TABLE_HEADER: [&str; 3] = ["Metric Name", "Type", "Labels"];

pub struct MetricsPage<T, N, C> {
    ctx: PageContext<T, N>,
    gate: C,
    metrics: Vec<MetricDescriptor>,
}

impl<T, N, C> MetricsPage<T, N, C>
where
    T: Transport,
    N: NotificationSurface,
    C: ConfirmGate,
{
    pub fn new(transport: T, surface: N, gate: C) -> Self {
        Self {
            ctx: PageContext::new("metrics", transport, surface),
            gate,
            metrics: Vec::new(),
        }
    }

    pub fn with_activity(mut self, activity: ActivityLog) -> Self {
        self.ctx = self.ctx.with_activity(activity);
        self
    }

    pub fn initialize(&mut self) -> ActionOutcome {
        self.ctx.load_sidebar();
        self.load_metrics()
    }

    pub fn load_metrics(&mut self) -> ActionOutcome {
        match self.ctx.request("load", |api| api.list_metrics()) {
            Settled::Stale => ActionOutcome::Stale,
            Settled::Current(Ok(metrics)) => {
                self.metrics = metrics;
                self.ctx.succeed("load", None)
            }
            Settled::Current(Err(err)) => {
                let banner = format!(
                    "Error loading metrics: {}",
                    err.describe_or(|_| "Failed to load metrics".to_string())
                );
                self.ctx.fail("load", &err, &banner)
            }
        }
    }

    /// Ask first, then delete and re-fetch the table.
    ///
    /// A declined prompt sends nothing and leaves the table as it was.
    pub fn delete_metric(&mut self, name: &str) -> ActionOutcome {
        let question = format!("Are you sure you want to delete metric \"{name}\"?");
        if !self.gate.confirm(&question) {
            self.ctx
                .activity()
                .record(Level::Info, "metrics", "delete", "declined", Some(name));
            return ActionOutcome::Declined;
        }

        self.ctx.surface_mut().show_loading();
        let outcome = match self.ctx.request("delete", |api| api.remove_metric(name)) {
            Settled::Stale => ActionOutcome::Stale,
            Settled::Current(Ok(_)) => {
                self.ctx.succeed("delete", None);
                self.load_metrics()
            }
            Settled::Current(Err(err)) => {
                let banner = format!(
                    "Error deleting metric: {}",
                    err.describe_or(|_| "Failed to delete metric".to_string())
                );
                self.ctx.fail("delete", &err, &banner)
            }
        };
        self.ctx.surface_mut().hide_loading();
        outcome
    }

    pub fn metrics(&self) -> &[MetricDescriptor] {
        &self.metrics
    }

    /// One `[name, type, labels]` row per metric; labels comma-joined.
    pub fn render_table(&self) -> Vec<[String; 3]> {
        self.metrics
            .iter()
            .map(|m| [m.name.clone(), m.kind.clone(), m.labels.join(", ")])
            .collect()
    }

    pub fn state(&self) -> ViewState {
        ViewState::List
    }

    pub fn gate(&self) -> &C {
        &self.gate
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
