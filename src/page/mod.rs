//! # Page Controllers
//!
//! One controller per console page. They share a single pattern: fetch the
//! resource, populate the editor or a list, let the operator edit, validate
//! locally, submit, then reconcile the view from the outcome.
//!
//! ```text
//!             edit                 save ok
//!  ReadOnly ────────▶ Editing ───────────────▶ ReadOnly / List
//!  / List   ◀──────── (content)  ── apply ok ─▶ Editing
//!             cancel             ── failure ──▶ Editing + error banner
//! ```
//!
//! Controllers own their collaborators through [`PageContext`]: the
//! [`ApiClient`], the [`NotificationSurface`], the activity log, and the
//! sidebar slot. Nothing is global, so a page can be driven entirely from
//! tests with a [`crate::client::MockTransport`] and a
//! [`crate::notify::BannerBoard`].
//!
//! Every request is tagged with the page generation at the time it was
//! issued. [`PageHandle::invalidate`] (navigation away) bumps the
//! generation; a response that comes back for an older generation is
//! dropped instead of being applied to a view that no longer exists.

pub mod config;
pub mod document;
pub mod export;
pub mod metrics;
pub mod rules;
pub mod sidebar;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::activity::{ActivityLog, Level};
use crate::client::{ApiClient, ConsoleError, Transport};
use crate::notify::NotificationSurface;

pub use config::ConfigPage;
pub use document::{DocumentKind, DocumentPage};
pub use export::{ExportPage, ExportRequest};
pub use metrics::MetricsPage;
pub use rules::RulesPage;
pub use sidebar::{NavLink, SidebarSlot};

// ---------------------------------------------------------------------------
// View state
// ---------------------------------------------------------------------------

/// Which region of a page is showing. Loading and banners are overlays on
/// the notification surface and never replace this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    ReadOnly,
    List,
    Editing,
}

/// `Save` persists and leaves the editor; `Apply` persists and stays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Save,
    Apply,
}

impl WriteMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::Apply => "apply",
        }
    }
}

/// How a user action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// An error banner was raised.
    Failed,
    /// The confirmation gate said no; nothing was sent.
    Declined,
    /// The page was invalidated while the request was in flight.
    Stale,
    /// The action does not apply in the current view.
    Ignored,
}

impl ActionOutcome {
    pub fn is_completed(self) -> bool {
        self == Self::Completed
    }
}

// ---------------------------------------------------------------------------
// Generation guard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// Clonable handle on a page's generation counter.
#[derive(Debug, Clone, Default)]
pub struct PageHandle {
    generation: Arc<AtomicU64>,
}

impl PageHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> RequestToken {
        RequestToken(self.generation.load(Ordering::SeqCst))
    }

    /// Mark every in-flight request of this page as stale.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.generation.load(Ordering::SeqCst) == token.0
    }
}

/// Result of a guarded request.
#[derive(Debug)]
pub(crate) enum Settled<R> {
    Current(Result<R, ConsoleError>),
    Stale,
}

// ---------------------------------------------------------------------------
// PageContext
// ---------------------------------------------------------------------------

pub struct PageContext<T, N> {
    page: &'static str,
    api: ApiClient<T>,
    surface: N,
    activity: ActivityLog,
    handle: PageHandle,
    sidebar: SidebarSlot,
}

impl<T: Transport, N: NotificationSurface> PageContext<T, N> {
    pub fn new(page: &'static str, transport: T, surface: N) -> Self {
        Self {
            page,
            api: ApiClient::new(transport),
            surface,
            activity: ActivityLog::disabled(),
            handle: PageHandle::new(),
            sidebar: SidebarSlot::default(),
        }
    }

    pub fn with_activity(mut self, activity: ActivityLog) -> Self {
        self.activity = activity;
        self
    }

    pub fn page(&self) -> &'static str {
        self.page
    }

    pub fn api(&self) -> &ApiClient<T> {
        &self.api
    }

    pub fn surface(&self) -> &N {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut N {
        &mut self.surface
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn handle(&self) -> &PageHandle {
        &self.handle
    }

    pub fn sidebar(&self) -> &SidebarSlot {
        &self.sidebar
    }

    /// Fetch the sidebar fragment into the slot.
    ///
    /// Failures are logged only; the operator never sees a banner for it.
    pub fn load_sidebar(&mut self) {
        match self.api.fetch_sidebar() {
            Ok(html) => {
                self.sidebar.fill(html);
                self.activity
                    .record(Level::Debug, self.page, "sidebar", "ok", None);
            }
            Err(err) => {
                let message = err.to_string();
                self.activity
                    .record(Level::Warn, self.page, "sidebar", err.kind(), Some(&message));
            }
        }
    }

    /// Run one backend call under the loading indicator and the
    /// generation guard.
    pub(crate) fn request<R>(
        &mut self,
        action: &str,
        call: impl FnOnce(&ApiClient<T>) -> Result<R, ConsoleError>,
    ) -> Settled<R> {
        let token = self.handle.token();
        self.surface.show_loading();
        let result = call(&self.api);
        self.surface.hide_loading();

        if !self.handle.is_current(token) {
            self.activity
                .record(Level::Info, self.page, action, "stale", None);
            return Settled::Stale;
        }
        Settled::Current(result)
    }

    /// Raise an error banner and log the failure.
    pub(crate) fn fail(&mut self, action: &str, err: &ConsoleError, banner: &str) -> ActionOutcome {
        self.surface.show_error(banner);
        let level = if err.is_local() {
            Level::Warn
        } else {
            Level::Error
        };
        self.activity
            .record(level, self.page, action, err.kind(), Some(banner));
        ActionOutcome::Failed
    }

    /// Log a success and optionally raise a success banner.
    pub(crate) fn succeed(&mut self, action: &str, banner: Option<&str>) -> ActionOutcome {
        if let Some(message) = banner {
            self.surface.show_success(message);
        }
        self.activity
            .record(Level::Info, self.page, action, "ok", banner);
        ActionOutcome::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Method, MockTransport, SIDEBAR_PATH};
    use crate::notify::BannerBoard;

    #[test]
    fn tokens_go_stale_after_invalidate() {
        let handle = PageHandle::new();
        let token = handle.token();
        assert!(handle.is_current(token));

        let remote = handle.clone();
        remote.invalidate();
        assert!(!handle.is_current(token));
        assert!(handle.is_current(handle.token()));
    }

    #[test]
    fn request_balances_loading_even_when_stale() {
        let transport = MockTransport::new();
        transport.respond(Method::Get, "/api/v1/metrics", 200, "[]");
        let mut ctx = PageContext::new("metrics", transport, BannerBoard::default());

        let handle = ctx.handle().clone();
        let settled = ctx.request("load", |api| {
            handle.invalidate();
            api.list_metrics()
        });

        assert!(matches!(settled, Settled::Stale));
        assert!(!ctx.surface().is_loading());
    }

    #[test]
    fn sidebar_failure_raises_no_banner() {
        let transport = MockTransport::new();
        transport.fail(Method::Get, SIDEBAR_PATH, "connection refused");
        let dir = tempfile::tempdir().unwrap();
        let log = ActivityLog::to_file(dir.path().join("a.jsonl"), Level::Debug);
        let mut ctx =
            PageContext::new("rules", transport, BannerBoard::default()).with_activity(log);

        ctx.load_sidebar();

        assert!(!ctx.sidebar().is_loaded());
        assert!(ctx.surface().history().is_empty());
        let entries = ctx.activity().read_all();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, Level::Warn);
        assert_eq!(entries[0].outcome, "transport");
    }

    #[test]
    fn sidebar_success_fills_slot() {
        let transport = MockTransport::new();
        transport.respond(
            Method::Get,
            SIDEBAR_PATH,
            200,
            r#"<a href="/reports">Reports</a>"#,
        );
        let mut ctx = PageContext::new("export", transport, BannerBoard::default());

        ctx.load_sidebar();

        assert_eq!(ctx.sidebar().links()[0].label, "Reports");
    }
}
