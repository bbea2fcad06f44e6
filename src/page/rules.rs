//! Alerting rules page: a list of rule files plus an editor for one of them.

use crate::activity::ActivityLog;
use crate::client::{ApiClient, ConsoleError, Transport};
use crate::document::{Ack, ResourceDocument, RuleSummary};
use crate::editor::TextEditor;
use crate::notify::NotificationSurface;

use super::document::{DocumentKind, DocumentPage};
use super::{ActionOutcome, PageHandle, Settled, SidebarSlot, ViewState, WriteMode};

pub struct RuleKind;

impl DocumentKind for RuleKind {
    const PAGE: &'static str = "rules";
    const IDLE: ViewState = ViewState::List;

    fn fetch<T: Transport>(api: &ApiClient<T>, id: Option<&str>) -> Result<String, ConsoleError> {
        match id {
            Some(name) => api.fetch_rule(name),
            None => Err(ConsoleError::LocalValidation(
                "a rule name is required".to_string(),
            )),
        }
    }

    fn write<T: Transport>(
        api: &ApiClient<T>,
        document: &ResourceDocument,
        _: WriteMode,
    ) -> Result<Ack, ConsoleError> {
        api.write_rule(document)
    }

    fn fetch_failed(err: &ConsoleError) -> String {
        format!(
            "Error loading rule: {}",
            err.describe_or(|_| "Failed to load rule".to_string())
        )
    }

    fn write_failed(err: &ConsoleError) -> String {
        format!(
            "Error saving rule: {}",
            err.describe_or(|_| "Failed to save rule".to_string())
        )
    }

    fn written(mode: WriteMode) -> String {
        match mode {
            WriteMode::Save => "Rule saved successfully".to_string(),
            WriteMode::Apply => "Rule applied successfully".to_string(),
        }
    }
}

pub struct RulesPage<T, E, N> {
    doc: DocumentPage<RuleKind, T, E, N>,
    rules: Vec<RuleSummary>,
}

impl<T, E, N> RulesPage<T, E, N>
where
    T: Transport,
    E: TextEditor,
    N: NotificationSurface,
{
    pub fn new(transport: T, editor: E, surface: N) -> Self {
        Self {
            doc: DocumentPage::new(transport, editor, surface),
            rules: Vec::new(),
        }
    }

    pub fn with_activity(mut self, activity: ActivityLog) -> Self {
        self.doc = self.doc.with_activity(activity);
        self
    }

    /// Page load: sidebar, then the rule list.
    pub fn initialize(&mut self) -> ActionOutcome {
        self.doc.initialize();
        self.load_rules()
    }

    /// Replace the list with the backend's current one.
    ///
    /// On failure the previous list is kept.
    pub fn load_rules(&mut self) -> ActionOutcome {
        let ctx = self.doc.context_mut();
        match ctx.request("load", |api| api.list_rules()) {
            Settled::Stale => ActionOutcome::Stale,
            Settled::Current(Ok(rules)) => {
                self.rules = rules;
                ctx.succeed("load", None)
            }
            Settled::Current(Err(err)) => {
                let banner = format!(
                    "Error loading rules: {}",
                    err.describe_or(|_| "Failed to load rules".to_string())
                );
                ctx.fail("load", &err, &banner)
            }
        }
    }

    pub fn rules(&self) -> &[RuleSummary] {
        &self.rules
    }

    /// Rule names in backend order, one list row each.
    pub fn render_list(&self) -> Vec<String> {
        self.rules.iter().map(|rule| rule.name.clone()).collect()
    }

    pub fn open_rule(&mut self, name: &str) -> ActionOutcome {
        self.doc.begin_edit(Some(name))
    }

    pub fn new_rule(&mut self) -> ActionOutcome {
        self.doc.begin_new()
    }

    pub fn focus(&mut self) -> anyhow::Result<()> {
        self.doc.focus()
    }

    /// Write the rule, leave the editor, and re-fetch the list.
    pub fn save(&mut self) -> ActionOutcome {
        self.write_then_reload(WriteMode::Save)
    }

    /// Write the rule, keep editing, and re-fetch the list.
    pub fn apply(&mut self) -> ActionOutcome {
        self.write_then_reload(WriteMode::Apply)
    }

    pub fn cancel(&mut self) -> ActionOutcome {
        self.doc.cancel()
    }

    pub fn state(&self) -> ViewState {
        self.doc.state()
    }

    pub fn editor(&self) -> &E {
        self.doc.editor()
    }

    pub fn editor_mut(&mut self) -> &mut E {
        self.doc.editor_mut()
    }

    pub fn open_document(&self) -> Option<&str> {
        self.doc.open_document()
    }

    pub fn surface(&self) -> &N {
        self.doc.surface()
    }

    pub fn sidebar(&self) -> &SidebarSlot {
        self.doc.sidebar()
    }

    pub fn handle(&self) -> &PageHandle {
        self.doc.handle()
    }

    pub fn api(&self) -> &ApiClient<T> {
        self.doc.api()
    }

    /// The loading indicator stays up across the write and the re-fetch.
    fn write_then_reload(&mut self, mode: WriteMode) -> ActionOutcome {
        self.doc.context_mut().surface_mut().show_loading();
        let outcome = match mode {
            WriteMode::Save => self.doc.save(),
            WriteMode::Apply => self.doc.apply(),
        };
        if outcome.is_completed() {
            self.load_rules();
        }
        self.doc.context_mut().surface_mut().hide_loading();
        outcome
    }
}
