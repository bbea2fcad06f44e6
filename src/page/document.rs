//! Editor-backed pages: load a YAML document, edit, validate, write back.
//!
//! The configuration page and the rule editor only differ in endpoints,
//! messages, and the view they return to, so both are a [`DocumentPage`]
//! parameterized by a [`DocumentKind`].

use std::marker::PhantomData;

use crate::activity::ActivityLog;
use crate::client::{ApiClient, ConsoleError, Transport};
use crate::document::{Ack, ResourceDocument};
use crate::editor::{Geometry, TextEditor};
use crate::notify::NotificationSurface;

use super::{ActionOutcome, PageContext, PageHandle, Settled, SidebarSlot, ViewState, WriteMode};

/// Endpoints and wording of one kind of editable document.
pub trait DocumentKind {
    /// Page name used in the activity log.
    const PAGE: &'static str;

    /// View shown when no document is open.
    const IDLE: ViewState;

    fn fetch<T: Transport>(api: &ApiClient<T>, id: Option<&str>) -> Result<String, ConsoleError>;

    fn write<T: Transport>(
        api: &ApiClient<T>,
        document: &ResourceDocument,
        mode: WriteMode,
    ) -> Result<Ack, ConsoleError>;

    /// Banner for a failed fetch.
    fn fetch_failed(err: &ConsoleError) -> String;

    /// Banner for a failed write, local validation included.
    fn write_failed(err: &ConsoleError) -> String;

    /// Banner for a successful write.
    fn written(mode: WriteMode) -> String;
}

pub struct DocumentPage<K, T, E, N> {
    ctx: PageContext<T, N>,
    editor: E,
    state: ViewState,
    open: Option<String>,
    geometry: Geometry,
    kind: PhantomData<K>,
}

impl<K, T, E, N> DocumentPage<K, T, E, N>
where
    K: DocumentKind,
    T: Transport,
    E: TextEditor,
    N: NotificationSurface,
{
    pub fn new(transport: T, mut editor: E, surface: N) -> Self {
        editor.set_visible(false);
        Self {
            ctx: PageContext::new(K::PAGE, transport, surface),
            editor,
            state: K::IDLE,
            open: None,
            geometry: Geometry::ZERO,
            kind: PhantomData,
        }
    }

    pub fn with_activity(mut self, activity: ActivityLog) -> Self {
        self.ctx = self.ctx.with_activity(activity);
        self
    }

    /// Page load: inject the sidebar.
    pub fn initialize(&mut self) {
        self.ctx.load_sidebar();
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut E {
        &mut self.editor
    }

    /// Identifier of the document being edited, if it came from the backend.
    pub fn open_document(&self) -> Option<&str> {
        self.open.as_deref()
    }

    /// Layout measured when the editor was last shown.
    pub fn geometry(&self) -> Geometry {
        self.geometry
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

    pub fn activity(&self) -> &ActivityLog {
        self.ctx.activity()
    }

    pub fn api(&self) -> &ApiClient<T> {
        self.ctx.api()
    }

    pub(crate) fn context_mut(&mut self) -> &mut PageContext<T, N> {
        &mut self.ctx
    }

    /// Fetch a document and open it in the editor.
    ///
    /// On failure the view stays where it was.
    pub fn begin_edit(&mut self, id: Option<&str>) -> ActionOutcome {
        match self.ctx.request("open", |api| K::fetch(api, id)) {
            Settled::Stale => ActionOutcome::Stale,
            Settled::Current(Ok(text)) => {
                self.show_editor(&text);
                self.open = id.map(str::to_string);
                self.ctx.succeed("open", None)
            }
            Settled::Current(Err(err)) => {
                let banner = K::fetch_failed(&err);
                self.ctx.fail("open", &err, &banner)
            }
        }
    }

    /// Open an empty editor. No request is sent.
    pub fn begin_new(&mut self) -> ActionOutcome {
        self.show_editor("");
        self.open = None;
        ActionOutcome::Completed
    }

    /// Let the operator edit the open document.
    pub fn focus(&mut self) -> anyhow::Result<()> {
        if self.state != ViewState::Editing {
            anyhow::bail!("no document is open for editing");
        }
        self.editor.focus()
    }

    pub fn save(&mut self) -> ActionOutcome {
        self.write(WriteMode::Save)
    }

    pub fn apply(&mut self) -> ActionOutcome {
        self.write(WriteMode::Apply)
    }

    /// Discard the edit. No request is sent.
    pub fn cancel(&mut self) -> ActionOutcome {
        if self.state != ViewState::Editing {
            return ActionOutcome::Ignored;
        }
        self.close_editor();
        ActionOutcome::Completed
    }

    fn write(&mut self, mode: WriteMode) -> ActionOutcome {
        if self.state != ViewState::Editing {
            return ActionOutcome::Ignored;
        }
        let action = mode.as_str();

        let document = ResourceDocument::from_text(self.editor.get_value());
        if let Err(err) = document.validate() {
            let banner = K::write_failed(&err);
            return self.ctx.fail(action, &err, &banner);
        }

        match self.ctx.request(action, |api| K::write(api, &document, mode)) {
            Settled::Stale => ActionOutcome::Stale,
            Settled::Current(Ok(_)) => {
                if mode == WriteMode::Save {
                    self.close_editor();
                }
                let banner = K::written(mode);
                self.ctx.succeed(action, Some(&banner))
            }
            Settled::Current(Err(err)) => {
                let banner = K::write_failed(&err);
                self.ctx.fail(action, &err, &banner)
            }
        }
    }

    fn show_editor(&mut self, text: &str) {
        self.editor.set_value(text);
        self.editor.set_visible(true);
        self.geometry = self.editor.refresh();
        self.state = ViewState::Editing;
    }

    fn close_editor(&mut self) {
        self.editor.set_value("");
        self.editor.set_visible(false);
        self.geometry = Geometry::ZERO;
        self.open = None;
        self.state = K::IDLE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Method, MockTransport};
    use crate::editor::BufferEditor;
    use crate::notify::BannerBoard;

    const DOC_PATH: &str = "/api/v1/configs";

    struct Sample;

    impl DocumentKind for Sample {
        const PAGE: &'static str = "sample";
        const IDLE: ViewState = ViewState::ReadOnly;

        fn fetch<T: Transport>(api: &ApiClient<T>, _: Option<&str>) -> Result<String, ConsoleError> {
            api.fetch_config()
        }

        fn write<T: Transport>(
            api: &ApiClient<T>,
            document: &ResourceDocument,
            _: WriteMode,
        ) -> Result<Ack, ConsoleError> {
            api.write_config(document)
        }

        fn fetch_failed(err: &ConsoleError) -> String {
            format!("fetch: {}", err.describe_or(|r| r.to_string()))
        }

        fn write_failed(err: &ConsoleError) -> String {
            format!("write: {}", err.describe_or(|r| r.to_string()))
        }

        fn written(mode: WriteMode) -> String {
            format!("{} ok", mode.as_str())
        }
    }

    type Page = DocumentPage<Sample, MockTransport, BufferEditor, BannerBoard>;

    fn page() -> Page {
        DocumentPage::new(MockTransport::new(), BufferEditor::new(), BannerBoard::default())
    }

    #[test]
    fn editor_is_measured_after_it_becomes_visible() {
        let mut page = page();
        page.api()
            .transport()
            .respond(Method::Get, DOC_PATH, 200, "a: 1\nbb: 22\n");

        assert!(page.begin_edit(None).is_completed());
        assert!(page.editor().is_visible());
        assert_eq!(page.geometry(), Geometry { lines: 2, columns: 6 });
    }

    #[test]
    fn actions_outside_editing_are_ignored() {
        let mut page = page();
        assert_eq!(page.save(), ActionOutcome::Ignored);
        assert_eq!(page.cancel(), ActionOutcome::Ignored);
        assert!(page.focus().is_err());
        assert!(page.api().transport().requests().is_empty());
    }

    #[test]
    fn new_document_sends_nothing() {
        let mut page = page();
        page.begin_new();
        assert_eq!(page.state(), ViewState::Editing);
        assert_eq!(page.editor().get_value(), "");
        assert!(page.api().transport().requests().is_empty());
    }

    #[test]
    fn stale_write_leaves_view_untouched() {
        let mut page = page();
        page.begin_new();
        page.editor_mut().edit("a: 1");

        let handle = page.handle().clone();
        page.api()
            .transport()
            .respond(Method::Put, DOC_PATH, 200, "{}")
            .on_send(move |_| handle.invalidate());

        assert_eq!(page.save(), ActionOutcome::Stale);
        assert_eq!(page.state(), ViewState::Editing);
        assert_eq!(page.editor().get_value(), "a: 1");
        assert!(page.surface().history().is_empty());
        assert!(!page.surface().is_loading());
    }
}
