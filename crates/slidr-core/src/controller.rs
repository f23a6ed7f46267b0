//! Top-level owner of the editor and presentation views.
//!
//! Hosts hold one [`Workspace`]. View changes (opening a slide's content
//! editor, starting or closing a presentation) are explicit
//! [`WorkspaceAction`]s instead of ad hoc events, and the workspace keeps
//! the autosaver informed of every change to the graph.

use crate::codec;
use crate::config::EditorConfig;
use crate::graph::NodeId;
use crate::input::{InputFocus, Instant, KeyPress, Modifiers};
use crate::presentation::{NavigationError, PresentationEngine};
use crate::session::EditSession;
use crate::storage::{AutoSaver, IdentityProvider, Project, SaveRequest, SaveStatus, SaveTicket, StorageResult};
use kurbo::Point;

/// Which view is showing.
#[derive(Debug, Clone)]
pub enum View {
    Editor,
    Presenting(Box<PresentationEngine>),
}

/// View transitions a host can request.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkspaceAction {
    OpenContentEditor(NodeId),
    /// Commit the content editor and return to the graph.
    CloseContentEditor,
    /// Start playback, optionally at a specific slide.
    StartPresentation(Option<NodeId>),
    ClosePresentation,
}

/// Editor session, presentation and autosave for one open project.
#[derive(Debug, Clone)]
pub struct Workspace {
    session: EditSession,
    view: View,
    autosave: AutoSaver,
    /// Session revision last reported to the autosaver.
    seen_revision: u64,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Workspace {
    pub fn new(config: EditorConfig) -> Self {
        let autosave = AutoSaver::new(config.autosave_delay());
        Self {
            session: EditSession::new(config),
            view: View::Editor,
            autosave,
            seen_revision: 0,
        }
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditSession {
        &mut self.session
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn presentation(&self) -> Option<&PresentationEngine> {
        match &self.view {
            View::Presenting(engine) => Some(engine),
            View::Editor => None,
        }
    }

    pub fn presentation_mut(&mut self) -> Option<&mut PresentationEngine> {
        match &mut self.view {
            View::Presenting(engine) => Some(engine),
            View::Editor => None,
        }
    }

    pub fn save_status(&self) -> &SaveStatus {
        self.autosave.status()
    }

    pub fn autosave(&self) -> &AutoSaver {
        &self.autosave
    }

    /// Replace the graph with decoded `content` without attaching storage.
    pub fn load(&mut self, content: &str) {
        let store = codec::deserialize_store(content);
        log::info!(
            "Loaded {} slide(s) and {} link(s)",
            store.nodes().len(),
            store.edges().len()
        );
        self.session.replace_store(store);
        self.view = View::Editor;
        self.seen_revision = self.session.revision();
    }

    /// Open a stored project. Autosave is enabled only when `identity`
    /// reports a signed-in user.
    pub fn open_project(&mut self, project: &Project, identity: &dyn IdentityProvider) {
        self.load(&project.content);
        self.autosave.attach(Some(project), identity);
    }

    /// Encode the current graph, including uncommitted content edits.
    pub fn export(&self) -> String {
        match self.session.content_editor() {
            Some(editor) => {
                let mut store = self.session.store().clone();
                store.set_content(editor.node_id(), editor.to_content());
                codec::serialize_store(&store)
            }
            None => codec::serialize_store(self.session.store()),
        }
    }

    pub fn rename_project(&mut self, title: &str, now: Instant) {
        self.autosave.set_title(title, now);
    }

    fn sync_edits(&mut self, now: Instant) {
        let revision = self.session.revision();
        if revision != self.seen_revision {
            self.seen_revision = revision;
            self.autosave.mark_edited(now);
        }
    }

    /// Perform a view transition.
    pub fn dispatch(&mut self, action: WorkspaceAction, now: Instant) -> bool {
        let handled = match action {
            WorkspaceAction::OpenContentEditor(id) => {
                matches!(self.view, View::Editor) && self.session.open_content_editor(&id)
            }
            WorkspaceAction::CloseContentEditor => self.session.close_content_editor(),
            WorkspaceAction::StartPresentation(start) => {
                self.start_presentation(start.as_ref());
                true
            }
            WorkspaceAction::ClosePresentation => self.close_presentation(),
        };
        self.sync_edits(now);
        handled
    }

    /// Switch to the presentation view. Open content edits are committed
    /// first so the show includes them.
    pub fn start_presentation(&mut self, start: Option<&NodeId>) {
        self.session.close_content_editor();
        let engine = PresentationEngine::start(self.session.store(), start, self.session.config());
        self.view = View::Presenting(Box::new(engine));
    }

    pub fn close_presentation(&mut self) -> bool {
        match &mut self.view {
            View::Presenting(engine) => {
                engine.close();
                self.view = View::Editor;
                true
            }
            View::Editor => false,
        }
    }

    /// Route a key press to the active view.
    ///
    /// Rejected navigation is returned so hosts can react; a warning
    /// notice is already shown by the engine where one applies.
    pub fn handle_key(&mut self, press: &KeyPress, focus: InputFocus, now: Instant) -> Result<bool, NavigationError> {
        let consumed = match &mut self.view {
            View::Presenting(engine) => {
                let outcome = engine.handle_key(press, now);
                if !engine.is_open() {
                    self.view = View::Editor;
                }
                match outcome {
                    Some(result) => result.map(|_| true)?,
                    None => false,
                }
            }
            View::Editor => self.session.handle_key(press, focus),
        };
        self.sync_edits(now);
        Ok(consumed)
    }

    pub fn pointer_down(&mut self, point: Point, modifiers: Modifiers, now: Instant) {
        if matches!(self.view, View::Editor) {
            self.session.pointer_down(point, modifiers, now);
            self.sync_edits(now);
        }
    }

    pub fn pointer_move(&mut self, point: Point, now: Instant) {
        if matches!(self.view, View::Editor) {
            self.session.pointer_move(point);
            self.sync_edits(now);
        }
    }

    pub fn pointer_up(&mut self, point: Point, now: Instant) {
        if matches!(self.view, View::Editor) {
            self.session.pointer_up(point);
            self.sync_edits(now);
        }
    }

    /// Advance timers. Returns a save the host should run, if one is due.
    pub fn tick(&mut self, now: Instant) -> Option<SaveRequest> {
        self.session.tick(now);
        if let View::Presenting(engine) = &mut self.view {
            engine.tick(now);
        }
        self.sync_edits(now);
        if self.session.content_editor().is_some() {
            // Content edits are only saved once committed to the graph.
            return None;
        }
        let store = self.session.store();
        self.autosave.poll(now, || codec::serialize_store(store))
    }

    /// Report the outcome of a save returned by [`tick`](Self::tick).
    pub fn finish_save<T>(&mut self, ticket: SaveTicket, result: &StorageResult<T>) -> bool {
        self.autosave.finish_save(ticket, result)
    }
}
