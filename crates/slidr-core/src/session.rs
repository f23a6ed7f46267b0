//! Interactive editing of the slide graph.
//!
//! [`EditSession`] sits between host input and the [`GraphStore`]. It owns
//! the selection, the clipboard, the undo history and the current
//! [`EditorMode`]. Only one mode is active at a time. Every mutation
//! goes through a session method that records a snapshot first, so undo
//! always restores the whole graph.

use crate::config::EditorConfig;
use crate::content::{ContentEditor, Element, ElementIdAllocator, SlideContent};
use crate::graph::{EdgeDirection, EdgeId, GraphSnapshot, GraphStore, NodeId, SlideNode};
use crate::history::History;
use crate::input::{ClickTracker, EditorCommand, InputFocus, Instant, Key, KeyPress, Modifiers};
use crate::selection;
use kurbo::{Point, Rect, Vec2};

/// Current interaction state of the graph editor.
#[derive(Debug, Clone)]
pub enum EditorMode {
    Idle,
    DraggingNode {
        /// Pointer position when the drag started.
        anchor: Point,
        /// Selected nodes and their positions when the drag started.
        originals: Vec<(NodeId, Point)>,
        /// Whether an undo entry was recorded for this drag.
        recorded: bool,
    },
    RectangleSelecting {
        start: Point,
        current: Point,
    },
    EditingLabel {
        node: NodeId,
        draft: String,
    },
    EditingContent(Box<ContentEditor>),
}

/// Copied items. Survives across operations, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum Clipboard {
    Nodes(Vec<SlideNode>),
    Elements(Vec<Element>),
}

/// Actions offered by the edge menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeAction {
    SetUnidirectional,
    SetBidirectional,
    Delete,
}

impl EdgeAction {
    fn confirmation(&self) -> &'static str {
        match self {
            EdgeAction::SetUnidirectional => "Link set to one-way",
            EdgeAction::SetBidirectional => "Link set to two-way",
            EdgeAction::Delete => "Link deleted",
        }
    }
}

/// Menu opened by clicking an edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMenu {
    pub edge: EdgeId,
    /// Confirmation of the last action, shown until the menu closes.
    pub message: Option<&'static str>,
    /// When set, the menu closes at this instant.
    pub close_at: Option<Instant>,
}

/// Editing session over one project's graph.
#[derive(Debug, Clone)]
pub struct EditSession {
    store: GraphStore,
    history: History<GraphSnapshot>,
    mode: EditorMode,
    /// Primary selected node.
    primary: Option<NodeId>,
    /// All selected nodes, in selection order.
    selected: Vec<NodeId>,
    clipboard: Option<Clipboard>,
    edge_menu: Option<EdgeMenu>,
    clicks: ClickTracker,
    element_ids: ElementIdAllocator,
    config: EditorConfig,
    /// Bumped on every change to the graph; used to schedule autosaves.
    revision: u64,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditSession {
    /// Start a session on an empty graph.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_store(GraphStore::new(), config)
    }

    /// Start a session on an existing graph.
    pub fn with_store(store: GraphStore, config: EditorConfig) -> Self {
        let mut element_ids = ElementIdAllocator::new();
        for node in store.nodes() {
            element_ids.observe_content(&node.content);
        }
        Self {
            store,
            history: History::with_capacity(config.graph_history_capacity),
            mode: EditorMode::Idle,
            primary: None,
            selected: Vec::new(),
            clipboard: None,
            edge_menu: None,
            clicks: ClickTracker::new(config.double_click_window()),
            element_ids,
            config,
            revision: 0,
        }
    }

    /// Replace the graph, for example after loading a project. History,
    /// selection and mode are reset; the clipboard survives.
    pub fn replace_store(&mut self, store: GraphStore) {
        let clipboard = self.clipboard.take();
        let revision = self.revision;
        *self = Self::with_store(store, self.config.clone());
        self.clipboard = clipboard;
        self.revision = revision + 1;
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn primary(&self) -> Option<&NodeId> {
        self.primary.as_ref()
    }

    pub fn selection(&self) -> &[NodeId] {
        &self.selected
    }

    pub fn is_selected(&self, id: &NodeId) -> bool {
        self.selected.contains(id)
    }

    pub fn clipboard(&self) -> Option<&Clipboard> {
        self.clipboard.as_ref()
    }

    pub fn edge_menu(&self) -> Option<&EdgeMenu> {
        self.edge_menu.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        match &self.mode {
            EditorMode::EditingContent(editor) => editor.can_undo(),
            _ => !self.history.is_empty(),
        }
    }

    pub fn content_editor(&self) -> Option<&ContentEditor> {
        match &self.mode {
            EditorMode::EditingContent(editor) => Some(editor),
            _ => None,
        }
    }

    pub fn content_editor_mut(&mut self) -> Option<&mut ContentEditor> {
        match &mut self.mode {
            EditorMode::EditingContent(editor) => Some(editor),
            _ => None,
        }
    }

    /// Run `f` against the store, recording an undo entry if it reports a
    /// change.
    fn mutate(&mut self, f: impl FnOnce(&mut GraphStore) -> bool) -> bool {
        let before = self.store.snapshot();
        let changed = f(&mut self.store);
        if changed {
            self.history.push(before);
            self.revision += 1;
        }
        changed
    }

    fn select_only(&mut self, id: NodeId) {
        self.selected = vec![id.clone()];
        self.primary = Some(id);
    }

    fn select_many(&mut self, ids: Vec<NodeId>) {
        self.primary = ids.first().cloned();
        self.selected = ids;
    }

    /// Select a single node, clearing any multi-selection.
    pub fn select(&mut self, id: &NodeId) -> bool {
        if !self.store.contains_node(id) {
            return false;
        }
        self.select_only(id.clone());
        true
    }

    pub fn clear_selection(&mut self) {
        self.primary = None;
        self.selected.clear();
    }

    fn prune_selection(&mut self) {
        let store = &self.store;
        self.selected.retain(|id| store.contains_node(id));
        if let Some(primary) = &self.primary {
            if !store.contains_node(primary) {
                self.primary = self.selected.first().cloned();
            }
        }
    }

    /// Add an empty slide and select it.
    pub fn add_slide(&mut self, position: Point) -> NodeId {
        let before = self.store.snapshot();
        let id = self.store.add_node(position);
        self.history.push(before);
        self.revision += 1;
        self.select_only(id.clone());
        id
    }

    /// Connect `source -> target`. See [`GraphStore::add_edge`].
    pub fn connect(&mut self, source: &NodeId, target: &NodeId) -> Option<EdgeId> {
        let mut created = None;
        self.mutate(|store| {
            created = store.add_edge(source, target);
            created.is_some()
        });
        created
    }

    /// Toggle the first-slide marker without touching the selection.
    pub fn toggle_first_slide(&mut self, id: &NodeId) -> bool {
        self.mutate(|store| store.toggle_first_slide(id))
    }

    /// Remove every selected node and its edges.
    ///
    /// Ignored while a text field has focus.
    pub fn delete_selection(&mut self, focus: InputFocus) -> bool {
        if focus == InputFocus::TextInput || self.selected.is_empty() {
            return false;
        }
        let doomed = std::mem::take(&mut self.selected);
        self.primary = None;
        self.mutate(|store| {
            let mut any = false;
            for id in &doomed {
                any |= store.delete_node(id);
            }
            any
        })
    }

    /// Copy the selected nodes to the clipboard.
    pub fn copy(&mut self) -> bool {
        let nodes: Vec<SlideNode> = self
            .store
            .nodes()
            .iter()
            .filter(|n| self.selected.contains(&n.id))
            .cloned()
            .collect();
        if nodes.is_empty() {
            return false;
        }
        log::debug!("Copied {} node(s)", nodes.len());
        self.clipboard = Some(Clipboard::Nodes(nodes));
        true
    }

    fn insert_node_copies(&mut self, nodes: &[SlideNode]) -> Vec<NodeId> {
        let offset = self.config.paste_offset();
        let mut element_ids = self.element_ids;
        let mut created = Vec::with_capacity(nodes.len());
        self.mutate(|store| {
            for node in nodes {
                let mut content: SlideContent = node.content.clone();
                for element in &mut content.elements {
                    element.id = element_ids.allocate();
                }
                created.push(store.add_node_with_content(node.position + offset, content));
            }
            true
        });
        self.element_ids = element_ids;
        self.select_many(created.clone());
        created
    }

    /// Paste the clipboard's nodes with fresh ids, offset from the copies.
    ///
    /// Each paste moves the clipboard by the paste offset, so repeated
    /// pastes cascade instead of stacking.
    pub fn paste(&mut self) -> Vec<NodeId> {
        let Some(Clipboard::Nodes(nodes)) = self.clipboard.clone() else {
            return Vec::new();
        };
        let created = self.insert_node_copies(&nodes);
        let offset = self.config.paste_offset();
        if let Some(Clipboard::Nodes(items)) = &mut self.clipboard {
            for node in items {
                node.position += offset;
            }
        }
        created
    }

    /// Offset copies of the selected nodes. The clipboard is not touched.
    pub fn duplicate(&mut self) -> Vec<NodeId> {
        let nodes: Vec<SlideNode> = self
            .store
            .nodes()
            .iter()
            .filter(|n| self.selected.contains(&n.id))
            .cloned()
            .collect();
        if nodes.is_empty() {
            return Vec::new();
        }
        self.insert_node_copies(&nodes)
    }

    /// Undo the last change of the active scope.
    pub fn undo(&mut self) -> bool {
        if let EditorMode::EditingContent(editor) = &mut self.mode {
            return editor.undo();
        }
        let Some(snapshot) = self.history.pop() else {
            return false;
        };
        self.store.restore(snapshot);
        self.prune_selection();
        self.mode = EditorMode::Idle;
        if let Some(menu) = &self.edge_menu {
            if self.store.edge(&menu.edge).is_none() {
                self.edge_menu = None;
            }
        }
        self.revision += 1;
        log::debug!("Undo; {} entries left", self.history.len());
        true
    }

    /// Open the edge menu for `edge`.
    pub fn click_edge(&mut self, edge: &EdgeId) -> bool {
        if self.store.edge(edge).is_none() {
            return false;
        }
        self.edge_menu = Some(EdgeMenu {
            edge: edge.clone(),
            message: None,
            close_at: None,
        });
        true
    }

    /// Apply an edge-menu action. The menu shows a confirmation and closes
    /// on the first [`tick`](Self::tick) after the close delay.
    pub fn edge_menu_action(&mut self, action: EdgeAction, now: Instant) -> bool {
        let Some(edge) = self.edge_menu.as_ref().map(|m| m.edge.clone()) else {
            return false;
        };
        let applied = self.mutate(|store| match action {
            EdgeAction::SetUnidirectional => store.set_direction(&edge, EdgeDirection::Unidirectional),
            EdgeAction::SetBidirectional => store.set_direction(&edge, EdgeDirection::Bidirectional),
            EdgeAction::Delete => store.remove_edge(&edge),
        });
        if let Some(menu) = &mut self.edge_menu {
            menu.message = Some(action.confirmation());
            menu.close_at = Some(now + self.config.edge_menu_close_delay());
        }
        applied
    }

    pub fn close_edge_menu(&mut self) {
        self.edge_menu = None;
    }

    /// Advance timers. Returns `true` if anything visible changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let expired = self
            .edge_menu
            .as_ref()
            .and_then(|m| m.close_at)
            .is_some_and(|at| now >= at);
        if expired {
            self.edge_menu = None;
        }
        expired
    }

    /// Start editing a node's label.
    pub fn begin_label_edit(&mut self, id: &NodeId) -> bool {
        let Some(node) = self.store.node(id) else {
            return false;
        };
        let draft = node.content.title.clone().unwrap_or_default();
        self.mode = EditorMode::EditingLabel {
            node: id.clone(),
            draft,
        };
        true
    }

    pub fn set_label_draft(&mut self, text: &str) {
        if let EditorMode::EditingLabel { draft, .. } = &mut self.mode {
            *draft = text.to_string();
        }
    }

    /// Store the label draft as the node's title. Blank clears it.
    pub fn commit_label_edit(&mut self) -> bool {
        let (node, draft) = match std::mem::replace(&mut self.mode, EditorMode::Idle) {
            EditorMode::EditingLabel { node, draft } => (node, draft),
            other => {
                self.mode = other;
                return false;
            }
        };
        let trimmed = draft.trim();
        let current = self.store.node(&node).and_then(|n| n.content.title.clone());
        let next = (!trimmed.is_empty()).then(|| trimmed.to_string());
        if current == next {
            return false;
        }
        self.mutate(|store| store.set_title(&node, &draft))
    }

    pub fn cancel_label_edit(&mut self) {
        if matches!(self.mode, EditorMode::EditingLabel { .. }) {
            self.mode = EditorMode::Idle;
        }
    }

    /// Open the content editor on a node.
    pub fn open_content_editor(&mut self, id: &NodeId) -> bool {
        if matches!(self.mode, EditorMode::EditingContent(_)) {
            self.close_content_editor();
        }
        let Some(node) = self.store.node(id) else {
            return false;
        };
        let editor = ContentEditor::open(node, &self.config, self.element_ids);
        log::debug!("Opened content editor on {}", id);
        self.mode = EditorMode::EditingContent(Box::new(editor));
        true
    }

    /// Close the content editor, storing its content on the node if it
    /// changed. Returns whether the graph changed.
    pub fn close_content_editor(&mut self) -> bool {
        let mut editor = match std::mem::replace(&mut self.mode, EditorMode::Idle) {
            EditorMode::EditingContent(editor) => editor,
            other => {
                self.mode = other;
                return false;
            }
        };
        editor.commit_text_edit();
        self.element_ids.merge(editor.allocator());
        if !editor.is_dirty() {
            return false;
        }
        let node = editor.node_id().clone();
        let content = editor.to_content();
        log::debug!("Committing content of {}", node);
        self.mutate(|store| store.set_content(&node, content))
    }

    fn node_at(&self, point: Point) -> Option<NodeId> {
        self.store.node_at(point, self.config.node_size()).cloned()
    }

    /// Pointer pressed on the graph canvas (or on the open content editor).
    pub fn pointer_down(&mut self, point: Point, modifiers: Modifiers, now: Instant) {
        let double = self.clicks.register(point, now);

        if let EditorMode::EditingContent(editor) = &mut self.mode {
            editor.pointer_down(point, modifiers);
            if double {
                editor.double_click(point);
            }
            return;
        }
        if matches!(self.mode, EditorMode::EditingLabel { .. }) {
            self.commit_label_edit();
        }

        let Some(hit) = self.node_at(point) else {
            self.edge_menu = None;
            if modifiers.alt {
                self.mode = EditorMode::RectangleSelecting {
                    start: point,
                    current: point,
                };
            } else {
                self.clear_selection();
                self.mode = EditorMode::Idle;
            }
            return;
        };

        if double {
            self.select_only(hit.clone());
            self.open_content_editor(&hit);
            return;
        }
        if modifiers.command() {
            self.toggle_first_slide(&hit);
            return;
        }
        if modifiers.alt {
            self.begin_label_edit(&hit);
            return;
        }

        if !self.selected.contains(&hit) {
            self.select_only(hit.clone());
        } else {
            self.primary = Some(hit.clone());
        }
        let originals = self
            .selected
            .iter()
            .filter_map(|id| self.store.node(id).map(|n| (id.clone(), n.position)))
            .collect();
        self.mode = EditorMode::DraggingNode {
            anchor: point,
            originals,
            recorded: false,
        };
    }

    /// Pointer moved. Drags keep following the pointer anywhere on screen.
    pub fn pointer_move(&mut self, point: Point) {
        match &mut self.mode {
            EditorMode::EditingContent(editor) => editor.pointer_move(point),
            EditorMode::RectangleSelecting { current, .. } => *current = point,
            EditorMode::DraggingNode {
                anchor,
                originals,
                recorded,
            } => {
                let delta = point - *anchor;
                if !*recorded && delta == Vec2::ZERO {
                    return;
                }
                if !*recorded {
                    self.history.push(self.store.snapshot());
                    *recorded = true;
                }
                for (id, origin) in originals.iter() {
                    self.store.move_node(id, *origin + delta);
                }
                self.revision += 1;
            }
            EditorMode::Idle | EditorMode::EditingLabel { .. } => {}
        }
    }

    /// Pointer released.
    pub fn pointer_up(&mut self, point: Point) {
        match std::mem::replace(&mut self.mode, EditorMode::Idle) {
            EditorMode::EditingContent(mut editor) => {
                editor.pointer_up(point);
                self.mode = EditorMode::EditingContent(editor);
            }
            EditorMode::RectangleSelecting { start, .. } => {
                let area = selection::drag_rect(start, point);
                let size = self.config.node_size();
                let hits: Vec<NodeId> = self
                    .store
                    .nodes()
                    .iter()
                    .filter(|n| selection::overlaps(n.bounds(size), area))
                    .map(|n| n.id.clone())
                    .collect();
                log::debug!("Rectangle selected {} node(s)", hits.len());
                self.select_many(hits);
            }
            EditorMode::EditingLabel { node, draft } => {
                self.mode = EditorMode::EditingLabel { node, draft };
            }
            EditorMode::DraggingNode { recorded: false, .. } => {
                // A click that never moved selects only the clicked node.
                if let Some(hit) = self.primary.clone() {
                    self.select_only(hit);
                }
            }
            EditorMode::DraggingNode { .. } | EditorMode::Idle => {}
        }
    }

    /// Rectangle being dragged out on the graph canvas.
    pub fn selection_rect(&self) -> Option<Rect> {
        match &self.mode {
            EditorMode::RectangleSelecting { start, current } => {
                Some(selection::drag_rect(*start, *current))
            }
            _ => None,
        }
    }

    /// Handle a key press. Returns `true` if it was consumed.
    pub fn handle_key(&mut self, press: &KeyPress, focus: InputFocus) -> bool {
        if let EditorMode::EditingLabel { .. } = self.mode {
            return match press.key {
                Key::Enter => {
                    self.commit_label_edit();
                    true
                }
                Key::Escape => {
                    self.cancel_label_edit();
                    true
                }
                _ => false,
            };
        }

        let Some(command) = EditorCommand::from_key(press) else {
            return false;
        };

        if let EditorMode::EditingContent(editor) = &mut self.mode {
            if matches!(editor.mode(), crate::content::ContentMode::EditingText { .. }) {
                if command == EditorCommand::Deselect {
                    editor.cancel_text_edit();
                    return true;
                }
                return false;
            }
            return match command {
                EditorCommand::Copy => {
                    let items = editor.copy_selection();
                    if items.is_empty() {
                        return false;
                    }
                    self.clipboard = Some(Clipboard::Elements(items));
                    true
                }
                EditorCommand::Paste => {
                    let Some(Clipboard::Elements(items)) = &mut self.clipboard else {
                        return false;
                    };
                    let pasted = editor.paste(items);
                    let offset = self.config.paste_offset();
                    for item in items.iter_mut() {
                        item.translate(offset);
                    }
                    !pasted.is_empty()
                }
                EditorCommand::Deselect => {
                    if editor.apply_command(command, focus) {
                        true
                    } else {
                        self.close_content_editor();
                        true
                    }
                }
                other => editor.apply_command(other, focus),
            };
        }

        if command.blocked_by_text_focus() && focus == InputFocus::TextInput {
            return false;
        }
        match command {
            EditorCommand::DeleteSelection => self.delete_selection(focus),
            EditorCommand::Copy => self.copy(),
            EditorCommand::Paste => !self.paste().is_empty(),
            EditorCommand::Undo => self.undo(),
            EditorCommand::Duplicate => !self.duplicate().is_empty(),
            EditorCommand::Deselect => {
                self.edge_menu = None;
                let had = !self.selected.is_empty();
                self.clear_selection();
                had
            }
        }
    }
}
