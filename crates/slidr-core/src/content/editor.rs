//! Editor for the content of a single slide.
//!
//! A [`ContentEditor`] works on a private copy of one node's content and
//! keeps its own undo history. Nothing reaches the graph until the session
//! commits the editor's [`SlideContent`] back onto the node.

use super::style::{
    BORDER_RADIUS_RANGE, BORDER_WIDTH_RANGE, DEFAULT_BORDER_WIDTH, FONT_SIZE_RANGE, clamp_to,
};
use super::{
    ApproxTextMeasure, Element, ElementId, ElementIdAllocator, ElementKind, FontStyle, FontWeight,
    ImageElement, ImageError, Paint, ShapeKind, SlideContent, Template, TextAlign,
    TextDecoration, TextElement, TextMeasure, encode_data_url, fit_font_size,
};
use crate::config::EditorConfig;
use crate::graph::{NodeId, SlideNode};
use crate::history::History;
use crate::input::{EditorCommand, InputFocus, Modifiers};
use crate::selection::{self, HANDLE_HIT_TOLERANCE, ResizeHandle};
use crate::viewport::Zoom;
use kurbo::{Point, Rect, Size, Vec2};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Undo entry of the content editor.
#[derive(Debug, Clone, PartialEq)]
struct ContentSnapshot {
    elements: Vec<Element>,
    background: Paint,
}

/// What the pointer is currently doing on the content canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentMode {
    Idle,
    Dragging {
        id: ElementId,
        /// Pointer position relative to the element's origin.
        grab: Vec2,
        /// Whether an undo entry was recorded for this drag.
        recorded: bool,
    },
    Resizing {
        id: ElementId,
        handle: ResizeHandle,
        start_frame: Rect,
        start_pointer: Point,
        recorded: bool,
    },
    RectangleSelecting {
        start: Point,
        current: Point,
    },
    EditingText {
        id: ElementId,
        draft: String,
        /// Font size the draft is displayed at.
        display_size: f64,
    },
}

/// A style change applied to every selected element that supports it.
#[derive(Debug, Clone, PartialEq)]
pub enum StylePatch {
    FontFamily(String),
    FontSize(f64),
    ToggleBold,
    ToggleItalic,
    ToggleUnderline,
    Align(TextAlign),
    TextColor(Paint),
    Fill(Paint),
    BorderColor(Paint),
    BorderWidth(f64),
    BorderRadius(f64),
    Padding(f64),
}

fn apply_patch(element: &mut Element, patch: &StylePatch) -> bool {
    match (&mut element.kind, patch) {
        (ElementKind::Text(t), StylePatch::FontFamily(family)) => t.font_family = family.clone(),
        (ElementKind::Text(t), StylePatch::FontSize(size)) => {
            t.font_size = clamp_to(&FONT_SIZE_RANGE, *size);
            t.fitted_font_size = None;
        }
        (ElementKind::Text(t), StylePatch::ToggleBold) => {
            t.font_weight = match t.font_weight {
                FontWeight::Bold => FontWeight::Normal,
                FontWeight::Normal => FontWeight::Bold,
            }
        }
        (ElementKind::Text(t), StylePatch::ToggleItalic) => {
            t.font_style = match t.font_style {
                FontStyle::Italic => FontStyle::Normal,
                FontStyle::Normal => FontStyle::Italic,
            }
        }
        (ElementKind::Text(t), StylePatch::ToggleUnderline) => {
            t.text_decoration = match t.text_decoration {
                TextDecoration::Underline => TextDecoration::None,
                TextDecoration::None => TextDecoration::Underline,
            }
        }
        (ElementKind::Text(t), StylePatch::Align(align)) => t.align = *align,
        (ElementKind::Text(t), StylePatch::TextColor(color)) => t.color = color.clone(),
        (ElementKind::Text(t), StylePatch::Fill(fill)) => t.background_color = fill.clone(),
        (ElementKind::Text(t), StylePatch::BorderRadius(r)) => {
            t.border_radius = clamp_to(&BORDER_RADIUS_RANGE, *r)
        }
        (ElementKind::Text(t), StylePatch::Padding(p)) => t.padding = p.max(0.0),
        (ElementKind::Rectangle(s), StylePatch::Fill(fill)) => s.background_color = fill.clone(),
        (ElementKind::Rectangle(s), StylePatch::BorderRadius(r)) => {
            s.border_radius = clamp_to(&BORDER_RADIUS_RANGE, *r)
        }
        (ElementKind::Rectangle(s), StylePatch::BorderWidth(w)) => {
            s.border_width = clamp_to(&BORDER_WIDTH_RANGE, *w)
        }
        (ElementKind::Rectangle(s), StylePatch::BorderColor(color)) => {
            s.border_color = color.clone();
            if s.border_width == 0.0 {
                s.border_width = DEFAULT_BORDER_WIDTH;
            }
        }
        (ElementKind::Circle(s), StylePatch::Fill(fill)) => s.background_color = fill.clone(),
        (ElementKind::Circle(s), StylePatch::BorderWidth(w)) => {
            s.border_width = clamp_to(&BORDER_WIDTH_RANGE, *w)
        }
        (ElementKind::Circle(s), StylePatch::BorderColor(color)) => {
            s.border_color = color.clone();
            if s.border_width == 0.0 {
                s.border_width = DEFAULT_BORDER_WIDTH;
            }
        }
        (
            ElementKind::Triangle(s) | ElementKind::Line(s) | ElementKind::Arrow(s),
            StylePatch::Fill(fill),
        ) => s.background_color = fill.clone(),
        (ElementKind::Image(img), StylePatch::BorderRadius(r)) => {
            img.border_radius = clamp_to(&BORDER_RADIUS_RANGE, *r)
        }
        _ => return false,
    }
    true
}

/// Editing state for one slide's content.
#[derive(Debug, Clone)]
pub struct ContentEditor {
    node: NodeId,
    title: Option<String>,
    elements: Vec<Element>,
    background: Paint,
    extra: Map<String, Value>,
    history: History<ContentSnapshot>,
    /// Primary selection; receives resize handles and style edits first.
    primary: Option<ElementId>,
    /// Full selection in selection order.
    selected: Vec<ElementId>,
    mode: ContentMode,
    zoom: Zoom,
    editing_background: bool,
    ids: ElementIdAllocator,
    measure: Arc<dyn TextMeasure>,
    canvas: Size,
    min_size: f64,
    paste_offset: Vec2,
    font_floor: f64,
    dirty: bool,
}

impl ContentEditor {
    /// Open an editor on a copy of `node`'s content.
    pub fn open(node: &SlideNode, config: &EditorConfig, ids: ElementIdAllocator) -> Self {
        let mut ids = ids;
        ids.observe_content(&node.content);
        Self {
            node: node.id.clone(),
            title: node.content.title.clone(),
            elements: node.content.elements.clone(),
            background: node.content.background.clone(),
            extra: node.content.extra.clone(),
            history: History::with_capacity(config.content_history_capacity),
            primary: None,
            selected: Vec::new(),
            mode: ContentMode::Idle,
            zoom: Zoom::new(config.zoom_min, config.zoom_max, config.zoom_step),
            editing_background: false,
            ids,
            measure: Arc::new(ApproxTextMeasure::default()),
            canvas: config.canvas_size(),
            min_size: config.min_element_size,
            paste_offset: config.paste_offset(),
            font_floor: config.font_fit_floor,
            dirty: false,
        }
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn background(&self) -> &Paint {
        &self.background
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn mode(&self) -> &ContentMode {
        &self.mode
    }

    pub fn primary(&self) -> Option<ElementId> {
        self.primary
    }

    pub fn selection(&self) -> &[ElementId] {
        &self.selected
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selected.contains(&id)
    }

    pub fn is_editing_background(&self) -> bool {
        self.editing_background
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn zoom(&self) -> &Zoom {
        &self.zoom
    }

    pub fn zoom_mut(&mut self) -> &mut Zoom {
        &mut self.zoom
    }

    /// Replace the text measurer used by the font fitter.
    pub fn set_measure(&mut self, measure: impl TextMeasure + 'static) {
        self.measure = Arc::new(measure);
    }

    /// Element id counter, to be merged back into the session.
    pub fn allocator(&self) -> ElementIdAllocator {
        self.ids
    }

    /// The edited content, ready to be stored on the node.
    pub fn to_content(&self) -> SlideContent {
        SlideContent {
            title: self.title.clone(),
            elements: self.elements.clone(),
            background: self.background.clone(),
            extra: self.extra.clone(),
        }
    }

    fn snapshot(&self) -> ContentSnapshot {
        ContentSnapshot {
            elements: self.elements.clone(),
            background: self.background.clone(),
        }
    }

    fn push_history(&mut self) {
        let snapshot = self.snapshot();
        self.history.push(snapshot);
        self.dirty = true;
    }

    fn select_only(&mut self, id: ElementId) {
        self.primary = Some(id);
        self.selected = vec![id];
        self.editing_background = false;
    }

    fn select_many(&mut self, ids: Vec<ElementId>) {
        self.primary = ids.first().copied();
        self.selected = ids;
        self.editing_background = false;
    }

    /// Select a single element.
    pub fn select(&mut self, id: ElementId) -> bool {
        if self.element(id).is_none() {
            return false;
        }
        self.select_only(id);
        true
    }

    pub fn clear_selection(&mut self) {
        self.primary = None;
        self.selected.clear();
    }

    fn push_element(&mut self, frame: Rect, kind: ElementKind) -> ElementId {
        self.push_history();
        let id = self.ids.allocate();
        self.elements.push(Element::new(id, frame, kind));
        self.select_only(id);
        log::debug!("Added element {} to {}", id, self.node);
        id
    }

    /// Add an empty text box.
    pub fn add_text(&mut self) -> ElementId {
        self.push_element(
            Rect::new(100.0, 100.0, 400.0, 150.0),
            ElementKind::Text(TextElement::default()),
        )
    }

    /// Add a shape with default styling.
    pub fn add_shape(&mut self, kind: ShapeKind) -> ElementId {
        let size = match kind {
            ShapeKind::Line => Size::new(200.0, 4.0),
            _ => Size::new(120.0, 120.0),
        };
        self.push_element(
            Rect::from_origin_size(Point::new(150.0, 150.0), size),
            ElementKind::shape(kind),
        )
    }

    /// Add an image from a `data:` URL (or any URL the host can display).
    pub fn add_image(&mut self, src: impl Into<String>) -> ElementId {
        self.push_element(
            Rect::new(100.0, 100.0, 350.0, 280.0),
            ElementKind::Image(ImageElement {
                src: src.into(),
                border_radius: 8.0,
            }),
        )
    }

    /// Add an image from raw file bytes.
    pub fn add_image_bytes(&mut self, data: &[u8]) -> Result<ElementId, ImageError> {
        let url = encode_data_url(data)?;
        Ok(self.add_image(url))
    }

    /// Replace the slide's elements and background with a template.
    pub fn apply_template(&mut self, template: Template) {
        self.push_history();
        self.elements = template.elements(&mut self.ids);
        self.background = template.background();
        self.clear_selection();
        self.mode = ContentMode::Idle;
        log::debug!("Applied {:?} template to {}", template, self.node);
    }

    pub fn set_background(&mut self, paint: Paint) {
        if self.background == paint {
            return;
        }
        self.push_history();
        self.background = paint;
    }

    /// Set the slide title. Blank clears it.
    pub fn set_title(&mut self, title: &str) {
        let title = title.trim();
        self.title = if title.is_empty() {
            None
        } else {
            Some(title.to_string())
        };
        self.dirty = true;
    }

    /// Remove every selected element.
    pub fn delete_selected(&mut self) -> bool {
        if self.selected.is_empty() {
            return false;
        }
        self.push_history();
        let doomed = std::mem::take(&mut self.selected);
        self.elements.retain(|e| !doomed.contains(&e.id));
        self.primary = None;
        log::debug!("Deleted {} element(s) from {}", doomed.len(), self.node);
        true
    }

    /// Copy the selected elements, offset, with fresh ids. The copies become
    /// the selection.
    pub fn duplicate_selected(&mut self) -> Vec<ElementId> {
        let copies = self.copy_selection();
        if copies.is_empty() {
            return Vec::new();
        }
        self.insert_copies(&copies)
    }

    /// Deep copies of the selected elements, in z-order.
    pub fn copy_selection(&self) -> Vec<Element> {
        self.elements
            .iter()
            .filter(|e| self.selected.contains(&e.id))
            .cloned()
            .collect()
    }

    /// Paste clipboard elements at their position plus the paste offset,
    /// with fresh ids.
    pub fn paste(&mut self, items: &[Element]) -> Vec<ElementId> {
        if items.is_empty() {
            return Vec::new();
        }
        self.insert_copies(items)
    }

    fn insert_copies(&mut self, items: &[Element]) -> Vec<ElementId> {
        self.push_history();
        let mut ids = Vec::with_capacity(items.len());
        for item in items {
            let mut copy = item.clone();
            copy.id = self.ids.allocate();
            copy.translate(self.paste_offset);
            ids.push(copy.id);
            self.elements.push(copy);
        }
        self.select_many(ids.clone());
        ids
    }

    /// Apply a style change to the selection. Returns whether anything changed.
    pub fn restyle(&mut self, patch: StylePatch) -> bool {
        let before = self.snapshot();
        let targets = self.selected.clone();
        let mut changed = false;
        for id in targets {
            if let Some(element) = self.element_mut(id) {
                changed |= apply_patch(element, &patch);
            }
        }
        if changed {
            self.history.push(before);
            self.dirty = true;
        }
        changed
    }

    /// Restore the previous snapshot.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.pop() else {
            return false;
        };
        self.elements = snapshot.elements;
        self.background = snapshot.background;
        self.clear_selection();
        self.mode = ContentMode::Idle;
        self.dirty = true;
        true
    }

    /// Run a keyboard command that needs no clipboard.
    pub fn apply_command(&mut self, command: EditorCommand, focus: InputFocus) -> bool {
        if command.blocked_by_text_focus() && focus == InputFocus::TextInput {
            return false;
        }
        match command {
            EditorCommand::DeleteSelection => self.delete_selected(),
            EditorCommand::Duplicate => !self.duplicate_selected().is_empty(),
            EditorCommand::Undo => self.undo(),
            EditorCommand::Deselect => {
                let had = !self.selected.is_empty();
                self.clear_selection();
                had
            }
            EditorCommand::Copy | EditorCommand::Paste => false,
        }
    }

    fn element_at(&self, point: Point) -> Option<ElementId> {
        self.elements
            .iter()
            .rev()
            .find(|e| e.frame().contains(point))
            .map(|e| e.id)
    }

    /// Pointer pressed at `screen` (relative to the zoomed canvas origin).
    pub fn pointer_down(&mut self, screen: Point, modifiers: Modifiers) {
        if matches!(self.mode, ContentMode::EditingText { .. }) {
            self.commit_text_edit();
        }
        let point = self.zoom.screen_to_canvas(screen);

        let primary_frame = self
            .primary
            .and_then(|id| self.element(id).map(|e| (id, e.frame())));
        if let Some((id, frame)) = primary_frame {
            let tolerance = HANDLE_HIT_TOLERANCE / self.zoom.level();
            if let Some(handle) = selection::hit_test_handle(frame, point, tolerance) {
                self.mode = ContentMode::Resizing {
                    id,
                    handle,
                    start_frame: frame,
                    start_pointer: point,
                    recorded: false,
                };
                return;
            }
        }

        if let Some(id) = self.element_at(point) {
            let origin = self.element(id).map(|e| e.origin()).unwrap_or(point);
            self.primary = Some(id);
            if !self.selected.contains(&id) {
                self.selected = vec![id];
            }
            self.editing_background = false;
            self.mode = ContentMode::Dragging {
                id,
                grab: point - origin,
                recorded: false,
            };
            return;
        }

        if modifiers.alt {
            self.mode = ContentMode::RectangleSelecting {
                start: point,
                current: point,
            };
        } else {
            self.clear_selection();
            self.editing_background = true;
            self.mode = ContentMode::Idle;
        }
    }

    /// Pointer moved to `screen`. Pointer capture is global, so this keeps
    /// working when the pointer leaves the element.
    pub fn pointer_move(&mut self, screen: Point) {
        let point = self.zoom.screen_to_canvas(screen);
        let mode = std::mem::replace(&mut self.mode, ContentMode::Idle);
        self.mode = match mode {
            ContentMode::Dragging { id, grab, recorded } => {
                let canvas = self.canvas;
                let target = self.element(id).map(|element| {
                    let size = Size::new(element.width, element.height);
                    (element.origin(), selection::clamp_move(point - grab, size, canvas))
                });
                let mut recorded = recorded;
                if let Some((current, origin)) = target {
                    if origin != current {
                        if !recorded {
                            self.push_history();
                            recorded = true;
                        }
                        if let Some(element) = self.element_mut(id) {
                            element.x = origin.x;
                            element.y = origin.y;
                        }
                    }
                }
                ContentMode::Dragging { id, grab, recorded }
            }
            ContentMode::Resizing {
                id,
                handle,
                start_frame,
                start_pointer,
                recorded,
            } => {
                let frame = selection::apply_resize(start_frame, handle, point - start_pointer, self.min_size);
                let mut recorded = recorded;
                let changed = self.element(id).is_some_and(|element| element.frame() != frame);
                if changed {
                    if !recorded {
                        self.push_history();
                        recorded = true;
                    }
                    if let Some(element) = self.element_mut(id) {
                        element.set_frame(frame);
                    }
                }
                ContentMode::Resizing {
                    id,
                    handle,
                    start_frame,
                    start_pointer,
                    recorded,
                }
            }
            ContentMode::RectangleSelecting { start, .. } => ContentMode::RectangleSelecting {
                start,
                current: point,
            },
            other => other,
        };
    }

    /// Pointer released at `screen`.
    pub fn pointer_up(&mut self, screen: Point) {
        let point = self.zoom.screen_to_canvas(screen);
        let mode = std::mem::replace(&mut self.mode, ContentMode::Idle);
        match mode {
            ContentMode::RectangleSelecting { start, .. } => {
                let area = selection::drag_rect(start, point);
                let hits: Vec<ElementId> = self
                    .elements
                    .iter()
                    .filter(|e| selection::overlaps(e.frame(), area))
                    .map(|e| e.id)
                    .collect();
                log::debug!("Rectangle selected {} element(s)", hits.len());
                self.select_many(hits);
            }
            ContentMode::Resizing { id, recorded: true, .. } => self.refit_text(id),
            editing @ ContentMode::EditingText { .. } => self.mode = editing,
            _ => {}
        }
    }

    /// Rectangle currently being dragged out, in canvas units.
    pub fn selection_rect(&self) -> Option<Rect> {
        match self.mode {
            ContentMode::RectangleSelecting { start, current } => {
                Some(selection::drag_rect(start, current))
            }
            _ => None,
        }
    }

    /// Double-click: start editing the text element under the pointer.
    pub fn double_click(&mut self, screen: Point) -> bool {
        let point = self.zoom.screen_to_canvas(screen);
        match self.element_at(point) {
            Some(id) => self.begin_text_edit(id),
            None => false,
        }
    }

    /// Enter text editing on a text element.
    pub fn begin_text_edit(&mut self, id: ElementId) -> bool {
        let Some(text) = self.element(id).and_then(Element::as_text) else {
            return false;
        };
        let draft = text.content.clone();
        let display_size = text.display_font_size();
        self.select_only(id);
        self.mode = ContentMode::EditingText {
            id,
            draft,
            display_size,
        };
        true
    }

    fn fitted_size(&self, element: &Element, text: &str) -> Option<f64> {
        let style = element.as_text()?;
        Some(fit_font_size(
            self.measure.as_ref(),
            text,
            style.font_size,
            Size::new(element.width, element.height),
            style.padding,
            self.font_floor,
        ))
    }

    /// Update the draft while typing, shrinking the displayed size if the
    /// text overflows its box. Returns the size to display.
    pub fn text_input(&mut self, draft: &str) -> Option<f64> {
        let ContentMode::EditingText { id, .. } = self.mode else {
            return None;
        };
        let size = self
            .element(id)
            .and_then(|element| self.fitted_size(element, draft))?;
        self.mode = ContentMode::EditingText {
            id,
            draft: draft.to_string(),
            display_size: size,
        };
        Some(size)
    }

    /// Store the draft and its fitted size on the element.
    pub fn commit_text_edit(&mut self) -> bool {
        let (id, draft) = match std::mem::replace(&mut self.mode, ContentMode::Idle) {
            ContentMode::EditingText { id, draft, .. } => (id, draft),
            other => {
                self.mode = other;
                return false;
            }
        };
        let Some(size) = self
            .element(id)
            .and_then(|element| self.fitted_size(element, &draft))
        else {
            return false;
        };
        let unchanged = self
            .element(id)
            .and_then(Element::as_text)
            .map(|t| t.content == draft && t.display_font_size() == size)
            .unwrap_or(true);
        if unchanged {
            return false;
        }
        self.push_history();
        if let Some(text) = self.element_mut(id).and_then(Element::as_text_mut) {
            text.content = draft;
            text.fitted_font_size = (size < text.font_size).then_some(size);
        }
        true
    }

    /// Leave text editing without storing the draft.
    pub fn cancel_text_edit(&mut self) {
        if matches!(self.mode, ContentMode::EditingText { .. }) {
            self.mode = ContentMode::Idle;
        }
    }

    fn refit_text(&mut self, id: ElementId) {
        let Some(element) = self.element(id) else {
            return;
        };
        let Some(content) = element.as_text().map(|t| t.content.clone()) else {
            return;
        };
        let Some(size) = self.fitted_size(element, &content) else {
            return;
        };
        if let Some(text) = self.element_mut(id).and_then(Element::as_text_mut) {
            text.fitted_font_size = (size < text.font_size).then_some(size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> ContentEditor {
        let node = SlideNode::new("slide-1".into(), Point::ZERO);
        ContentEditor::open(&node, &EditorConfig::default(), ElementIdAllocator::new())
    }

    fn editor_with(frames: &[Rect]) -> (ContentEditor, Vec<ElementId>) {
        let mut ed = editor();
        let ids = frames
            .iter()
            .map(|frame| {
                let id = ed.add_shape(ShapeKind::Rectangle);
                if let Some(element) = ed.element_mut(id) {
                    element.set_frame(*frame);
                }
                id
            })
            .collect();
        ed.clear_selection();
        (ed, ids)
    }

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect::new(x, y, x + w, y + h)
    }

    #[test]
    fn test_add_defaults() {
        let mut ed = editor();
        let text = ed.add_text();
        let line = ed.add_shape(ShapeKind::Line);
        let circle = ed.add_shape(ShapeKind::Circle);
        assert_eq!(ed.element(text).unwrap().frame(), rect(100.0, 100.0, 300.0, 50.0));
        assert_eq!(ed.element(line).unwrap().frame(), rect(150.0, 150.0, 200.0, 4.0));
        assert_eq!(ed.element(circle).unwrap().width, 120.0);
        assert_eq!(ed.primary(), Some(circle));
        assert!(text < line && line < circle);
    }

    #[test]
    fn test_rectangle_select_overlap() {
        let (mut ed, ids) = editor_with(&[rect(0.0, 0.0, 50.0, 50.0), rect(100.0, 100.0, 50.0, 50.0)]);
        // A drag starting on an element moves it, so enter the mode directly.
        ed.mode = ContentMode::RectangleSelecting {
            start: Point::new(0.0, 0.0),
            current: Point::new(0.0, 0.0),
        };
        ed.pointer_move(Point::new(60.0, 60.0));
        ed.pointer_up(Point::new(60.0, 60.0));
        assert_eq!(ed.selection(), &[ids[0]]);
    }

    #[test]
    fn test_alt_drag_on_empty_canvas_selects() {
        let (mut ed, ids) = editor_with(&[rect(400.0, 300.0, 50.0, 50.0), rect(600.0, 400.0, 50.0, 50.0)]);
        ed.pointer_down(Point::new(380.0, 280.0), Modifiers::ALT);
        ed.pointer_move(Point::new(700.0, 480.0));
        assert!(ed.selection_rect().is_some());
        ed.pointer_up(Point::new(700.0, 480.0));
        assert_eq!(ed.selection(), &[ids[0], ids[1]]);
        assert_eq!(ed.primary(), Some(ids[0]));
    }

    #[test]
    fn test_plain_click_on_canvas_edits_background() {
        let (mut ed, ids) = editor_with(&[rect(0.0, 0.0, 50.0, 50.0)]);
        ed.select(ids[0]);
        ed.pointer_down(Point::new(400.0, 400.0), Modifiers::NONE);
        assert!(ed.selection().is_empty());
        assert!(ed.is_editing_background());
    }

    #[test]
    fn test_drag_is_clamped_and_undoable() {
        let (mut ed, ids) = editor_with(&[rect(10.0, 10.0, 100.0, 50.0)]);
        ed.pointer_down(Point::new(20.0, 20.0), Modifiers::NONE);
        ed.pointer_move(Point::new(2000.0, -300.0));
        ed.pointer_up(Point::new(2000.0, -300.0));
        assert_eq!(ed.element(ids[0]).unwrap().origin(), Point::new(700.0, 0.0));
        assert!(ed.undo());
        assert_eq!(ed.element(ids[0]).unwrap().origin(), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_click_without_move_records_nothing() {
        let (mut ed, _) = editor_with(&[rect(10.0, 10.0, 100.0, 50.0)]);
        let depth = ed.history.len();
        ed.pointer_down(Point::new(20.0, 20.0), Modifiers::NONE);
        ed.pointer_up(Point::new(20.0, 20.0));
        assert_eq!(ed.history.len(), depth);
    }

    #[test]
    fn test_zero_length_moves_record_nothing() {
        let (mut ed, ids) = editor_with(&[rect(10.0, 10.0, 100.0, 50.0)]);
        let depth = ed.history.len();
        ed.pointer_down(Point::new(20.0, 20.0), Modifiers::NONE);
        ed.pointer_move(Point::new(20.0, 20.0));
        ed.pointer_up(Point::new(20.0, 20.0));
        assert_eq!(ed.history.len(), depth);

        ed.select(ids[0]);
        ed.pointer_down(Point::new(10.0, 35.0), Modifiers::NONE);
        assert!(matches!(ed.mode(), ContentMode::Resizing { .. }));
        ed.pointer_move(Point::new(10.0, 35.0));
        ed.pointer_up(Point::new(10.0, 35.0));
        assert_eq!(ed.history.len(), depth);

        ed.pointer_down(Point::new(20.0, 20.0), Modifiers::NONE);
        ed.pointer_move(Point::new(20.0, 20.0));
        ed.pointer_move(Point::new(30.0, 20.0));
        ed.pointer_move(Point::new(40.0, 20.0));
        ed.pointer_up(Point::new(40.0, 20.0));
        assert_eq!(ed.history.len(), depth + 1);
    }

    #[test]
    fn test_resize_from_west_handle_with_floor() {
        let (mut ed, ids) = editor_with(&[rect(100.0, 100.0, 100.0, 100.0)]);
        ed.select(ids[0]);
        ed.pointer_down(Point::new(100.0, 150.0), Modifiers::NONE);
        assert!(matches!(ed.mode(), ContentMode::Resizing { handle: ResizeHandle::W, .. }));
        ed.pointer_move(Point::new(400.0, 150.0));
        ed.pointer_up(Point::new(400.0, 150.0));
        let frame = ed.element(ids[0]).unwrap().frame();
        assert_eq!(frame, rect(180.0, 100.0, 20.0, 100.0));
    }

    #[test]
    fn test_zoom_converts_pointer() {
        let (mut ed, ids) = editor_with(&[rect(100.0, 100.0, 50.0, 50.0)]);
        ed.zoom_mut().set(2.0);
        ed.pointer_down(Point::new(250.0, 250.0), Modifiers::NONE);
        assert_eq!(ed.primary(), Some(ids[0]));
    }

    #[test]
    fn test_paste_uses_fresh_increasing_ids() {
        let (mut ed, ids) = editor_with(&[rect(0.0, 0.0, 50.0, 50.0), rect(100.0, 0.0, 50.0, 50.0)]);
        ed.select_many(ids.clone());
        let clip = ed.copy_selection();
        let first = ed.paste(&clip);
        let second = ed.paste(&clip);
        assert!(ids.iter().all(|a| first.iter().all(|b| a < b)));
        assert!(first.iter().all(|a| second.iter().all(|b| a < b)));
        assert_eq!(ed.element(first[1]).unwrap().x - ed.element(first[0]).unwrap().x, 100.0);
        assert_eq!(ed.element(first[0]).unwrap().origin(), Point::new(20.0, 20.0));
        assert_eq!(ed.selection(), first.as_slice());
    }

    #[test]
    fn test_duplicate_and_delete() {
        let (mut ed, ids) = editor_with(&[rect(10.0, 10.0, 50.0, 50.0)]);
        ed.select(ids[0]);
        let copies = ed.duplicate_selected();
        assert_eq!(copies.len(), 1);
        assert_eq!(ed.element(copies[0]).unwrap().origin(), Point::new(30.0, 30.0));
        assert!(ed.delete_selected());
        assert!(ed.element(copies[0]).is_none());
        assert!(ed.element(ids[0]).is_some());
        assert!(!ed.delete_selected());
    }

    #[test]
    fn test_delete_blocked_in_text_input() {
        let (mut ed, ids) = editor_with(&[rect(10.0, 10.0, 50.0, 50.0)]);
        ed.select(ids[0]);
        assert!(!ed.apply_command(EditorCommand::DeleteSelection, InputFocus::TextInput));
        assert!(ed.element(ids[0]).is_some());
        assert!(ed.apply_command(EditorCommand::DeleteSelection, InputFocus::Canvas));
        assert!(ed.element(ids[0]).is_none());
    }

    #[test]
    fn test_template_is_undoable() {
        let mut ed = editor();
        ed.add_text();
        ed.apply_template(Template::Title);
        assert_eq!(ed.elements().len(), 2);
        assert_eq!(*ed.background(), Paint::rgb(0x1a, 0x1a, 0x2e));
        assert!(ed.undo());
        assert_eq!(ed.elements().len(), 1);
        assert_eq!(*ed.background(), Paint::default());
    }

    #[test]
    fn test_history_capacity() {
        let mut ed = editor();
        for _ in 0..40 {
            ed.add_text();
        }
        let mut undone = 0;
        while ed.undo() {
            undone += 1;
        }
        assert_eq!(undone, 30);
        assert_eq!(ed.elements().len(), 10);
    }

    #[test]
    fn test_restyle_only_applicable() {
        let mut ed = editor();
        let img = ed.add_image("data:image/png;base64,AAAA");
        assert!(!ed.restyle(StylePatch::ToggleBold));
        assert!(ed.restyle(StylePatch::BorderRadius(500.0)));
        match &ed.element(img).unwrap().kind {
            ElementKind::Image(image) => assert_eq!(image.border_radius, 100.0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_restyle_text_toggles() {
        let mut ed = editor();
        let id = ed.add_text();
        assert!(ed.restyle(StylePatch::ToggleBold));
        assert!(ed.restyle(StylePatch::ToggleUnderline));
        assert!(ed.restyle(StylePatch::FontSize(500.0)));
        let text = ed.element(id).unwrap().as_text().unwrap();
        assert_eq!(text.font_weight, FontWeight::Bold);
        assert_eq!(text.text_decoration, TextDecoration::Underline);
        assert_eq!(text.font_size, 120.0);
    }

    #[test]
    fn test_border_color_gives_border() {
        let mut ed = editor();
        let id = ed.add_shape(ShapeKind::Rectangle);
        ed.restyle(StylePatch::BorderColor(Paint::rgb(255, 0, 0)));
        match &ed.element(id).unwrap().kind {
            ElementKind::Rectangle(s) => assert_eq!(s.border_width, DEFAULT_BORDER_WIDTH),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_text_fit_live_and_on_commit() {
        let mut ed = editor();
        let id = ed.add_text();
        assert!(ed.begin_text_edit(id));
        assert_eq!(ed.text_input("Hello"), Some(24.0));
        let long = "overflowing text ".repeat(6);
        let shrunk = ed.text_input(&long).unwrap();
        assert!(shrunk < 24.0 && shrunk >= 12.0);
        assert!(ed.commit_text_edit());
        let text = ed.element(id).unwrap().as_text().unwrap();
        assert_eq!(text.content, long);
        assert_eq!(text.fitted_font_size, Some(shrunk));
        assert_eq!(text.font_size, 24.0);

        assert!(ed.begin_text_edit(id));
        assert_eq!(ed.text_input("Short"), Some(24.0));
        assert!(ed.commit_text_edit());
        assert_eq!(ed.element(id).unwrap().as_text().unwrap().fitted_font_size, None);
    }

    #[test]
    fn test_huge_loaded_font_size_fits() {
        let mut node = SlideNode::new("slide-1".into(), Point::ZERO);
        node.content.elements.push(Element::new(
            ElementId(1),
            Rect::new(100.0, 100.0, 400.0, 150.0),
            ElementKind::Text(TextElement {
                font_size: 1e17,
                ..TextElement::new("Big")
            }),
        ));
        let mut ed = ContentEditor::open(&node, &EditorConfig::default(), ElementIdAllocator::new());
        assert!(ed.begin_text_edit(ElementId(1)));
        let size = ed.text_input("Bigger").unwrap();
        assert!(size <= *FONT_SIZE_RANGE.end());
        assert!(ed.commit_text_edit());
    }

    #[derive(Debug)]
    struct OverflowingMeasure;

    impl TextMeasure for OverflowingMeasure {
        fn measure_height(&self, _text: &str, _font_size: f64, _max_width: f64) -> f64 {
            f64::MAX
        }
    }

    #[test]
    fn test_host_measure_is_used() {
        let mut ed = editor();
        ed.set_measure(OverflowingMeasure);
        let id = ed.add_text();
        assert!(ed.begin_text_edit(id));
        assert_eq!(ed.text_input("x"), Some(12.0));
    }

    #[test]
    fn test_double_click_edits_text_only() {
        let mut ed = editor();
        let text = ed.add_text();
        ed.add_shape(ShapeKind::Rectangle);
        assert!(!ed.double_click(Point::new(200.0, 200.0)));
        assert!(ed.double_click(Point::new(110.0, 110.0)));
        assert!(matches!(ed.mode(), ContentMode::EditingText { id, .. } if *id == text));
    }

    #[test]
    fn test_to_content_keeps_extra_and_title() {
        let mut node = SlideNode::new("slide-2".into(), Point::ZERO);
        node.content.extra.insert("label".into(), Value::from("legacy"));
        let mut ed = ContentEditor::open(&node, &EditorConfig::default(), ElementIdAllocator::new());
        ed.set_title("Intro");
        ed.set_background(Paint::parse("linear-gradient(90deg, #000000 0%, #ffffff 100%)"));
        let content = ed.to_content();
        assert_eq!(content.title.as_deref(), Some("Intro"));
        assert!(content.background.is_gradient());
        assert_eq!(content.extra.get("label"), Some(&Value::from("legacy")));
    }

    #[test]
    fn test_image_bytes() {
        let mut ed = editor();
        assert!(ed.add_image_bytes(b"not an image").is_err());
        let id = ed.add_image_bytes(&[0x89, 0x50, 0x4E, 0x47, 0, 0, 0, 0]).unwrap();
        assert_eq!(ed.element(id).unwrap().frame(), rect(100.0, 100.0, 250.0, 180.0));
    }
}
