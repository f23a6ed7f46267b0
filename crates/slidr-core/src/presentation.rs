//! Presentation playback: walking the slide graph.
//!
//! The engine plays a snapshot of the graph taken when the presentation
//! starts, so edits made elsewhere never disturb a running show.

use crate::config::EditorConfig;
use crate::graph::{EdgeDirection, GraphStore, NodeId, SlideNode};
use crate::input::{Instant, KeyPress, PresentationCommand};
use crate::viewport::SlideViewport;
use kurbo::Size;
use std::time::Duration;
use thiserror::Error;

/// Number of next slides reachable with a digit shortcut.
pub const MAX_SHORTCUTS: usize = 9;

/// How long a notice takes to fade out at the end of its lifetime.
const NOTICE_FADE: Duration = Duration::from_millis(500);

/// Rejected navigation requests. State is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("Presentation is closed")]
    Closed,

    #[error("No slides to present")]
    Empty,

    #[error("{0} is not a next slide")]
    NotANextSlide(NodeId),

    #[error("More than one next slide, pick one")]
    NoSingleNext,

    #[error("No next slide numbered {0}")]
    NoSuchChoice(usize),

    #[error("Already at the first slide of the path")]
    NoHistory,

    #[error("Cannot go back: the link from {from} to {to} is one-way")]
    ReverseBlocked { from: NodeId, to: NodeId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
}

/// Transient message shown over the slide.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
    shown_at: Instant,
    duration: Duration,
}

impl Notice {
    fn new(message: String, kind: NoticeKind, now: Instant, duration: Duration) -> Self {
        Self {
            message,
            kind,
            shown_at: now,
            duration,
        }
    }

    /// Opacity in `0.0..=1.0`, fading out near the end.
    pub fn opacity(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.shown_at);
        let fade_start = self.duration.saturating_sub(NOTICE_FADE);
        if elapsed < fade_start {
            1.0
        } else if elapsed < self.duration {
            let fade = (self.duration - fade_start).as_secs_f64();
            1.0 - (elapsed - fade_start).as_secs_f64() / fade
        } else {
            0.0
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= self.duration
    }
}

/// What the viewer should offer at the current slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// The deck has no slides.
    Empty,
    Closed,
    /// No outgoing edges: only back (if legal) or close remain.
    EndOfPath,
    /// Exactly one next slide; the generic "next" input follows it.
    SingleNext,
    /// Several next slides; one must be chosen.
    Branch(usize),
}

/// Traversal state machine over a snapshot of the slide graph.
#[derive(Debug, Clone)]
pub struct PresentationEngine {
    deck: GraphStore,
    current: Option<NodeId>,
    history: Vec<NodeId>,
    open: bool,
    show_navigation: bool,
    fullscreen: bool,
    notice: Option<Notice>,
    notice_duration: Duration,
    viewport: SlideViewport,
}

impl PresentationEngine {
    /// Start playback at `start`, or at the first-slide marker, or at the
    /// first node.
    pub fn start(store: &GraphStore, start: Option<&NodeId>, config: &EditorConfig) -> Self {
        let deck = store.clone();
        let current = match start {
            Some(id) if deck.contains_node(id) => Some(id.clone()),
            Some(id) => {
                log::warn!("Start slide {} not found, using the default start", id);
                deck.start_node().cloned()
            }
            None => deck.start_node().cloned(),
        };
        log::info!(
            "Presentation started at {}",
            current.as_ref().map_or("<empty deck>", |id| id.as_str())
        );
        Self {
            deck,
            current,
            history: Vec::new(),
            open: true,
            show_navigation: true,
            fullscreen: false,
            notice: None,
            notice_duration: config.notice_duration(),
            viewport: SlideViewport::new(config.canvas_size(), config.scale_cap),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn current(&self) -> Option<&NodeId> {
        self.current.as_ref()
    }

    pub fn current_slide(&self) -> Option<&SlideNode> {
        self.current.as_ref().and_then(|id| self.deck.node(id))
    }

    /// Previously visited slides, oldest first.
    pub fn history(&self) -> &[NodeId] {
        &self.history
    }

    /// Slides reachable over one outgoing edge, in edge creation order.
    pub fn next_slides(&self) -> Vec<&SlideNode> {
        let Some(current) = &self.current else {
            return Vec::new();
        };
        self.deck
            .outgoing(current)
            .filter_map(|edge| self.deck.node(&edge.target))
            .collect()
    }

    /// Next slides paired with their digit shortcut (1-based).
    pub fn shortcut_choices(&self) -> Vec<(usize, &SlideNode)> {
        self.next_slides()
            .into_iter()
            .take(MAX_SHORTCUTS)
            .enumerate()
            .map(|(i, node)| (i + 1, node))
            .collect()
    }

    pub fn status(&self) -> PlaybackStatus {
        if !self.open {
            return PlaybackStatus::Closed;
        }
        if self.current.is_none() {
            return PlaybackStatus::Empty;
        }
        match self.next_slides().len() {
            0 => PlaybackStatus::EndOfPath,
            1 => PlaybackStatus::SingleNext,
            n => PlaybackStatus::Branch(n),
        }
    }

    fn playing(&self) -> Result<&NodeId, NavigationError> {
        if !self.open {
            return Err(NavigationError::Closed);
        }
        self.current.as_ref().ok_or(NavigationError::Empty)
    }

    /// Move to `target`, which must be a next slide of the current one.
    pub fn advance(&mut self, target: &NodeId) -> Result<(), NavigationError> {
        let current = self.playing()?.clone();
        if self.deck.find_edge(&current, target).is_none() || !self.deck.contains_node(target) {
            return Err(NavigationError::NotANextSlide(target.clone()));
        }
        log::debug!("Advance {} -> {}", current, target);
        self.history.push(current);
        self.current = Some(target.clone());
        Ok(())
    }

    /// Follow the only outgoing edge.
    pub fn advance_single(&mut self) -> Result<(), NavigationError> {
        self.playing()?;
        let target = match self.next_slides().as_slice() {
            [only] => only.id.clone(),
            _ => return Err(NavigationError::NoSingleNext),
        };
        self.advance(&target)
    }

    /// Follow the `choice`-th next slide (1-based).
    pub fn choose(&mut self, choice: usize) -> Result<(), NavigationError> {
        self.playing()?;
        let target = choice
            .checked_sub(1)
            .and_then(|i| self.next_slides().get(i).map(|n| n.id.clone()))
            .ok_or(NavigationError::NoSuchChoice(choice))?;
        self.advance(&target)
    }

    /// Whether [`back`](Self::back) would succeed.
    pub fn can_go_back(&self) -> bool {
        match (self.current.as_ref(), self.history.last()) {
            (Some(current), Some(prev)) => self.reverse_allowed(prev, current),
            _ => false,
        }
    }

    fn reverse_allowed(&self, prev: &NodeId, current: &NodeId) -> bool {
        let forward_is_two_way = self
            .deck
            .find_edge(prev, current)
            .is_some_and(|e| e.direction == EdgeDirection::Bidirectional);
        forward_is_two_way || self.deck.find_edge(current, prev).is_some()
    }

    /// Return to the previous slide of the path.
    ///
    /// Only allowed over a two-way link (or a separate reverse link). A
    /// blocked attempt shows a warning notice and leaves state unchanged.
    pub fn back(&mut self, now: Instant) -> Result<(), NavigationError> {
        let current = self.playing()?.clone();
        let Some(prev) = self.history.last().cloned() else {
            return Err(NavigationError::NoHistory);
        };
        if !self.reverse_allowed(&prev, &current) {
            let err = NavigationError::ReverseBlocked {
                from: prev,
                to: current,
            };
            log::debug!("{}", err);
            self.show_notice(err.to_string(), NoticeKind::Warning, now);
            return Err(err);
        }
        self.history.pop();
        log::debug!("Back {} -> {}", current, prev);
        self.current = Some(prev);
        Ok(())
    }

    /// End the presentation. Further navigation fails with `Closed`.
    pub fn close(&mut self) {
        if self.open {
            log::info!("Presentation closed after {} step(s)", self.history.len());
        }
        self.open = false;
        self.fullscreen = false;
        self.notice = None;
    }

    pub fn show_navigation(&self) -> bool {
        self.show_navigation
    }

    pub fn toggle_navigation(&mut self) {
        self.show_navigation = !self.show_navigation;
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Record the host's fullscreen state.
    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen && self.open;
    }

    pub fn viewport(&self) -> &SlideViewport {
        &self.viewport
    }

    /// The display area changed size.
    pub fn resize(&mut self, container: Size) {
        self.viewport.resize(container);
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    fn show_notice(&mut self, message: String, kind: NoticeKind, now: Instant) {
        self.notice = Some(Notice::new(message, kind, now, self.notice_duration));
    }

    /// Expire the notice. Returns `true` if it was removed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.notice.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.notice = None;
            return true;
        }
        false
    }

    /// Run a keyboard command.
    pub fn apply(&mut self, command: PresentationCommand, now: Instant) -> Result<(), NavigationError> {
        match command {
            PresentationCommand::Close => {
                self.close();
                Ok(())
            }
            PresentationCommand::Back => self.back(now),
            PresentationCommand::Next => self.advance_single(),
            PresentationCommand::Choose(n) => self.choose(n),
            PresentationCommand::ToggleNavigation => {
                self.toggle_navigation();
                Ok(())
            }
        }
    }

    /// Map and run a key press. `None` if the key means nothing here.
    pub fn handle_key(&mut self, press: &KeyPress, now: Instant) -> Option<Result<(), NavigationError>> {
        let command = PresentationCommand::from_key(press)?;
        Some(self.apply(command, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn deck(n: usize) -> (GraphStore, Vec<NodeId>) {
        let mut store = GraphStore::new();
        let ids = (0..n)
            .map(|i| store.add_node(Point::new(i as f64 * 200.0, 0.0)))
            .collect();
        (store, ids)
    }

    fn engine(store: &GraphStore) -> PresentationEngine {
        PresentationEngine::start(store, None, &EditorConfig::default())
    }

    #[test]
    fn test_branching_scenario() {
        let (mut store, ids) = deck(3);
        store.add_edge(&ids[0], &ids[1]);
        store.add_edge(&ids[0], &ids[2]);
        let mut engine = engine(&store);

        assert_eq!(engine.current(), Some(&NodeId::from("slide-1")));
        let next: Vec<&str> = engine.next_slides().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(next, vec!["slide-2", "slide-3"]);
        assert_eq!(engine.status(), PlaybackStatus::Branch(2));
        assert_eq!(engine.advance_single(), Err(NavigationError::NoSingleNext));

        engine.choose(2).unwrap();
        assert_eq!(engine.current(), Some(&ids[2]));
        assert_eq!(engine.history(), &[ids[0].clone()]);
    }

    #[test]
    fn test_start_prefers_override_then_marker() {
        let (mut store, ids) = deck(3);
        store.set_first_slide(Some(ids[1].clone()));
        let config = EditorConfig::default();
        assert_eq!(PresentationEngine::start(&store, None, &config).current(), Some(&ids[1]));
        assert_eq!(
            PresentationEngine::start(&store, Some(&ids[2]), &config).current(),
            Some(&ids[2])
        );
        let missing = NodeId::from("slide-99");
        assert_eq!(
            PresentationEngine::start(&store, Some(&missing), &config).current(),
            Some(&ids[1])
        );
    }

    #[test]
    fn test_isolated_start_is_end_of_path() {
        let (store, _) = deck(1);
        let engine = engine(&store);
        assert_eq!(engine.status(), PlaybackStatus::EndOfPath);
        assert!(!engine.can_go_back());
    }

    #[test]
    fn test_empty_deck() {
        let mut engine = engine(&GraphStore::new());
        assert_eq!(engine.status(), PlaybackStatus::Empty);
        assert_eq!(engine.advance_single(), Err(NavigationError::Empty));
        assert!(engine.current_slide().is_none());
    }

    #[test]
    fn test_back_over_bidirectional_edge() {
        let (mut store, ids) = deck(2);
        let edge = store.add_edge(&ids[0], &ids[1]).unwrap();
        store.set_direction(&edge, EdgeDirection::Bidirectional);
        let mut engine = engine(&store);
        let now = Instant::now();

        engine.advance_single().unwrap();
        assert!(engine.can_go_back());
        engine.back(now).unwrap();
        assert_eq!(engine.current(), Some(&ids[0]));
        assert!(engine.history().is_empty());
        assert_eq!(engine.back(now), Err(NavigationError::NoHistory));
    }

    #[test]
    fn test_back_over_one_way_edge_is_blocked() {
        let (mut store, ids) = deck(2);
        store.add_edge(&ids[0], &ids[1]);
        let mut engine = engine(&store);
        let now = Instant::now();

        engine.advance(&ids[1]).unwrap();
        let err = engine.back(now).unwrap_err();
        assert!(matches!(err, NavigationError::ReverseBlocked { .. }));
        assert_eq!(engine.current(), Some(&ids[1]));
        assert_eq!(engine.history().len(), 1);

        let notice = engine.notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Warning);
        assert!(!engine.tick(now + Duration::from_millis(1000)));
        assert!(engine.tick(now + Duration::from_millis(2500)));
        assert!(engine.notice().is_none());
    }

    #[test]
    fn test_advance_rejects_non_neighbours() {
        let (mut store, ids) = deck(3);
        store.add_edge(&ids[0], &ids[1]);
        let mut engine = engine(&store);
        assert_eq!(
            engine.advance(&ids[2]),
            Err(NavigationError::NotANextSlide(ids[2].clone()))
        );
        assert_eq!(engine.choose(0), Err(NavigationError::NoSuchChoice(0)));
        assert_eq!(engine.choose(2), Err(NavigationError::NoSuchChoice(2)));
        assert_eq!(engine.current(), Some(&ids[0]));
    }

    #[test]
    fn test_snapshot_ignores_later_edits() {
        let (mut store, ids) = deck(2);
        store.add_edge(&ids[0], &ids[1]);
        let engine = engine(&store);
        store.delete_node(&ids[1]);
        assert_eq!(engine.status(), PlaybackStatus::SingleNext);
    }

    #[test]
    fn test_shortcuts_limited_to_nine() {
        let (mut store, ids) = deck(12);
        for target in &ids[1..] {
            store.add_edge(&ids[0], target);
        }
        let engine = engine(&store);
        let choices = engine.shortcut_choices();
        assert_eq!(choices.len(), 9);
        assert_eq!(choices[8].0, 9);
        assert_eq!(choices[8].1.id, ids[9]);
        assert_eq!(engine.status(), PlaybackStatus::Branch(11));
    }

    #[test]
    fn test_keyboard_and_close() {
        let (mut store, ids) = deck(2);
        store.add_edge(&ids[0], &ids[1]);
        let mut engine = engine(&store);
        let now = Instant::now();

        let key = |name| KeyPress::named(name).unwrap();
        assert_eq!(engine.handle_key(&key("x"), now), None);
        assert_eq!(engine.handle_key(&key("h"), now), Some(Ok(())));
        assert!(!engine.show_navigation());
        assert_eq!(engine.handle_key(&key(" "), now), Some(Ok(())));
        assert_eq!(engine.current(), Some(&ids[1]));

        engine.set_fullscreen(true);
        assert_eq!(engine.handle_key(&key("Escape"), now), Some(Ok(())));
        assert_eq!(engine.status(), PlaybackStatus::Closed);
        assert!(!engine.is_fullscreen());
        assert_eq!(engine.back(now), Err(NavigationError::Closed));
    }

    #[test]
    fn test_notice_fades() {
        let now = Instant::now();
        let notice = Notice::new("x".into(), NoticeKind::Info, now, Duration::from_millis(2500));
        assert_eq!(notice.opacity(now), 1.0);
        let half = notice.opacity(now + Duration::from_millis(2250));
        assert!((half - 0.5).abs() < 1e-9);
        assert_eq!(notice.opacity(now + Duration::from_secs(3)), 0.0);
    }

    #[test]
    fn test_resize_updates_scale() {
        let mut engine = engine(&GraphStore::new());
        engine.resize(Size::new(1600.0, 1000.0));
        assert_eq!(engine.viewport().scale(), 2.0);
        engine.resize(Size::new(400.0, 250.0));
        assert_eq!(engine.viewport().scale(), 0.5);
    }
}
