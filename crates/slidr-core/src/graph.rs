//! The slide graph: nodes, directed edges and the first-slide marker.
//!
//! [`GraphStore`] is the single owner of the nodes and edges of the open
//! project. Its mutators keep two invariants at all times:
//!
//! - at most one edge joins any unordered pair of nodes;
//! - every edge endpoint names an existing node.
//!
//! Violations are prevented by construction. A mutation that would break
//! them is a silent no-op rather than an error.

use crate::content::SlideContent;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of generated node ids.
pub const NODE_ID_PREFIX: &str = "slide-";
/// Prefix of generated edge ids.
pub const EDGE_ID_PREFIX: &str = "edge-";

/// Stable identifier of a slide node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trailing number of the id (`slide-12` -> 12).
    pub fn number(&self) -> Option<u64> {
        numeric_suffix(&self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Stable identifier of an edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl EdgeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Digits after the last `-` of an id.
fn numeric_suffix(id: &str) -> Option<u64> {
    let tail = id.rsplit('-').next()?;
    if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    tail.parse().ok()
}

/// Traversal mode of an edge.
///
/// A bidirectional edge is drawn with arrowheads at both ends and may be
/// walked backwards during a presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EdgeDirection {
    #[default]
    Unidirectional,
    Bidirectional,
}

/// A slide placed on the graph canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideNode {
    pub id: NodeId,
    pub position: Point,
    pub content: SlideContent,
}

impl SlideNode {
    pub fn new(id: NodeId, position: Point) -> Self {
        Self {
            id,
            position,
            content: SlideContent::default(),
        }
    }

    pub fn with_content(id: NodeId, position: Point, content: SlideContent) -> Self {
        Self {
            id,
            position,
            content,
        }
    }

    /// Label shown on the canvas: the title, or `Slide N` without one.
    pub fn label(&self) -> String {
        match self.content.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => match self.id.number() {
                Some(n) => format!("Slide {}", n),
                None => self.id.to_string(),
            },
        }
    }

    /// Box occupied on the graph canvas.
    pub fn bounds(&self, size: Size) -> Rect {
        Rect::from_origin_size(self.position, size)
    }
}

/// A directed connection between two slides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub direction: EdgeDirection,
}

impl Edge {
    pub fn new(id: EdgeId, source: NodeId, target: NodeId) -> Self {
        Self {
            id,
            source,
            target,
            direction: EdgeDirection::Unidirectional,
        }
    }

    pub fn is_bidirectional(&self) -> bool {
        self.direction == EdgeDirection::Bidirectional
    }

    /// Whether this edge joins `a` and `b`, in either direction.
    pub fn joins(&self, a: &NodeId, b: &NodeId) -> bool {
        (&self.source == a && &self.target == b) || (&self.source == b && &self.target == a)
    }

    pub fn touches(&self, node: &NodeId) -> bool {
        &self.source == node || &self.target == node
    }
}

/// Immutable copy of the graph used for undo and presentation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphSnapshot {
    pub nodes: Vec<SlideNode>,
    pub edges: Vec<Edge>,
    pub first_slide: Option<NodeId>,
}

/// Owner of the node and edge collections of one project.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStore {
    /// Nodes in insertion order.
    nodes: Vec<SlideNode>,
    /// Edges in creation order.
    edges: Vec<Edge>,
    first_slide: Option<NodeId>,
    next_node: u64,
    next_edge: u64,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            first_slide: None,
            next_node: 1,
            next_edge: 1,
        }
    }
}

impl GraphStore {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from loaded parts, repairing anything that breaks the
    /// store's invariants.
    ///
    /// Duplicate node ids keep their first occurrence. Edges with a missing
    /// endpoint and self-loops are dropped. A repeated pair keeps the first
    /// edge; a pair present in both directions becomes one bidirectional
    /// edge. A first-slide marker naming an unknown node is cleared.
    pub fn from_parts(nodes: Vec<SlideNode>, edges: Vec<Edge>, first_slide: Option<NodeId>) -> Self {
        let mut store = Self::new();

        for node in nodes {
            if store.contains_node(&node.id) {
                log::warn!("Dropping duplicate node id {}", node.id);
                continue;
            }
            store.observe_node_id(&node.id);
            store.nodes.push(node);
        }

        for edge in edges {
            store.observe_edge_id(&edge.id);
            if !store.contains_node(&edge.source) || !store.contains_node(&edge.target) {
                log::warn!("Dropping edge {} with a missing endpoint", edge.id);
                continue;
            }
            if edge.source == edge.target {
                log::warn!("Dropping self-loop edge {}", edge.id);
                continue;
            }
            if let Some(existing) = store
                .edges
                .iter_mut()
                .find(|e| e.joins(&edge.source, &edge.target))
            {
                if existing.source != edge.source || edge.is_bidirectional() {
                    existing.direction = EdgeDirection::Bidirectional;
                }
                log::warn!("Merged edge {} into {}", edge.id, existing.id);
                continue;
            }
            let edge = if store.edges.iter().any(|e| e.id == edge.id) {
                Edge {
                    id: store.fresh_edge_id(),
                    ..edge
                }
            } else {
                edge
            };
            store.edges.push(edge);
        }

        store.first_slide = match first_slide {
            Some(id) if store.contains_node(&id) => Some(id),
            Some(id) => {
                log::warn!("Clearing first-slide marker for unknown node {}", id);
                None
            }
            None => None,
        };

        store
    }

    fn observe_node_id(&mut self, id: &NodeId) {
        if let Some(n) = id.number() {
            self.next_node = self.next_node.max(n.saturating_add(1));
        }
    }

    fn observe_edge_id(&mut self, id: &EdgeId) {
        if let Some(n) = numeric_suffix(&id.0) {
            self.next_edge = self.next_edge.max(n.saturating_add(1));
        }
    }

    fn fresh_node_id(&mut self) -> NodeId {
        loop {
            let id = NodeId(format!("{}{}", NODE_ID_PREFIX, self.next_node));
            self.next_node += 1;
            if !self.contains_node(&id) {
                return id;
            }
        }
    }

    fn fresh_edge_id(&mut self) -> EdgeId {
        loop {
            let id = EdgeId(format!("{}{}", EDGE_ID_PREFIX, self.next_edge));
            self.next_edge += 1;
            if !self.edges.iter().any(|e| e.id == id) {
                return id;
            }
        }
    }

    pub fn nodes(&self) -> &[SlideNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &NodeId) -> Option<&SlideNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut SlideNode> {
        self.nodes.iter_mut().find(|n| &n.id == id)
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.iter().any(|n| &n.id == id)
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| &e.id == id)
    }

    /// The edge going exactly `source -> target`.
    pub fn find_edge(&self, source: &NodeId, target: &NodeId) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|e| &e.source == source && &e.target == target)
    }

    /// The edge joining `a` and `b` in either direction.
    pub fn edge_between(&self, a: &NodeId, b: &NodeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.joins(a, b))
    }

    /// Edges leaving `node`, in creation order.
    pub fn outgoing<'a>(&'a self, node: &'a NodeId) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| &e.source == node)
    }

    pub fn first_slide(&self) -> Option<&NodeId> {
        self.first_slide.as_ref()
    }

    /// Presentation entry point: the marker, or the first node.
    pub fn start_node(&self) -> Option<&NodeId> {
        self.first_slide
            .as_ref()
            .or_else(|| self.nodes.first().map(|n| &n.id))
    }

    /// Set or clear the first-slide marker. Unknown ids are ignored.
    pub fn set_first_slide(&mut self, id: Option<NodeId>) -> bool {
        match id {
            Some(id) if !self.contains_node(&id) => false,
            id => {
                self.first_slide = id;
                true
            }
        }
    }

    /// Mark `id` as the first slide, or clear the marker if it already is.
    pub fn toggle_first_slide(&mut self, id: &NodeId) -> bool {
        if !self.contains_node(id) {
            return false;
        }
        if self.first_slide.as_ref() == Some(id) {
            log::debug!("Cleared first-slide marker on {}", id);
            self.first_slide = None;
        } else {
            log::debug!("Marked {} as first slide", id);
            self.first_slide = Some(id.clone());
        }
        true
    }

    /// Add an empty slide at `position`.
    pub fn add_node(&mut self, position: Point) -> NodeId {
        self.add_node_with_content(position, SlideContent::default())
    }

    /// Add a slide with the given content under a freshly allocated id.
    pub fn add_node_with_content(&mut self, position: Point, content: SlideContent) -> NodeId {
        let id = self.fresh_node_id();
        log::debug!("Added node {} at ({}, {})", id, position.x, position.y);
        self.nodes
            .push(SlideNode::with_content(id.clone(), position, content));
        id
    }

    /// Remove a node and every edge touching it.
    pub fn delete_node(&mut self, id: &NodeId) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| &n.id != id);
        if self.nodes.len() == before {
            return false;
        }
        let edges_before = self.edges.len();
        self.edges.retain(|e| !e.touches(id));
        if self.first_slide.as_ref() == Some(id) {
            self.first_slide = None;
        }
        log::debug!(
            "Deleted node {} and {} incident edge(s)",
            id,
            edges_before - self.edges.len()
        );
        true
    }

    /// Connect `source -> target`.
    ///
    /// An identical edge makes this a no-op. An edge in the reverse
    /// direction is replaced, so the latest direction wins. Returns the id
    /// of the new edge, or `None` if nothing was created.
    pub fn add_edge(&mut self, source: &NodeId, target: &NodeId) -> Option<EdgeId> {
        if source == target || !self.contains_node(source) || !self.contains_node(target) {
            log::debug!("Ignoring edge {} -> {}", source, target);
            return None;
        }
        if self.find_edge(source, target).is_some() {
            log::debug!("Edge {} -> {} already exists", source, target);
            return None;
        }
        let before = self.edges.len();
        self.edges
            .retain(|e| !(&e.source == target && &e.target == source));
        if self.edges.len() != before {
            log::debug!("Replaced reverse edge {} -> {}", target, source);
        }
        let id = self.fresh_edge_id();
        self.edges
            .push(Edge::new(id.clone(), source.clone(), target.clone()));
        Some(id)
    }

    pub fn remove_edge(&mut self, id: &EdgeId) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| &e.id != id);
        before != self.edges.len()
    }

    /// Change an edge's direction, removing any standalone reverse edge.
    pub fn set_direction(&mut self, id: &EdgeId, direction: EdgeDirection) -> bool {
        let Some(edge) = self.edge(id).cloned() else {
            return false;
        };
        self.edges
            .retain(|e| !(e.source == edge.target && e.target == edge.source));
        if let Some(edge) = self.edges.iter_mut().find(|e| &e.id == id) {
            edge.direction = direction;
        }
        log::debug!("Edge {} set to {:?}", id, direction);
        true
    }

    pub fn move_node(&mut self, id: &NodeId, position: Point) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    /// Replace a node's content.
    pub fn set_content(&mut self, id: &NodeId, content: SlideContent) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.content = content;
                true
            }
            None => false,
        }
    }

    /// Set or clear a node's title. Blank titles clear it.
    pub fn set_title(&mut self, id: &NodeId, title: &str) -> bool {
        let title = title.trim();
        match self.node_mut(id) {
            Some(node) => {
                node.content.title = if title.is_empty() {
                    None
                } else {
                    Some(title.to_string())
                };
                true
            }
            None => false,
        }
    }

    /// Topmost node whose box contains `point`.
    pub fn node_at(&self, point: Point, size: Size) -> Option<&NodeId> {
        self.nodes
            .iter()
            .rev()
            .find(|n| n.bounds(size).contains(point))
            .map(|n| &n.id)
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            first_slide: self.first_slide.clone(),
        }
    }

    /// Replace the graph wholesale. Id counters keep counting upwards so
    /// ids handed out before the restore are never reissued.
    pub fn restore(&mut self, snapshot: GraphSnapshot) {
        self.nodes = snapshot.nodes;
        self.edges = snapshot.edges;
        self.first_slide = snapshot.first_slide;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(n: usize) -> (GraphStore, Vec<NodeId>) {
        let mut store = GraphStore::new();
        let ids = (0..n)
            .map(|i| store.add_node(Point::new(i as f64 * 200.0, 0.0)))
            .collect();
        (store, ids)
    }

    fn pair_count(store: &GraphStore, a: &NodeId, b: &NodeId) -> usize {
        store.edges().iter().filter(|e| e.joins(a, b)).count()
    }

    #[test]
    fn test_node_ids_never_reused() {
        let (mut store, ids) = graph_with(3);
        assert_eq!(ids[0].as_str(), "slide-1");
        store.delete_node(&ids[2]);
        let next = store.add_node(Point::ZERO);
        assert_eq!(next.as_str(), "slide-4");
    }

    #[test]
    fn test_counter_seeded_from_loaded_ids() {
        let nodes = vec![
            SlideNode::new("slide-7".into(), Point::ZERO),
            SlideNode::new("intro".into(), Point::ZERO),
        ];
        let mut store = GraphStore::from_parts(nodes, Vec::new(), None);
        assert_eq!(store.add_node(Point::ZERO).as_str(), "slide-8");
    }

    #[test]
    fn test_pair_count_always_one() {
        let (mut store, ids) = graph_with(2);
        let (a, b) = (&ids[0], &ids[1]);
        let sequence = [(a, b), (a, b), (b, a), (a, b), (b, a), (b, a)];
        for (s, t) in sequence {
            store.add_edge(s, t);
            assert_eq!(pair_count(&store, a, b), 1);
        }
    }

    #[test]
    fn test_reverse_connect_last_direction_wins() {
        let (mut store, ids) = graph_with(2);
        store.add_edge(&ids[0], &ids[1]);
        store.add_edge(&ids[1], &ids[0]);
        assert_eq!(store.edges().len(), 1);
        let edge = &store.edges()[0];
        assert_eq!(edge.source, ids[1]);
        assert_eq!(edge.target, ids[0]);
        assert_eq!(edge.direction, EdgeDirection::Unidirectional);
    }

    #[test]
    fn test_duplicate_connect_is_noop() {
        let (mut store, ids) = graph_with(2);
        let first = store.add_edge(&ids[0], &ids[1]);
        assert!(first.is_some());
        assert_eq!(store.add_edge(&ids[0], &ids[1]), None);
        assert_eq!(store.edges()[0].id, first.unwrap());
    }

    #[test]
    fn test_invalid_edges_rejected() {
        let (mut store, ids) = graph_with(1);
        assert_eq!(store.add_edge(&ids[0], &ids[0]), None);
        assert_eq!(store.add_edge(&ids[0], &NodeId::from("ghost")), None);
        assert!(store.edges().is_empty());
    }

    #[test]
    fn test_delete_node_cascades() {
        let (mut store, ids) = graph_with(4);
        store.add_edge(&ids[0], &ids[1]);
        store.add_edge(&ids[0], &ids[2]);
        store.add_edge(&ids[1], &ids[3]);
        store.add_edge(&ids[2], &ids[3]);
        for id in &ids {
            let mut copy = store.clone();
            assert!(copy.delete_node(id));
            assert!(copy.edges().iter().all(|e| !e.touches(id)));
        }
        assert!(!store.delete_node(&NodeId::from("ghost")));
        assert_eq!(store.edges().len(), 4);
    }

    #[test]
    fn test_delete_clears_first_slide() {
        let (mut store, ids) = graph_with(2);
        store.toggle_first_slide(&ids[1]);
        assert_eq!(store.start_node(), Some(&ids[1]));
        store.delete_node(&ids[1]);
        assert_eq!(store.first_slide(), None);
        assert_eq!(store.start_node(), Some(&ids[0]));
    }

    #[test]
    fn test_toggle_first_slide() {
        let (mut store, ids) = graph_with(2);
        assert!(store.toggle_first_slide(&ids[0]));
        assert_eq!(store.first_slide(), Some(&ids[0]));
        assert!(store.toggle_first_slide(&ids[0]));
        assert_eq!(store.first_slide(), None);
        assert!(!store.toggle_first_slide(&NodeId::from("ghost")));
    }

    #[test]
    fn test_set_direction() {
        let (mut store, ids) = graph_with(2);
        let id = store.add_edge(&ids[0], &ids[1]).unwrap();
        assert!(store.set_direction(&id, EdgeDirection::Bidirectional));
        assert!(store.edge(&id).unwrap().is_bidirectional());
        assert!(store.set_direction(&id, EdgeDirection::Unidirectional));
        assert!(!store.edge(&id).unwrap().is_bidirectional());
        assert!(!store.set_direction(&EdgeId::from("nope"), EdgeDirection::Bidirectional));
    }

    #[test]
    fn test_outgoing_in_creation_order() {
        let (mut store, ids) = graph_with(4);
        store.add_edge(&ids[0], &ids[3]);
        store.add_edge(&ids[0], &ids[1]);
        store.add_edge(&ids[2], &ids[0]);
        store.add_edge(&ids[0], &ids[2]);
        let targets: Vec<&NodeId> = store.outgoing(&ids[0]).map(|e| &e.target).collect();
        assert_eq!(targets, vec![&ids[3], &ids[1], &ids[2]]);
    }

    #[test]
    fn test_from_parts_normalizes() {
        let nodes = vec![
            SlideNode::new("slide-1".into(), Point::ZERO),
            SlideNode::new("slide-2".into(), Point::ZERO),
            SlideNode::new("slide-2".into(), Point::new(5.0, 5.0)),
        ];
        let edges = vec![
            Edge::new("e1".into(), "slide-1".into(), "slide-2".into()),
            Edge::new("e2".into(), "slide-2".into(), "slide-1".into()),
            Edge::new("e3".into(), "slide-1".into(), "slide-9".into()),
            Edge::new("e4".into(), "slide-1".into(), "slide-1".into()),
        ];
        let store = GraphStore::from_parts(nodes, edges, Some("slide-9".into()));
        assert_eq!(store.nodes().len(), 2);
        assert_eq!(store.nodes()[1].position, Point::ZERO);
        assert_eq!(store.edges().len(), 1);
        assert!(store.edges()[0].is_bidirectional());
        assert_eq!(store.first_slide(), None);
    }

    #[test]
    fn test_labels() {
        let (mut store, ids) = graph_with(1);
        assert_eq!(store.node(&ids[0]).unwrap().label(), "Slide 1");
        store.set_title(&ids[0], "  Intro ");
        assert_eq!(store.node(&ids[0]).unwrap().label(), "Intro");
        store.set_title(&ids[0], "   ");
        assert_eq!(store.node(&ids[0]).unwrap().content.title, None);
    }

    #[test]
    fn test_snapshot_restore() {
        let (mut store, ids) = graph_with(2);
        let snapshot = store.snapshot();
        store.add_edge(&ids[0], &ids[1]);
        store.delete_node(&ids[0]);
        store.restore(snapshot);
        assert_eq!(store.nodes().len(), 2);
        assert!(store.edges().is_empty());
        assert_eq!(store.add_node(Point::ZERO).as_str(), "slide-3");
    }

    #[test]
    fn test_node_at_prefers_topmost() {
        let mut store = GraphStore::new();
        let a = store.add_node(Point::new(0.0, 0.0));
        let b = store.add_node(Point::new(50.0, 50.0));
        let size = Size::new(160.0, 90.0);
        assert_eq!(store.node_at(Point::new(60.0, 60.0), size), Some(&b));
        assert_eq!(store.node_at(Point::new(10.0, 10.0), size), Some(&a));
        assert_eq!(store.node_at(Point::new(500.0, 500.0), size), None);
    }
}
