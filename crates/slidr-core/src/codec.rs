//! Persisted project format.
//!
//! ```json
//! {
//!   "nodes": [{ "id": "slide-1", "position": { "x": 0, "y": 0 }, "data": { "elements": [] } }],
//!   "edges": [{ "id": "edge-1", "source": "slide-1", "target": "slide-2", "markerStart": "arrow" }],
//!   "firstSlideId": "slide-1"
//! }
//! ```
//!
//! An edge with a `markerStart` is bidirectional. Reading never fails:
//! anything unreadable is skipped, and unreadable documents load as an
//! empty project.

use crate::content::SlideContent;
use crate::graph::{Edge, EdgeDirection, EdgeId, GraphStore, NodeId, SlideNode};
use kurbo::Point;
use serde_json::{Map, Value, json};

/// Marker value written for bidirectional edges.
pub const BIDIRECTIONAL_MARKER: &str = "arrow";

const EMPTY_PROJECT: &str = r#"{"nodes":[],"edges":[],"firstSlideId":null}"#;

/// The three persisted parts of a project.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectData {
    pub nodes: Vec<SlideNode>,
    pub edges: Vec<Edge>,
    pub first_slide: Option<NodeId>,
}

impl ProjectData {
    pub fn from_store(store: &GraphStore) -> Self {
        Self {
            nodes: store.nodes().to_vec(),
            edges: store.edges().to_vec(),
            first_slide: store.first_slide().cloned(),
        }
    }

    /// Build a store, repairing invalid structure.
    pub fn into_store(self) -> GraphStore {
        GraphStore::from_parts(self.nodes, self.edges, self.first_slide)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty() && self.first_slide.is_none()
    }
}

fn node_to_value(node: &SlideNode) -> Value {
    json!({
        "id": node.id.as_str(),
        "position": { "x": node.position.x, "y": node.position.y },
        "data": node.content.to_data(),
    })
}

fn edge_to_value(edge: &Edge) -> Value {
    let mut map = Map::new();
    map.insert("id".into(), edge.id.as_str().into());
    map.insert("source".into(), edge.source.as_str().into());
    map.insert("target".into(), edge.target.as_str().into());
    if edge.is_bidirectional() {
        map.insert("markerStart".into(), BIDIRECTIONAL_MARKER.into());
    }
    Value::Object(map)
}

/// Encode a project as JSON.
pub fn serialize(data: &ProjectData) -> String {
    let value = json!({
        "nodes": data.nodes.iter().map(node_to_value).collect::<Vec<_>>(),
        "edges": data.edges.iter().map(edge_to_value).collect::<Vec<_>>(),
        "firstSlideId": data.first_slide.as_ref().map(NodeId::as_str),
    });
    match serde_json::to_string(&value) {
        Ok(json) => json,
        Err(e) => {
            log::error!("Failed to serialize project: {}", e);
            EMPTY_PROJECT.to_string()
        }
    }
}

/// Encode a store as JSON.
pub fn serialize_store(store: &GraphStore) -> String {
    serialize(&ProjectData::from_store(store))
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn node_from_value(value: &Value) -> Option<SlideNode> {
    let id = str_field(value, "id")?;
    let position = value.get("position");
    let coord = |key: &str| {
        position
            .and_then(|p| p.get(key))
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    };
    let content = value
        .get("data")
        .map(SlideContent::from_data)
        .unwrap_or_default();
    Some(SlideNode::with_content(
        NodeId::new(id),
        Point::new(coord("x"), coord("y")),
        content,
    ))
}

fn edge_from_value(value: &Value, index: usize) -> Option<Edge> {
    let source = str_field(value, "source")?;
    let target = str_field(value, "target")?;
    let id = str_field(value, "id")
        .map(EdgeId::new)
        .unwrap_or_else(|| EdgeId::new(format!("edge-{}-{}-{}", source, target, index)));
    let mut edge = Edge::new(id, NodeId::new(source), NodeId::new(target));
    if value.get("markerStart").is_some_and(|m| !m.is_null()) {
        edge.direction = EdgeDirection::Bidirectional;
    }
    Some(edge)
}

fn array<'a>(root: &'a Value, key: &str) -> &'a [Value] {
    root.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Decode a project. Never fails; malformed parts are dropped.
pub fn deserialize(content: &str) -> ProjectData {
    let root: Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(e) => {
            if !content.trim().is_empty() {
                log::warn!("Unreadable project content, starting empty: {}", e);
            }
            return ProjectData::default();
        }
    };
    if !root.is_object() {
        return ProjectData::default();
    }

    let raw_nodes = array(&root, "nodes");
    let nodes: Vec<SlideNode> = raw_nodes.iter().filter_map(node_from_value).collect();
    if nodes.len() != raw_nodes.len() {
        log::warn!("Skipped {} malformed node(s)", raw_nodes.len() - nodes.len());
    }

    let raw_edges = array(&root, "edges");
    let edges: Vec<Edge> = raw_edges
        .iter()
        .enumerate()
        .filter_map(|(i, v)| edge_from_value(v, i))
        .collect();
    if edges.len() != raw_edges.len() {
        log::warn!("Skipped {} malformed edge(s)", raw_edges.len() - edges.len());
    }

    let first_slide = str_field(&root, "firstSlideId").map(NodeId::new);

    ProjectData {
        nodes,
        edges,
        first_slide,
    }
}

/// Decode straight into a repaired store.
pub fn deserialize_store(content: &str) -> GraphStore {
    deserialize(content).into_store()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Element, ElementId, ElementKind, Paint, ShapeKind, TextElement};
    use kurbo::Rect;

    fn sample() -> GraphStore {
        let mut store = GraphStore::new();
        let a = store.add_node(Point::new(10.0, 20.0));
        let mut content = SlideContent::with_title("Branch");
        content.background = Paint::parse("linear-gradient(135deg, #667eea 0%, #764ba2 100%)");
        content.elements.push(Element::new(
            ElementId(1),
            Rect::new(100.0, 100.0, 400.0, 150.0),
            ElementKind::Text(TextElement::new("Hello")),
        ));
        content.elements.push(Element::new(
            ElementId(2),
            Rect::new(150.0, 150.0, 270.0, 270.0),
            ElementKind::shape(ShapeKind::Circle),
        ));
        let b = store.add_node_with_content(Point::new(300.0, 20.0), content);
        let c = store.add_node(Point::new(300.0, 200.0));
        let ab = store.add_edge(&a, &b).unwrap();
        store.set_direction(&ab, EdgeDirection::Bidirectional);
        store.add_edge(&a, &c);
        store.set_first_slide(Some(a));
        store
    }

    #[test]
    fn test_round_trip() {
        let data = ProjectData::from_store(&sample());
        let json = serialize(&data);
        assert_eq!(deserialize(&json), data);
    }

    #[test]
    fn test_round_trip_gradient_with_implicit_offsets() {
        let mut store = GraphStore::new();
        let mut content = SlideContent::default();
        content.background = Paint::parse("linear-gradient(90deg, #000000, #111111, #222222, #333333)");
        store.add_node_with_content(Point::ZERO, content);
        let data = deserialize(&serialize_store(&store));
        assert_eq!(deserialize(&serialize(&data)), data);
        assert_eq!(data.nodes[0].content.background, store.nodes()[0].content.background);
    }

    #[test]
    fn test_round_trip_empty_graph() {
        let data = ProjectData::default();
        let json = serialize(&data);
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value, json!({ "nodes": [], "edges": [], "firstSlideId": null }));
        assert_eq!(deserialize(&json), data);
    }

    #[test]
    fn test_malformed_input_is_empty() {
        for input in ["{", "null", "", "[]", "42", "\"nodes\""] {
            let data = deserialize(input);
            assert!(data.is_empty(), "input {:?}", input);
        }
    }

    #[test]
    fn test_wire_shape() {
        let json = serialize_store(&sample());
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["firstSlideId"], "slide-1");
        assert_eq!(value["nodes"][0]["position"]["x"], 10.0);
        assert_eq!(value["nodes"][1]["data"]["title"], "Branch");
        assert_eq!(value["edges"][0]["markerStart"], "arrow");
        assert!(value["edges"][1].get("markerStart").is_none());
    }

    #[test]
    fn test_missing_fields_default() {
        let data = deserialize(
            r#"{"nodes":[{"id":"slide-4"},{"position":{"x":1,"y":2}}],
                "edges":[{"source":"slide-4","target":"slide-5","markerStart":{"type":"arrowclosed"}},
                         {"id":"edge-9","source":"slide-4"}],
                "firstSlideId":""}"#,
        );
        assert_eq!(data.nodes.len(), 1);
        assert_eq!(data.nodes[0].position, Point::ZERO);
        assert!(data.nodes[0].content.elements.is_empty());
        assert_eq!(data.edges.len(), 1);
        assert!(data.edges[0].is_bidirectional());
        assert_eq!(data.first_slide, None);
    }

    #[test]
    fn test_unknown_node_data_survives() {
        let json = r#"{"nodes":[{"id":"slide-1","position":{"x":0,"y":0},
            "data":{"label":"Legacy","content":"old text","elements":[]}}],"edges":[],"firstSlideId":null}"#;
        let data = deserialize(json);
        let out: Value = serde_json::from_str(&serialize(&data)).unwrap();
        assert_eq!(out["nodes"][0]["data"]["label"], "Legacy");
        assert_eq!(out["nodes"][0]["data"]["content"], "old text");
    }

    #[test]
    fn test_load_repairs_structure() {
        let json = r#"{"nodes":[{"id":"slide-1"},{"id":"slide-2"}],
            "edges":[{"id":"edge-1","source":"slide-1","target":"slide-2"},
                     {"id":"edge-2","source":"slide-2","target":"slide-1"},
                     {"id":"edge-3","source":"slide-1","target":"slide-7"}],
            "firstSlideId":"slide-7"}"#;
        let store = deserialize_store(json);
        assert_eq!(store.edges().len(), 1);
        assert!(store.edges()[0].is_bidirectional());
        assert_eq!(store.first_slide(), None);
    }
}
