//! Per-slide visual content.
//!
//! Every slide node owns a [`SlideContent`]: an ordered list of [`Element`]s
//! (later elements draw on top) and a background [`Paint`]. Element ids are
//! unique within a slide and come from an [`ElementIdAllocator`] that only
//! counts upwards.

pub mod editor;
mod image;
mod paint;
pub mod style;
mod template;
mod text;

pub use editor::{ContentEditor, ContentMode, StylePatch};
pub use image::{ImageError, ImageFormat, decode_data_url, encode_data_url};
#[cfg(not(target_arch = "wasm32"))]
pub use image::read_image_file;
pub use paint::{GradientStop, LinearGradient, Paint, SerializableColor};
pub use template::Template;
pub use text::{ApproxTextMeasure, TextMeasure, fit_font_size};

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Data key of the element list.
pub const ELEMENTS_KEY: &str = "elements";
/// Data key of the slide background.
pub const BACKGROUND_KEY: &str = "backgroundColor";
/// Data key of the slide title.
pub const TITLE_KEY: &str = "title";

/// Unique identifier for an element within a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out element ids that strictly increase for the life of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementIdAllocator {
    next: u64,
}

impl Default for ElementIdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl ElementIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id.
    pub fn allocate(&mut self) -> ElementId {
        let id = ElementId(self.next);
        self.next += 1;
        id
    }

    /// Make sure future ids are greater than `id`.
    pub fn observe(&mut self, id: ElementId) {
        if id.0 >= self.next {
            self.next = id.0 + 1;
        }
    }

    /// Make sure future ids are greater than every element in `content`.
    pub fn observe_content(&mut self, content: &SlideContent) {
        for element in &content.elements {
            self.observe(element.id);
        }
    }

    /// Merge with another allocator, keeping the larger counter.
    pub fn merge(&mut self, other: ElementIdAllocator) {
        self.next = self.next.max(other.next);
    }

    /// The id the next call to [`allocate`](Self::allocate) will return.
    pub fn peek(&self) -> ElementId {
        ElementId(self.next)
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
}

/// Default font size of new text elements.
pub const DEFAULT_FONT_SIZE: f64 = 24.0;
/// Default font family of new text elements.
pub const DEFAULT_FONT_FAMILY: &str = "Inter, sans-serif";

fn default_font_size() -> f64 {
    DEFAULT_FONT_SIZE
}

fn clamped_font_size<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let size = f64::deserialize(deserializer)?;
    Ok(style::clamp_to(&style::FONT_SIZE_RANGE, size))
}

fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_string()
}

fn default_text_color() -> Paint {
    Paint::rgb(0x33, 0x33, 0x33)
}

fn default_shape_fill() -> Paint {
    Paint::rgb(0x42, 0x85, 0xf4)
}

fn default_border_color() -> Paint {
    Paint::rgb(0, 0, 0)
}

fn default_background() -> Paint {
    Paint::transparent()
}

/// A text box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_font_size", deserialize_with = "clamped_font_size")]
    pub font_size: f64,
    /// Size actually displayed after shrinking overflowing text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitted_font_size: Option<f64>,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default)]
    pub font_style: FontStyle,
    #[serde(default)]
    pub text_decoration: TextDecoration,
    #[serde(default = "default_text_color")]
    pub color: Paint,
    #[serde(default = "default_background")]
    pub background_color: Paint,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default)]
    pub border_radius: f64,
    #[serde(default)]
    pub padding: f64,
}

impl Default for TextElement {
    fn default() -> Self {
        Self {
            content: String::new(),
            font_size: DEFAULT_FONT_SIZE,
            fitted_font_size: None,
            font_family: default_font_family(),
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            text_decoration: TextDecoration::None,
            color: default_text_color(),
            background_color: Paint::transparent(),
            align: TextAlign::Left,
            border_radius: 0.0,
            padding: 0.0,
        }
    }
}

impl TextElement {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// The size the text is drawn at.
    pub fn display_font_size(&self) -> f64 {
        self.fitted_font_size.unwrap_or(self.font_size)
    }
}

/// Rectangle fill with optional rounded corners and border.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxShape {
    #[serde(default = "default_shape_fill")]
    pub background_color: Paint,
    #[serde(default)]
    pub border_radius: f64,
    #[serde(default)]
    pub border_width: f64,
    #[serde(default = "default_border_color")]
    pub border_color: Paint,
}

impl Default for BoxShape {
    fn default() -> Self {
        Self {
            background_color: default_shape_fill(),
            border_radius: 8.0,
            border_width: 0.0,
            border_color: default_border_color(),
        }
    }
}

/// Ellipse fill with optional border.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlinedShape {
    #[serde(default = "default_shape_fill")]
    pub background_color: Paint,
    #[serde(default)]
    pub border_width: f64,
    #[serde(default = "default_border_color")]
    pub border_color: Paint,
}

impl Default for OutlinedShape {
    fn default() -> Self {
        Self {
            background_color: default_shape_fill(),
            border_width: 0.0,
            border_color: default_border_color(),
        }
    }
}

/// A shape drawn with a single fill (triangle, line, arrow).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolidShape {
    #[serde(default = "default_shape_fill")]
    pub background_color: Paint,
}

impl Default for SolidShape {
    fn default() -> Self {
        Self {
            background_color: default_shape_fill(),
        }
    }
}

/// An embedded image. `src` is usually a `data:` URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageElement {
    pub src: String,
    #[serde(default)]
    pub border_radius: f64,
}

/// Kinds of shape offered by the "add shape" palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Triangle,
    Line,
    Arrow,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Rectangle,
        ShapeKind::Circle,
        ShapeKind::Triangle,
        ShapeKind::Line,
        ShapeKind::Arrow,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Circle => "Circle",
            ShapeKind::Triangle => "Triangle",
            ShapeKind::Line => "Line",
            ShapeKind::Arrow => "Arrow",
        }
    }
}

/// The variant-specific part of an element, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Text(TextElement),
    Rectangle(BoxShape),
    Circle(OutlinedShape),
    Triangle(SolidShape),
    Line(SolidShape),
    Arrow(SolidShape),
    Image(ImageElement),
}

impl ElementKind {
    /// Default styling for a freshly added shape.
    pub fn shape(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Rectangle => ElementKind::Rectangle(BoxShape::default()),
            ShapeKind::Circle => ElementKind::Circle(OutlinedShape::default()),
            ShapeKind::Triangle => ElementKind::Triangle(SolidShape::default()),
            ShapeKind::Line => ElementKind::Line(SolidShape::default()),
            ShapeKind::Arrow => ElementKind::Arrow(SolidShape::default()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ElementKind::Text(_) => "text",
            ElementKind::Rectangle(_) => "rectangle",
            ElementKind::Circle(_) => "circle",
            ElementKind::Triangle(_) => "triangle",
            ElementKind::Line(_) => "line",
            ElementKind::Arrow(_) => "arrow",
            ElementKind::Image(_) => "image",
        }
    }

    /// The primary fill, for kinds that have one.
    pub fn fill(&self) -> Option<&Paint> {
        match self {
            ElementKind::Text(t) => Some(&t.background_color),
            ElementKind::Rectangle(s) => Some(&s.background_color),
            ElementKind::Circle(s) => Some(&s.background_color),
            ElementKind::Triangle(s) | ElementKind::Line(s) | ElementKind::Arrow(s) => {
                Some(&s.background_color)
            }
            ElementKind::Image(_) => None,
        }
    }
}

/// A visual primitive placed on a slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    pub fn new(id: ElementId, frame: Rect, kind: ElementKind) -> Self {
        Self {
            id,
            x: frame.x0,
            y: frame.y0,
            width: frame.width(),
            height: frame.height(),
            kind,
        }
    }

    pub fn frame(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn set_frame(&mut self, frame: Rect) {
        self.x = frame.x0;
        self.y = frame.y0;
        self.width = frame.width();
        self.height = frame.height();
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    pub fn as_text(&self) -> Option<&TextElement> {
        match &self.kind {
            ElementKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextElement> {
        match &mut self.kind {
            ElementKind::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// The content attached to a slide node.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideContent {
    /// Display label of the slide, if the author set one.
    pub title: Option<String>,
    /// Elements in z-order.
    pub elements: Vec<Element>,
    pub background: Paint,
    /// Data fields this crate does not interpret, kept for round-tripping.
    pub extra: Map<String, Value>,
}

impl Default for SlideContent {
    fn default() -> Self {
        Self {
            title: None,
            elements: Vec::new(),
            background: Paint::default(),
            extra: Map::new(),
        }
    }
}

impl SlideContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn max_element_id(&self) -> Option<ElementId> {
        self.elements.iter().map(|e| e.id).max()
    }

    /// Build content from a persisted `data` object.
    ///
    /// Elements that cannot be read are skipped with a warning; a missing or
    /// non-object value yields empty content.
    pub fn from_data(data: &Value) -> Self {
        let Some(object) = data.as_object() else {
            return Self::default();
        };
        let mut extra = object.clone();

        let title = match extra.remove(TITLE_KEY) {
            Some(Value::String(title)) => Some(title),
            Some(Value::Null) | None => None,
            Some(other) => {
                log::warn!("Ignoring non-string slide title: {}", other);
                None
            }
        };

        let background = match extra.remove(BACKGROUND_KEY) {
            Some(Value::String(css)) => Paint::parse(&css),
            _ => Paint::default(),
        };

        let mut elements: Vec<Element> = Vec::new();
        if let Some(Value::Array(items)) = extra.remove(ELEMENTS_KEY) {
            for item in items {
                match serde_json::from_value::<Element>(item) {
                    Ok(element) => {
                        if elements.iter().any(|e| e.id == element.id) {
                            log::warn!("Skipping element with duplicate id {}", element.id);
                        } else {
                            elements.push(element);
                        }
                    }
                    Err(e) => log::warn!("Skipping unreadable slide element: {}", e),
                }
            }
        }

        Self {
            title,
            elements,
            background,
            extra,
        }
    }

    /// Encode as a persisted `data` object.
    pub fn to_data(&self) -> Value {
        let mut object = self.extra.clone();
        let elements = self
            .elements
            .iter()
            .filter_map(|element| match serde_json::to_value(element) {
                Ok(value) => Some(value),
                Err(e) => {
                    log::error!("Failed to encode element {}: {}", element.id, e);
                    None
                }
            })
            .collect();
        object.insert(ELEMENTS_KEY.to_string(), Value::Array(elements));
        object.insert(
            BACKGROUND_KEY.to_string(),
            Value::String(self.background.to_css()),
        );
        if let Some(title) = &self.title {
            object.insert(TITLE_KEY.to_string(), Value::String(title.clone()));
        }
        Value::Object(object)
    }
}
