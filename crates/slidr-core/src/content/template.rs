//! Slide templates.

use super::{
    BoxShape, Element, ElementIdAllocator, ElementKind, FontWeight, Paint, SerializableColor,
    TextAlign, TextElement,
};
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// Starting layouts for a slide. Applying one replaces the slide's elements
/// and background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Template {
    Blank,
    Title,
    Content,
    TwoColumns,
    Image,
    Gradient,
}

fn frame(x: f64, y: f64, w: f64, h: f64) -> Rect {
    Rect::new(x, y, x + w, y + h)
}

fn text(content: &str, size: f64, color: Paint) -> TextElement {
    TextElement {
        font_size: size,
        color,
        ..TextElement::new(content)
    }
}

fn bold(mut t: TextElement) -> TextElement {
    t.font_weight = FontWeight::Bold;
    t
}

fn centered(mut t: TextElement) -> TextElement {
    t.align = TextAlign::Center;
    t
}

fn panel(fill: Paint, radius: f64) -> ElementKind {
    ElementKind::Rectangle(BoxShape {
        background_color: fill,
        border_radius: radius,
        ..BoxShape::default()
    })
}

impl Template {
    pub const ALL: [Template; 6] = [
        Template::Blank,
        Template::Title,
        Template::Content,
        Template::TwoColumns,
        Template::Image,
        Template::Gradient,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Template::Blank => "Blank",
            Template::Title => "Title",
            Template::Content => "Content",
            Template::TwoColumns => "Two columns",
            Template::Image => "Image + text",
            Template::Gradient => "Gradient",
        }
    }

    pub fn background(&self) -> Paint {
        match self {
            Template::Blank | Template::Content | Template::Image => Paint::rgb(0xff, 0xff, 0xff),
            Template::Title => Paint::rgb(0x1a, 0x1a, 0x2e),
            Template::TwoColumns => Paint::rgb(0xf8, 0xf9, 0xfa),
            Template::Gradient => Paint::parse("linear-gradient(135deg, #667eea 0%, #764ba2 100%)"),
        }
    }

    /// Build the template's elements with ids from `ids`.
    pub fn elements(&self, ids: &mut ElementIdAllocator) -> Vec<Element> {
        let white = Paint::rgb(0xff, 0xff, 0xff);
        let dark = Paint::rgb(0x33, 0x33, 0x33);
        let layout: Vec<(Rect, ElementKind)> = match self {
            Template::Blank => Vec::new(),
            Template::Title => vec![
                (
                    frame(100.0, 200.0, 600.0, 80.0),
                    ElementKind::Text(centered(bold(text("Main title", 48.0, white)))),
                ),
                (
                    frame(150.0, 300.0, 500.0, 40.0),
                    ElementKind::Text(centered(text(
                        "Presentation subtitle",
                        24.0,
                        Paint::rgb(0x88, 0x88, 0x88),
                    ))),
                ),
            ],
            Template::Content => vec![
                (
                    frame(50.0, 40.0, 700.0, 50.0),
                    ElementKind::Text(bold(text("Slide title", 36.0, dark.clone()))),
                ),
                (
                    frame(50.0, 100.0, 700.0, 3.0),
                    panel(Paint::rgb(0x42, 0x85, 0xf4), 2.0),
                ),
                (
                    frame(50.0, 130.0, 700.0, 300.0),
                    ElementKind::Text(text("Your content here...", 18.0, Paint::rgb(0x55, 0x55, 0x55))),
                ),
            ],
            Template::TwoColumns => vec![
                (
                    frame(50.0, 30.0, 700.0, 40.0),
                    ElementKind::Text(bold(text("Comparison", 32.0, dark.clone()))),
                ),
                (frame(50.0, 90.0, 330.0, 350.0), panel(Paint::rgb(0xe3, 0xf2, 0xfd), 12.0)),
                (frame(420.0, 90.0, 330.0, 350.0), panel(Paint::rgb(0xfc, 0xe4, 0xec), 12.0)),
                (
                    frame(70.0, 110.0, 290.0, 30.0),
                    ElementKind::Text(bold(text("Option A", 20.0, Paint::rgb(0x19, 0x76, 0xd2)))),
                ),
                (
                    frame(440.0, 110.0, 290.0, 30.0),
                    ElementKind::Text(bold(text("Option B", 20.0, Paint::rgb(0xc2, 0x18, 0x5b)))),
                ),
            ],
            Template::Image => vec![
                (frame(50.0, 50.0, 350.0, 400.0), panel(Paint::rgb(0xe0, 0xe0, 0xe0), 8.0)),
                (
                    frame(140.0, 230.0, 170.0, 40.0),
                    ElementKind::Text(centered(text("Image", 24.0, Paint::rgb(0x99, 0x99, 0x99)))),
                ),
                (
                    frame(450.0, 50.0, 300.0, 40.0),
                    ElementKind::Text(bold(text("Title", 28.0, dark))),
                ),
                (
                    frame(450.0, 110.0, 300.0, 300.0),
                    ElementKind::Text(text(
                        "Image description and additional content...",
                        16.0,
                        Paint::rgb(0x66, 0x66, 0x66),
                    )),
                ),
            ],
            Template::Gradient => vec![
                (
                    frame(100.0, 180.0, 600.0, 60.0),
                    ElementKind::Text(centered(bold(text("Modern slide", 42.0, white)))),
                ),
                (
                    frame(150.0, 260.0, 500.0, 40.0),
                    ElementKind::Text(centered(text(
                        "With a gradient background",
                        20.0,
                        Paint::Solid(SerializableColor::new(255, 255, 255, 204)),
                    ))),
                ),
            ],
        };

        layout
            .into_iter()
            .map(|(rect, kind)| Element::new(ids.allocate(), rect, kind))
            .collect()
    }
}
