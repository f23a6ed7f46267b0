//! Selection geometry: resize handles, clamped moves and rectangle overlap.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Handle size in canvas units.
pub const HANDLE_SIZE: f64 = 10.0;
/// Handle hit tolerance in canvas units.
pub const HANDLE_HIT_TOLERANCE: f64 = 8.0;

/// One of the eight resize handles around a selected element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    Nw,
    N,
    Ne,
    W,
    E,
    Sw,
    S,
    Se,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::Nw,
        ResizeHandle::N,
        ResizeHandle::Ne,
        ResizeHandle::W,
        ResizeHandle::E,
        ResizeHandle::Sw,
        ResizeHandle::S,
        ResizeHandle::Se,
    ];

    pub fn moves_north(&self) -> bool {
        matches!(self, ResizeHandle::Nw | ResizeHandle::N | ResizeHandle::Ne)
    }

    pub fn moves_south(&self) -> bool {
        matches!(self, ResizeHandle::Sw | ResizeHandle::S | ResizeHandle::Se)
    }

    pub fn moves_west(&self) -> bool {
        matches!(self, ResizeHandle::Nw | ResizeHandle::W | ResizeHandle::Sw)
    }

    pub fn moves_east(&self) -> bool {
        matches!(self, ResizeHandle::Ne | ResizeHandle::E | ResizeHandle::Se)
    }

    /// Position of this handle on `rect`.
    pub fn position(&self, rect: Rect) -> Point {
        let cx = rect.center().x;
        let cy = rect.center().y;
        let x = if self.moves_west() {
            rect.x0
        } else if self.moves_east() {
            rect.x1
        } else {
            cx
        };
        let y = if self.moves_north() {
            rect.y0
        } else if self.moves_south() {
            rect.y1
        } else {
            cy
        };
        Point::new(x, y)
    }
}

/// All handles for `rect`, with their positions.
pub fn handles_for(rect: Rect) -> Vec<(ResizeHandle, Point)> {
    ResizeHandle::ALL
        .iter()
        .map(|handle| (*handle, handle.position(rect)))
        .collect()
}

/// Find the handle of `rect` under `point`, if any.
pub fn hit_test_handle(rect: Rect, point: Point, tolerance: f64) -> Option<ResizeHandle> {
    ResizeHandle::ALL
        .iter()
        .copied()
        .find(|handle| handle.position(rect).distance(point) <= tolerance)
}

/// Resize `start` by dragging `handle` by `delta`.
///
/// The edge opposite the handle stays anchored. Width and height never drop
/// below `min_size`; when a west or north edge hits the floor, the anchored
/// edge still does not move.
pub fn apply_resize(start: Rect, handle: ResizeHandle, delta: Vec2, min_size: f64) -> Rect {
    let mut x = start.x0;
    let mut y = start.y0;
    let mut width = start.width();
    let mut height = start.height();

    if handle.moves_east() {
        width = (start.width() + delta.x).max(min_size);
    }
    if handle.moves_west() {
        width = (start.width() - delta.x).max(min_size);
        x = start.x0 + (start.width() - width);
    }
    if handle.moves_south() {
        height = (start.height() + delta.y).max(min_size);
    }
    if handle.moves_north() {
        height = (start.height() - delta.y).max(min_size);
        y = start.y0 + (start.height() - height);
    }

    Rect::new(x, y, x + width, y + height)
}

/// Clamp a top-left position so a box of `size` stays inside `bounds`.
///
/// Boxes larger than the bounds are pinned to the top-left corner.
pub fn clamp_move(origin: Point, size: Size, bounds: Size) -> Point {
    let max_x = (bounds.width - size.width).max(0.0);
    let max_y = (bounds.height - size.height).max(0.0);
    Point::new(origin.x.clamp(0.0, max_x), origin.y.clamp(0.0, max_y))
}

/// Axis-aligned overlap test used for rectangle selection.
///
/// Touching edges count as overlap.
pub fn overlaps(a: Rect, b: Rect) -> bool {
    let a = a.abs();
    let b = b.abs();
    !(a.x0 > b.x1 || a.x1 < b.x0 || a.y0 > b.y1 || a.y1 < b.y0)
}

/// Normalized rectangle spanned by a drag from `start` to `current`.
pub fn drag_rect(start: Point, current: Point) -> Rect {
    Rect::from_points(start, current)
}
