//! Exact-shape hitboxes tested against an axis-aligned query rectangle.

use log::debug;

use crate::geometry::{point_in_polygon, Point2D, Rect};

/// A single hitbox
#[derive(Debug, Clone, PartialEq)]
pub enum CollisionShape {
    Rectangle(Rect),
    Circle { center: Point2D, radius: f32 },
    /// Needs at least 3 points to ever report a hit
    Polygon(Vec<Point2D>),
}

impl CollisionShape {
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        shape_intersects_rect(self, rect)
    }
}

/// Dispatch the overlap test on the shape variant
pub fn shape_intersects_rect(shape: &CollisionShape, rect: &Rect) -> bool {
    match shape {
        CollisionShape::Rectangle(r) => r.intersects(rect),
        CollisionShape::Circle { center, radius } => circle_intersects_rect(*center, *radius, rect),
        CollisionShape::Polygon(points) => polygon_intersects_rect(points, rect),
    }
}

/// Distance from the circle center to the closest point of the rectangle
fn circle_intersects_rect(center: Point2D, radius: f32, rect: &Rect) -> bool {
    let closest_x = center.x.clamp(rect.left, rect.right());
    let closest_y = center.y.clamp(rect.top, rect.bottom());
    let dx = center.x - closest_x;
    let dy = center.y - closest_y;
    dx * dx + dy * dy <= radius * radius
}

/// Does segment (p1, p2) cross the axis-aligned segment from (x1, y1) to (x2, y2)?
/// The axis-aligned segment is either vertical (x1 == x2) or horizontal.
fn segment_crosses_axis_segment(p1: Point2D, p2: Point2D, x1: f32, y1: f32, x2: f32, y2: f32) -> bool {
    if x1 == x2 {
        // Vertical side at x = x1, spanning y1..y2
        let dx = p2.x - p1.x;
        if dx == 0.0 {
            return false;
        }
        let t = (x1 - p1.x) / dx;
        if !(0.0..=1.0).contains(&t) {
            return false;
        }
        let y = p1.y + t * (p2.y - p1.y);
        y >= y1.min(y2) && y <= y1.max(y2)
    } else {
        // Horizontal side at y = y1, spanning x1..x2
        let dy = p2.y - p1.y;
        if dy == 0.0 {
            return false;
        }
        let t = (y1 - p1.y) / dy;
        if !(0.0..=1.0).contains(&t) {
            return false;
        }
        let x = p1.x + t * (p2.x - p1.x);
        x >= x1.min(x2) && x <= x1.max(x2)
    }
}

/// Vertex containment, then corner containment, then edge crossings.
/// The last stage catches edges that pass through the rectangle with no
/// vertex inside it.
fn polygon_intersects_rect(points: &[Point2D], rect: &Rect) -> bool {
    if points.len() < 3 {
        return false;
    }

    if points.iter().any(|p| rect.contains_point(*p)) {
        return true;
    }

    let corners = rect.corners();
    if corners.iter().any(|c| point_in_polygon(*c, points)) {
        return true;
    }

    let sides = [
        (corners[0], corners[1]),
        (corners[1], corners[2]),
        (corners[2], corners[3]),
        (corners[3], corners[0]),
    ];
    let n = points.len();
    (0..n).any(|i| {
        let (p1, p2) = (points[i], points[(i + 1) % n]);
        sides
            .iter()
            .any(|(a, b)| segment_crosses_axis_segment(p1, p2, a.x, a.y, b.x, b.y))
    })
}

// ============================================================================
// Hitbox list
// ============================================================================

/// Ordered list of hitboxes, rebuilt every frame by the scene
#[derive(Debug, Clone, Default)]
pub struct Hitboxes {
    shapes: Vec<CollisionShape>,
}

impl Hitboxes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rectangle(&mut self, rect: Rect) {
        self.shapes.push(CollisionShape::Rectangle(rect));
    }

    pub fn add_circle(&mut self, center: Point2D, radius: f32) {
        self.shapes.push(CollisionShape::Circle { center, radius });
    }

    pub fn add_polygon(&mut self, points: Vec<Point2D>) {
        self.shapes.push(CollisionShape::Polygon(points));
    }

    pub fn push(&mut self, shape: CollisionShape) {
        self.shapes.push(shape);
    }

    pub fn clear(&mut self) {
        if !self.shapes.is_empty() {
            debug!("Cleared {} hitboxes", self.shapes.len());
        }
        self.shapes.clear();
    }

    /// Short-circuits on the first hit
    pub fn any_intersects(&self, rect: &Rect) -> bool {
        self.shapes.iter().any(|s| s.intersects_rect(rect))
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

}
