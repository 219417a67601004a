//! Geometry primitives: points, segments, rectangles and the helper math
//! used for hitboxes and regular polygons.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Objects that can be moved, rotated and scaled in place.
///
/// Each implementor chooses its own pivot: `Point2D` transforms around the
/// origin, `LineSegment` around its own midpoint.
pub trait Transformable {
    fn translate(&mut self, dx: f32, dy: f32);
    /// Rotate by `degrees`, counter-clockwise in a y-up frame
    fn rotate(&mut self, degrees: f32);
    fn scale(&mut self, factor: f32);
}

// ============================================================================
// Point2D
// ============================================================================

/// A point in 2D space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn set(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn distance_to(&self, other: &Point2D) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Transformable for Point2D {
    fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    /// Rotation around (0, 0), not around the point itself
    fn rotate(&mut self, degrees: f32) {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let nx = self.x * cos - self.y * sin;
        let ny = self.x * sin + self.y * cos;
        self.set(nx, ny);
    }

    fn scale(&mut self, factor: f32) {
        self.x *= factor;
        self.y *= factor;
    }
}

impl From<(f32, f32)> for Point2D {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

// ============================================================================
// LineSegment
// ============================================================================

/// A segment between two points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub p1: Point2D,
    pub p2: Point2D,
}

impl LineSegment {
    pub const fn new(p1: Point2D, p2: Point2D) -> Self {
        Self { p1, p2 }
    }

    pub fn midpoint(&self) -> Point2D {
        Point2D::new((self.p1.x + self.p2.x) * 0.5, (self.p1.y + self.p2.y) * 0.5)
    }

    pub fn length(&self) -> f32 {
        self.p1.distance_to(&self.p2)
    }
}

impl Transformable for LineSegment {
    fn translate(&mut self, dx: f32, dy: f32) {
        self.p1.translate(dx, dy);
        self.p2.translate(dx, dy);
    }

    /// Rotation around the segment midpoint
    fn rotate(&mut self, degrees: f32) {
        let c = self.midpoint();
        for p in [&mut self.p1, &mut self.p2] {
            p.translate(-c.x, -c.y);
            p.rotate(degrees);
            p.translate(c.x, c.y);
        }
    }

    /// Scaling around the segment midpoint
    fn scale(&mut self, factor: f32) {
        let c = self.midpoint();
        for p in [&mut self.p1, &mut self.p2] {
            p.set(c.x + (p.x - c.x) * factor, c.y + (p.y - c.y) * factor);
        }
    }
}

// ============================================================================
// Rectangles
// ============================================================================

/// Axis-aligned rectangle in world units (top-left origin, y down)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Half-open containment: the right and bottom edges are outside
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }

    pub fn contains_point(&self, p: Point2D) -> bool {
        self.contains(p.x, p.y)
    }

    /// Overlap with positive area; rectangles that only touch do not intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        left < right && top < bottom
    }

    /// Corners in clockwise order starting at top-left
    pub fn corners(&self) -> [Point2D; 4] {
        [
            Point2D::new(self.left, self.top),
            Point2D::new(self.right(), self.top),
            Point2D::new(self.right(), self.bottom()),
            Point2D::new(self.left, self.bottom()),
        ]
    }
}

/// Integer pixel rectangle, used for sprite frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl IntRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

// ============================================================================
// Polygon math
// ============================================================================

/// Point-in-polygon test using ray casting (odd crossings = inside)
pub fn point_in_polygon(p: Point2D, vertices: &[Point2D]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let vi = vertices[i];
        let vj = vertices[j];
        // The straddle check guarantees vi.y != vj.y, so the division is safe
        if (vi.y > p.y) != (vj.y > p.y) {
            let x_cross = (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Radius of the circle circumscribing a regular polygon
pub fn circumradius(sides: u32, side_length: f32) -> f32 {
    side_length / (2.0 * (PI / sides as f32).sin())
}

/// Vertices of a regular polygon, `sides` points at equal angular steps
/// starting at `start_angle` (radians). Empty when `sides < 3`.
pub fn regular_polygon_points(
    sides: u32,
    radius: f32,
    center: Point2D,
    start_angle: f32,
) -> Vec<Point2D> {
    if sides < 3 {
        return Vec::new();
    }
    let step = 2.0 * PI / sides as f32;
    (0..sides)
        .map(|i| {
            let angle = start_angle + i as f32 * step;
            Point2D::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        })
        .collect()
}

/// Polygon approximation of an axis-aligned ellipse
pub fn ellipse_outline(center: Point2D, rx: f32, ry: f32, segments: u32) -> Vec<Point2D> {
    (0..segments)
        .map(|i| {
            let angle = 2.0 * PI * i as f32 / segments as f32;
            Point2D::new(center.x + rx * angle.cos(), center.y + ry * angle.sin())
        })
        .collect()
}

/// Rotated rectangle enclosing a thick line, extended by half the thickness
/// past both endpoints. A near-zero-length line yields an axis-aligned square
/// of side `thickness` centred on the first endpoint.
pub fn line_hitbox(x1: f32, y1: f32, x2: f32, y2: f32, thickness: f32) -> Vec<Point2D> {
    let half = thickness / 2.0;
    let dx = x2 - x1;
    let dy = y2 - y1;
    let len = (dx * dx + dy * dy).sqrt();

    if len < 0.001 {
        return vec![
            Point2D::new(x1 - half, y1 - half),
            Point2D::new(x1 + half, y1 - half),
            Point2D::new(x1 + half, y1 + half),
            Point2D::new(x1 - half, y1 + half),
        ];
    }

    // Unit direction and its perpendicular
    let (nx, ny) = (dx / len, dy / len);
    let (px, py) = (-ny, nx);

    vec![
        Point2D::new(x1 + (px - nx) * half, y1 + (py - ny) * half),
        Point2D::new(x2 + (px + nx) * half, y2 + (py + ny) * half),
        Point2D::new(x2 + (nx - px) * half, y2 + (ny - py) * half),
        Point2D::new(x1 - (px + nx) * half, y1 - (py + ny) * half),
    ]
}
