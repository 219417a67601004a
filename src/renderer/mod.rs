//! Primitive rasterizer.
//!
//! `PrimitiveRenderer` borrows a [`Surface`] for the duration of a frame.
//! Simple shapes go to the surface's native primitives, the symmetric
//! circle/ellipse and the incremental line are scan-converted here point by
//! point, and the area fills run on a snapshot of the surface.

pub mod fill;

use std::rc::Rc;

use log::info;

use crate::display::{Color, PixelBuffer, Surface};
use crate::error::RenderError;
use crate::geometry::{circumradius, regular_polygon_points, IntRect, Point2D};
use crate::sprite::Texture;

/// Anything that knows how to draw itself with primitives
pub trait Drawable {
    fn draw(&self, renderer: &mut PrimitiveRenderer<'_>) -> Result<(), RenderError>;
}

/// Stateless-per-call drawing front end over an optional surface.
///
/// Every operation is a silent no-op while no surface is bound.
#[derive(Default)]
pub struct PrimitiveRenderer<'a> {
    target: Option<&'a mut dyn Surface>,
}

#[inline]
fn px(v: f32) -> i32 {
    v.round() as i32
}

/// Bresenham midpoint circle, first octant from (0, r) while x <= y.
/// The decision variable is 64-bit so large radii cannot overflow.
struct CircleOctant {
    x: i64,
    y: i64,
    d: i64,
}

impl CircleOctant {
    fn new(radius: i32) -> Self {
        let r = i64::from(radius);
        Self { x: 0, y: r, d: 3 - 2 * r }
    }
}

impl Iterator for CircleOctant {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.x > self.y {
            return None;
        }
        let point = (self.x as i32, self.y as i32);
        if self.d < 0 {
            self.d += 4 * self.x + 6;
        } else {
            self.d += 4 * (self.x - self.y) + 10;
            self.y -= 1;
        }
        self.x += 1;
        Some(point)
    }
}

fn check_radius(radius: f32) -> Result<(), RenderError> {
    if radius.is_nan() || radius <= 0.0 {
        return Err(RenderError::NonPositiveRadius(radius));
    }
    Ok(())
}

impl<'a> PrimitiveRenderer<'a> {
    pub fn new(target: &'a mut dyn Surface) -> Self {
        Self {
            target: Some(target),
        }
    }

    /// A renderer with nothing to draw on
    pub fn unbound() -> Self {
        Self { target: None }
    }

    pub fn clear(&mut self, color: Color) {
        if let Some(surface) = self.target.as_deref_mut() {
            surface.clear(color);
        }
    }

    pub fn draw_point(&mut self, x: f32, y: f32, color: Color) {
        if let Some(surface) = self.target.as_deref_mut() {
            surface.plot(px(x), px(y), color);
        }
    }

    /// Native surface line
    pub fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Color) {
        if let Some(surface) = self.target.as_deref_mut() {
            surface.line(px(x1), px(y1), px(x2), px(y2), color);
        }
    }

    /// DDA line. Plots `steps + 1` points where `steps` is the larger axis
    /// delta (rounded up), and both endpoints exactly.
    pub fn draw_line_incremental(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Color) {
        let Some(surface) = self.target.as_deref_mut() else {
            return;
        };

        let dx = x2 - x1;
        let dy = y2 - y1;
        let steps = dx.abs().max(dy.abs()).ceil() as u32;
        if steps == 0 {
            surface.plot(px(x1), px(y1), color);
            return;
        }

        let x_inc = dx / steps as f32;
        let y_inc = dy / steps as f32;
        for i in 0..=steps {
            let (x, y) = if i == steps {
                (x2, y2)
            } else {
                (x1 + x_inc * i as f32, y1 + y_inc * i as f32)
            };
            surface.plot(px(x), px(y), color);
        }
    }

    /// Connected segments through `points`; `closed` adds last -> first
    pub fn draw_poly_line(&mut self, points: &[Point2D], closed: bool, color: Color) {
        if points.len() < 2 {
            return;
        }
        for pair in points.windows(2) {
            self.draw_line(pair[0].x, pair[0].y, pair[1].x, pair[1].y, color);
        }
        if closed {
            let (first, last) = (points[0], points[points.len() - 1]);
            self.draw_line(last.x, last.y, first.x, first.y, color);
        }
    }

    /// Native surface circle with fill and optional outline
    pub fn draw_circle(
        &mut self,
        cx: f32,
        cy: f32,
        radius: f32,
        fill: Color,
        outline: Color,
    ) -> Result<(), RenderError> {
        check_radius(radius)?;
        if let Some(surface) = self.target.as_deref_mut() {
            surface.circle(px(cx), px(cy), px(radius), fill, outline);
        }
        Ok(())
    }

    /// Bresenham midpoint circle ring with 8-way symmetry
    pub fn draw_circle_symmetric(
        &mut self,
        cx: f32,
        cy: f32,
        radius: f32,
        color: Color,
    ) -> Result<(), RenderError> {
        check_radius(radius)?;
        let Some(surface) = self.target.as_deref_mut() else {
            return Ok(());
        };

        let (cx, cy) = (px(cx), px(cy));
        for (x, y) in CircleOctant::new(px(radius)) {
            for (ox, oy) in [
                (x, y),
                (-x, y),
                (x, -y),
                (-x, -y),
                (y, x),
                (-y, x),
                (y, -x),
                (-y, -x),
            ] {
                surface.plot(cx + ox, cy + oy, color);
            }
        }
        Ok(())
    }

    /// Two-region midpoint ellipse with 4-way symmetry
    pub fn draw_ellipse_symmetric(
        &mut self,
        cx: f32,
        cy: f32,
        rx: f32,
        ry: f32,
        color: Color,
    ) -> Result<(), RenderError> {
        check_radius(rx)?;
        check_radius(ry)?;
        let Some(surface) = self.target.as_deref_mut() else {
            return Ok(());
        };

        let (cx, cy) = (px(cx), px(cy));
        let rx = f64::from(px(rx));
        let ry = f64::from(px(ry));
        let rx2 = rx * rx;
        let ry2 = ry * ry;

        let mut plot4 = |x: f64, y: f64| {
            let (x, y) = (x as i32, y as i32);
            surface.plot(cx + x, cy + y, color);
            surface.plot(cx - x, cy + y, color);
            surface.plot(cx + x, cy - y, color);
            surface.plot(cx - x, cy - y, color);
        };

        let mut x = 0.0;
        let mut y = ry;
        let mut dx = 2.0 * ry2 * x;
        let mut dy = 2.0 * rx2 * y;

        // Region 1: slope magnitude below 1
        let mut d1 = ry2 - rx2 * ry + 0.25 * rx2;
        while dx < dy {
            plot4(x, y);
            x += 1.0;
            dx += 2.0 * ry2;
            if d1 < 0.0 {
                d1 += dx + ry2;
            } else {
                y -= 1.0;
                dy -= 2.0 * rx2;
                d1 += dx - dy + ry2;
            }
        }

        // Region 2: from the slope -1 point down to the major axis
        let mut d2 = ry2 * (x + 0.5) * (x + 0.5) + rx2 * (y - 1.0) * (y - 1.0) - rx2 * ry2;
        while y >= 0.0 {
            plot4(x, y);
            y -= 1.0;
            dy -= 2.0 * rx2;
            if d2 > 0.0 {
                d2 += rx2 - dy;
            } else {
                x += 1.0;
                dx += 2.0 * ry2;
                d2 += dx - dy + rx2;
            }
        }
        Ok(())
    }

    /// Closed regular polygon. Inputs are validated before anything is drawn.
    pub fn draw_polygon(
        &mut self,
        sides: u32,
        side_length: f32,
        center: Point2D,
        start_angle: f32,
        color: Color,
    ) -> Result<(), RenderError> {
        if sides < 3 {
            return Err(RenderError::TooFewSides(sides));
        }
        if side_length.is_nan() || side_length <= 0.0 {
            return Err(RenderError::NonPositiveSideLength(side_length));
        }
        let points = regular_polygon_points(sides, circumradius(sides, side_length), center, start_angle);
        self.draw_poly_line(&points, true, color);
        Ok(())
    }

    /// Copy a texture region with its top-left corner at (x, y)
    pub fn draw_texture(&mut self, texture: &Rc<Texture>, src: IntRect, x: f32, y: f32) {
        if let Some(surface) = self.target.as_deref_mut() {
            surface.draw_texture(texture, src, px(x), px(y));
        }
    }

    // ========================================================================
    // Area fills (snapshot, mutate, blit back)
    // ========================================================================

    /// Runs `fill_fn` on a snapshot when (x, y) is on the surface, blitting
    /// back only if something changed
    fn with_snapshot(
        &mut self,
        x: i32,
        y: i32,
        fill_fn: impl FnOnce(&mut PixelBuffer) -> usize,
    ) -> Result<usize, RenderError> {
        let Some(surface) = self.target.as_deref_mut() else {
            return Ok(0);
        };
        let (w, h) = surface.size();
        if x < 0 || y < 0 || x >= w as i32 || y >= h as i32 {
            return Ok(0);
        }

        let mut snapshot = surface.snapshot()?;
        let changed = fill_fn(&mut snapshot);
        if changed > 0 {
            surface.blit(&snapshot)?;
        }
        Ok(changed)
    }

    /// Replace the start pixel's connected color region with `fill`.
    ///
    /// With `expected = Some(c)` the fill only runs when the start pixel is `c`.
    /// Returns the number of pixels changed.
    pub fn flood_fill(
        &mut self,
        x: i32,
        y: i32,
        fill: Color,
        expected: Option<Color>,
    ) -> Result<usize, RenderError> {
        let changed = self.with_snapshot(x, y, |buffer| {
            match (expected, buffer.get_pixel(x, y)) {
                (Some(want), Some(found)) if want != found => 0,
                _ => fill::flood_fill(buffer, x, y, fill),
            }
        })?;
        info!("Flood fill at ({}, {}): {} pixels", x, y, changed);
        Ok(changed)
    }

    /// Fill outward from (x, y) until `boundary` pixels stop the spread
    pub fn boundary_fill(
        &mut self,
        x: i32,
        y: i32,
        fill: Color,
        boundary: Color,
    ) -> Result<usize, RenderError> {
        let changed =
            self.with_snapshot(x, y, |buffer| fill::boundary_fill(buffer, x, y, fill, boundary))?;
        info!("Boundary fill at ({}, {}): {} pixels", x, y, changed);
        Ok(changed)
    }
}
