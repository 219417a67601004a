//! Area fills over a materialized pixel grid.
//!
//! Both fills are breadth-first and 4-connected. A pixel is recolored the
//! moment it is queued, so every pixel is visited at most once and the work
//! is bounded by the buffer area.

use std::collections::VecDeque;

use crate::display::{Color, PixelBuffer};

const NEIGHBORS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Generic queue fill: starting at (x, y), recolor every 4-connected pixel
/// for which `spreads` holds. Returns the number of pixels changed.
fn queue_fill(
    buffer: &mut PixelBuffer,
    x: i32,
    y: i32,
    fill: Color,
    spreads: impl Fn(Color) -> bool,
) -> usize {
    match buffer.get_pixel(x, y) {
        Some(c) if spreads(c) => {},
        _ => return 0,
    }

    let mut queue = VecDeque::new();
    buffer.set_pixel(x, y, fill);
    queue.push_back((x, y));
    let mut changed = 1;

    while let Some((px, py)) = queue.pop_front() {
        for (dx, dy) in NEIGHBORS {
            let (nx, ny) = (px + dx, py + dy);
            if let Some(c) = buffer.get_pixel(nx, ny) {
                if spreads(c) {
                    buffer.set_pixel(nx, ny, fill);
                    queue.push_back((nx, ny));
                    changed += 1;
                }
            }
        }
    }

    changed
}

/// Replace the region of the start pixel's color with `fill`.
///
/// No-op when the start is out of bounds or already `fill`.
pub fn flood_fill(buffer: &mut PixelBuffer, x: i32, y: i32, fill: Color) -> usize {
    let Some(target) = buffer.get_pixel(x, y) else {
        return 0;
    };
    if target == fill {
        return 0;
    }
    queue_fill(buffer, x, y, fill, |c| c == target)
}

/// Fill outward until pixels of `boundary` (or already `fill`) are reached.
///
/// Any other color is filled over, so an unclosed boundary leaks.
pub fn boundary_fill(buffer: &mut PixelBuffer, x: i32, y: i32, fill: Color, boundary: Color) -> usize {
    queue_fill(buffer, x, y, fill, |c| c != fill && c != boundary)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 12x12 black buffer with a red square outline from (2,2) to (9,9)
    fn boxed() -> PixelBuffer {
        let mut buf = PixelBuffer::with_size(12, 12);
        for i in 2..=9 {
            buf.set_pixel(i, 2, Color::RED);
            buf.set_pixel(i, 9, Color::RED);
            buf.set_pixel(2, i, Color::RED);
            buf.set_pixel(9, i, Color::RED);
        }
        buf
    }

    #[test]
    fn test_flood_fill_replaces_connected_region_only() {
        let mut buf = boxed();
        let changed = flood_fill(&mut buf, 5, 5, Color::BLUE);
        assert_eq!(changed, 36); // 6x6 interior
        assert_eq!(buf.get_pixel(3, 3), Some(Color::BLUE));
        assert_eq!(buf.get_pixel(8, 8), Some(Color::BLUE));
        assert_eq!(buf.get_pixel(2, 5), Some(Color::RED));
        assert_eq!(buf.get_pixel(0, 0), Some(Color::BLACK));
    }

    #[test]
    fn test_flood_fill_with_same_color_is_noop() {
        let mut buf = boxed();
        let before = buf.clone();
        assert_eq!(flood_fill(&mut buf, 5, 5, Color::BLACK), 0);
        assert_eq!(buf, before);
    }

    #[test]
    fn test_fills_ignore_out_of_bounds_start() {
        let mut buf = boxed();
        let before = buf.clone();
        assert_eq!(flood_fill(&mut buf, -1, 5, Color::BLUE), 0);
        assert_eq!(boundary_fill(&mut buf, 5, 12, Color::BLUE, Color::RED), 0);
        assert_eq!(buf, before);
    }

    #[test]
    fn test_boundary_fill_stays_inside_closed_border() {
        let mut buf = boxed();
        let before = buf.clone();
        boundary_fill(&mut buf, 4, 6, Color::YELLOW, Color::RED);
        for y in 0..12 {
            for x in 0..12 {
                let interior = (3..=8).contains(&x) && (3..=8).contains(&y);
                let expected = if interior {
                    Color::YELLOW
                } else {
                    before.get_pixel(x, y).unwrap()
                };
                assert_eq!(buf.get_pixel(x, y), Some(expected), "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_boundary_fill_crosses_foreign_colors() {
        let mut buf = boxed();
        buf.set_pixel(5, 5, Color::GREEN);
        boundary_fill(&mut buf, 4, 4, Color::YELLOW, Color::RED);
        assert_eq!(buf.get_pixel(5, 5), Some(Color::YELLOW));
    }

    #[test]
    fn test_boundary_fill_leaks_through_gap() {
        let mut buf = boxed();
        buf.set_pixel(9, 5, Color::BLACK);
        boundary_fill(&mut buf, 4, 4, Color::YELLOW, Color::RED);
        assert_eq!(buf.get_pixel(0, 0), Some(Color::YELLOW));
    }

    #[test]
    fn test_boundary_fill_on_boundary_pixel_is_noop() {
        let mut buf = boxed();
        assert_eq!(boundary_fill(&mut buf, 2, 2, Color::YELLOW, Color::RED), 0);
    }
}
