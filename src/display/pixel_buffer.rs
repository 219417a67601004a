use super::Color;
use crate::geometry::IntRect;
use crate::sprite::Texture;

// ============================================================================
// Utility Functions
// ============================================================================

/// Alpha blend a single color channel
/// Uses fast approximation: (x + 1 + (x >> 8)) >> 8 instead of x / 255
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u16) -> u8 {
    let result = src as u16 * alpha + dst as u16 * (255 - alpha);
    ((result + 1 + (result >> 8)) >> 8) as u8
}

/// Write ABGR pixel to slice (RGBA8888 little-endian byte order)
#[inline]
fn write_pixel(dest: &mut [u8], c: Color) {
    dest[0] = c.a; // A
    dest[1] = c.b; // B
    dest[2] = c.g; // G
    dest[3] = c.r; // R
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// RGBA8888 pixel grid with random read/write access.
///
/// Serves both as a software render target and as the materialized snapshot
/// that area fills operate on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Create a black, opaque pixel buffer
    pub fn with_size(width: u32, height: u32) -> Self {
        let mut buffer = Self {
            pixels: vec![0; (width * height * 4) as usize],
            width,
            height,
        };
        buffer.clear(Color::BLACK);
        buffer
    }

    /// Wrap raw RGBA8888 bytes (as read back from an SDL render target)
    pub fn from_bytes(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == (width * height * 4) as usize).then_some(Self {
            pixels,
            width,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check if coordinates are within bounds
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Calculate byte offset for pixel at (x, y)
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        ((y * self.width + x) * 4) as usize
    }

    /// Clear to a solid color
    pub fn clear(&mut self, color: Color) {
        for chunk in self.pixels.chunks_exact_mut(4) {
            write_pixel(chunk, color);
        }
    }

    /// Overwrite a single pixel, alpha included (bounds checked)
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            write_pixel(&mut self.pixels[idx..idx + 4], color);
        }
    }

    /// Source-over plot: transparent colors are skipped, opaque colors
    /// overwrite, anything in between is blended onto an opaque result
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color) {
        match color.a {
            0 => {},
            255 => self.set_pixel(x, y, color),
            a => {
                if self.in_bounds(x, y) {
                    let idx = self.pixel_index(x as u32, y as u32);
                    let alpha = a as u16;
                    self.pixels[idx] = 255; // A - always opaque
                    self.pixels[idx + 1] = blend_channel(color.b, self.pixels[idx + 1], alpha);
                    self.pixels[idx + 2] = blend_channel(color.g, self.pixels[idx + 2], alpha);
                    self.pixels[idx + 3] = blend_channel(color.r, self.pixels[idx + 3], alpha);
                }
            },
        }
    }

    /// Read a pixel from the buffer (bounds checked)
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Color> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            Some(Color::rgba(
                self.pixels[idx + 3], // R
                self.pixels[idx + 2], // G
                self.pixels[idx + 1], // B
                self.pixels[idx],     // A
            ))
        } else {
            None
        }
    }

    /// Draw a horizontal span
    pub fn hline(&mut self, x1: i32, x2: i32, y: i32, color: Color) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let start = x1.max(0);
        let end = x2.min(self.width as i32 - 1);
        for x in start..=end {
            self.blend_pixel(x, y, color);
        }
    }

    /// Fill a rectangle
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Color) {
        for row in 0..h as i32 {
            self.hline(x, x + w as i32 - 1, y + row, color);
        }
    }

    /// Draw a line using Bresenham's algorithm with Cohen-Sutherland clipping
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let Some((cx0, cy0, cx1, cy1)) = self.clip_line(x0, y0, x1, y1) else {
            return;
        };

        let dx = (cx1 - cx0).abs();
        let dy = -((cy1 - cy0).abs());
        let sx = if cx0 < cx1 { 1i32 } else { -1i32 };
        let sy = if cy0 < cy1 { 1i32 } else { -1i32 };
        let mut err = dx + dy;
        let mut x = cx0;
        let mut y = cy0;

        loop {
            self.blend_pixel(x, y, color);
            if x == cx1 && y == cy1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Cohen-Sutherland line clipping algorithm
    /// Returns the clipped endpoints, or None when the line is fully outside
    fn clip_line(
        &self,
        mut x0: i32,
        mut y0: i32,
        mut x1: i32,
        mut y1: i32,
    ) -> Option<(i32, i32, i32, i32)> {
        const INSIDE: u8 = 0;
        const LEFT: u8 = 1;
        const RIGHT: u8 = 2;
        const BOTTOM: u8 = 4;
        const TOP: u8 = 8;
        // Converges in at most 4 iterations for valid input
        const MAX_ITERATIONS: u32 = 16;

        let w = self.width as i32;
        let h = self.height as i32;

        let outcode = |x: i32, y: i32| -> u8 {
            let mut code = INSIDE;
            if x < 0 {
                code |= LEFT;
            } else if x >= w {
                code |= RIGHT;
            }
            if y < 0 {
                code |= TOP;
            } else if y >= h {
                code |= BOTTOM;
            }
            code
        };

        let mut code0 = outcode(x0, y0);
        let mut code1 = outcode(x1, y1);

        for _ in 0..MAX_ITERATIONS {
            if (code0 | code1) == 0 {
                return Some((x0, y0, x1, y1));
            }
            if (code0 & code1) != 0 {
                return None;
            }

            let code_out = if code0 != 0 { code0 } else { code1 };
            let dy = y1 - y0;
            let dx = x1 - x0;

            let (x, y) = if (code_out & BOTTOM) != 0 {
                if dy == 0 {
                    return None;
                }
                (x0 + dx * (h - 1 - y0) / dy, h - 1)
            } else if (code_out & TOP) != 0 {
                if dy == 0 {
                    return None;
                }
                (x0 + dx * (0 - y0) / dy, 0)
            } else if (code_out & RIGHT) != 0 {
                if dx == 0 {
                    return None;
                }
                (w - 1, y0 + dy * (w - 1 - x0) / dx)
            } else {
                if dx == 0 {
                    return None;
                }
                (0, y0 + dy * (0 - x0) / dx)
            };

            if code_out == code0 {
                x0 = x;
                y0 = y;
                code0 = outcode(x0, y0);
            } else {
                x1 = x;
                y1 = y;
                code1 = outcode(x1, y1);
            }
        }

        None
    }

    /// Draw a filled circle using horizontal spans
    pub fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Color) {
        if radius <= 0 {
            if radius == 0 {
                self.blend_pixel(cx, cy, color);
            }
            return;
        }

        let mut x = radius;
        let mut y = 0;
        let mut err = 1 - radius;

        while x >= y {
            // Fill horizontal spans for 4 quadrants, avoiding duplicates
            self.hline(cx - x, cx + x, cy + y, color);
            if y != 0 {
                self.hline(cx - x, cx + x, cy - y, color);
            }
            if x != y {
                self.hline(cx - y, cx + y, cy + x, color);
                if y != 0 {
                    self.hline(cx - y, cx + y, cy - x, color);
                }
            }

            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
    }

    /// Draw a circle outline (1px thick)
    pub fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Color) {
        let mut x = radius;
        let mut y = 0;
        let mut err = 0;

        while x >= y {
            self.blend_pixel(cx + x, cy + y, color);
            self.blend_pixel(cx + y, cy + x, color);
            self.blend_pixel(cx - y, cy + x, color);
            self.blend_pixel(cx - x, cy + y, color);
            self.blend_pixel(cx - x, cy - y, color);
            self.blend_pixel(cx - y, cy - x, color);
            self.blend_pixel(cx + y, cy - x, color);
            self.blend_pixel(cx + x, cy - y, color);

            y += 1;
            err += 1 + 2 * y;
            if 2 * (err - x) + 1 > 0 {
                x -= 1;
                err += 1 - 2 * x;
            }
        }
    }

    // ========================================================================
    // Buffer Operations
    // ========================================================================

    /// Copy a sub-rectangle of an RGBA texture to (x, y), alpha blended
    pub fn blit_texture(&mut self, texture: &Texture, src: IntRect, x: i32, y: i32) {
        for ty in 0..src.height {
            for tx in 0..src.width {
                if let Some(c) = texture.pixel(src.x + tx, src.y + ty) {
                    self.blend_pixel(x + tx as i32, y + ty as i32, c);
                }
            }
        }
    }

    /// Copy contents from another buffer. Returns false on a size mismatch.
    pub fn copy_from(&mut self, src: &PixelBuffer) -> bool {
        if self.width != src.width || self.height != src.height {
            return false;
        }
        self.pixels.copy_from_slice(&src.pixels);
        true
    }

    /// Raw bytes for SDL texture upload
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_opaque_black() {
        let buf = PixelBuffer::with_size(4, 3);
        assert_eq!(buf.get_pixel(3, 2), Some(Color::BLACK));
        assert_eq!(buf.get_pixel(4, 0), None);
        assert_eq!(buf.get_pixel(-1, 0), None);
    }

    #[test]
    fn test_byte_layout_is_abgr() {
        let mut buf = PixelBuffer::with_size(1, 1);
        buf.set_pixel(0, 0, Color::rgba(1, 2, 3, 4));
        assert_eq!(buf.as_bytes(), &[4, 3, 2, 1]);
    }

    #[test]
    fn test_transparent_plot_is_skipped() {
        let mut buf = PixelBuffer::with_size(2, 2);
        buf.blend_pixel(0, 0, Color::TRANSPARENT);
        assert_eq!(buf.get_pixel(0, 0), Some(Color::BLACK));
    }

    #[test]
    fn test_half_alpha_blends_towards_source() {
        let mut buf = PixelBuffer::with_size(1, 1);
        buf.blend_pixel(0, 0, Color::rgba(255, 255, 255, 128));
        let c = buf.get_pixel(0, 0).unwrap();
        assert!(c.r > 120 && c.r < 135, "got {}", c.r);
        assert_eq!(c.a, 255);
    }

    #[test]
    fn test_line_clips_without_panicking() {
        let mut buf = PixelBuffer::with_size(10, 10);
        buf.line(-20, 5, 30, 5, Color::RED);
        for x in 0..10 {
            assert_eq!(buf.get_pixel(x, 5), Some(Color::RED));
        }
        buf.line(-5, -5, -1, -1, Color::GREEN);
    }

    #[test]
    fn test_fill_circle_covers_center_and_radius() {
        let mut buf = PixelBuffer::with_size(21, 21);
        buf.fill_circle(10, 10, 5, Color::BLUE);
        assert_eq!(buf.get_pixel(10, 10), Some(Color::BLUE));
        assert_eq!(buf.get_pixel(15, 10), Some(Color::BLUE));
        assert_eq!(buf.get_pixel(16, 10), Some(Color::BLACK));
    }

    #[test]
    fn test_copy_from_rejects_size_mismatch() {
        let mut a = PixelBuffer::with_size(2, 2);
        let b = PixelBuffer::with_size(3, 2);
        assert!(!a.copy_from(&b));
    }

    #[test]
    fn test_from_bytes_validates_length() {
        assert!(PixelBuffer::from_bytes(2, 2, vec![0; 15]).is_none());
        assert!(PixelBuffer::from_bytes(2, 2, vec![0; 16]).is_some());
    }
}
