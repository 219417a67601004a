//! Drawing surfaces.
//!
//! A [`Surface`] is anything the primitive renderer can draw on. The window
//! canvas draws through SDL2's native primitives and cannot be read pixel by
//! pixel, so area fills go through [`Surface::snapshot`] and
//! [`Surface::blit`]: copy the frame out, mutate it on the CPU, copy it back.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, trace};
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::{Point, Rect as SdlRect};
use sdl2::render::{BlendMode, Canvas, RenderTarget, Texture as SdlTexture, TextureCreator};

use super::{Color, PixelBuffer};
use crate::error::RenderError;
use crate::geometry::IntRect;
use crate::sprite::Texture;

pub trait Surface {
    /// Pixel dimensions (width, height)
    fn size(&self) -> (u32, u32);

    fn clear(&mut self, color: Color);

    fn plot(&mut self, x: i32, y: i32, color: Color);

    /// Native two-vertex line
    fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Color);

    /// Native circle shape. A transparent `outline` draws no outline.
    fn circle(&mut self, cx: i32, cy: i32, radius: i32, fill: Color, outline: Color);

    /// Copy the `src` region of `texture` with its top-left corner at (x, y)
    fn draw_texture(&mut self, texture: &Rc<Texture>, src: IntRect, x: i32, y: i32);

    /// Materialize the current contents as a readable pixel grid
    fn snapshot(&mut self) -> Result<PixelBuffer, RenderError>;

    /// Replace the whole surface with `buffer`
    fn blit(&mut self, buffer: &PixelBuffer) -> Result<(), RenderError>;
}

// ============================================================================
// Software surface
// ============================================================================

impl Surface for PixelBuffer {
    fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn clear(&mut self, color: Color) {
        PixelBuffer::clear(self, color);
    }

    fn plot(&mut self, x: i32, y: i32, color: Color) {
        self.blend_pixel(x, y, color);
    }

    fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Color) {
        PixelBuffer::line(self, x1, y1, x2, y2, color);
    }

    fn circle(&mut self, cx: i32, cy: i32, radius: i32, fill: Color, outline: Color) {
        self.fill_circle(cx, cy, radius, fill);
        if outline.a != 0 {
            self.draw_circle(cx, cy, radius, outline);
        }
    }

    fn draw_texture(&mut self, texture: &Rc<Texture>, src: IntRect, x: i32, y: i32) {
        self.blit_texture(texture, src, x, y);
    }

    fn snapshot(&mut self) -> Result<PixelBuffer, RenderError> {
        Ok(self.clone())
    }

    fn blit(&mut self, buffer: &PixelBuffer) -> Result<(), RenderError> {
        if self.copy_from(buffer) {
            Ok(())
        } else {
            Err(RenderError::Surface(format!(
                "buffer is {}x{}, surface is {}x{}",
                buffer.width(),
                buffer.height(),
                self.width(),
                self.height()
            )))
        }
    }
}

// ============================================================================
// Accelerated surface (SDL2 canvas)
// ============================================================================

/// First octant of a midpoint circle, (x, y) with x >= y
fn circle_octant(radius: i32) -> Vec<(i32, i32)> {
    let mut points = Vec::new();
    let mut x = i64::from(radius);
    let mut y = 0_i64;
    let mut err = 1 - x;
    while x >= y {
        points.push((x as i32, y as i32));
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
    points
}

/// SDL copies of sprite textures, uploaded once per shared [`Texture`].
///
/// Entries are keyed by `Rc` identity and keep their `Rc` alive, so a key
/// cannot be reused by another texture while it is cached.
pub struct TextureUploads<'c, C> {
    creator: &'c TextureCreator<C>,
    entries: HashMap<usize, (Rc<Texture>, SdlTexture<'c>)>,
}

impl<'c, C> TextureUploads<'c, C> {
    pub fn new(creator: &'c TextureCreator<C>) -> Self {
        Self {
            creator,
            entries: HashMap::new(),
        }
    }

    /// Number of distinct textures uploaded so far
    pub fn uploaded_count(&self) -> usize {
        self.entries.len()
    }

    fn get_or_upload(&mut self, texture: &Rc<Texture>) -> Result<&SdlTexture<'c>, String> {
        let key = Rc::as_ptr(texture) as usize;
        match self.entries.entry(key) {
            Entry::Occupied(entry) => Ok(&entry.into_mut().1),
            Entry::Vacant(entry) => {
                // Texture bytes are R,G,B,A in memory, which SDL calls ABGR8888 on little-endian
                let mut uploaded = self
                    .creator
                    .create_texture_static(PixelFormatEnum::ABGR8888, texture.width(), texture.height())
                    .map_err(|e| e.to_string())?;
                uploaded.set_blend_mode(BlendMode::Blend);
                uploaded
                    .update(None, texture.as_bytes(), (texture.width() * 4) as usize)
                    .map_err(|e| e.to_string())?;
                debug!("Uploaded {}x{} sprite texture", texture.width(), texture.height());
                Ok(&entry.insert((Rc::clone(texture), uploaded)).1)
            },
        }
    }
}

/// An SDL canvas borrowed for one frame, with the sprite upload cache
pub struct CanvasSurface<'s, 'c, T: RenderTarget> {
    canvas: &'s mut Canvas<T>,
    uploads: &'s mut TextureUploads<'c, T::Context>,
}

impl<'s, 'c, T: RenderTarget> CanvasSurface<'s, 'c, T> {
    pub fn new(canvas: &'s mut Canvas<T>, uploads: &'s mut TextureUploads<'c, T::Context>) -> Self {
        Self { canvas, uploads }
    }
}

impl<T: RenderTarget> Surface for CanvasSurface<'_, '_, T> {
    fn size(&self) -> (u32, u32) {
        self.canvas.output_size().unwrap_or_default()
    }

    fn clear(&mut self, color: Color) {
        self.canvas.set_draw_color(color.to_sdl());
        self.canvas.clear();
    }

    fn plot(&mut self, x: i32, y: i32, color: Color) {
        self.canvas.set_draw_color(color.to_sdl());
        if let Err(e) = self.canvas.draw_point(Point::new(x, y)) {
            trace!("draw_point failed: {}", e);
        }
    }

    fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Color) {
        self.canvas.set_draw_color(color.to_sdl());
        if let Err(e) = self.canvas.draw_line(Point::new(x1, y1), Point::new(x2, y2)) {
            trace!("draw_line failed: {}", e);
        }
    }

    fn circle(&mut self, cx: i32, cy: i32, radius: i32, fill: Color, outline: Color) {
        if radius < 0 {
            return;
        }
        let octant = circle_octant(radius);

        if fill.a != 0 {
            self.canvas.set_draw_color(fill.to_sdl());
            for &(x, y) in &octant {
                for (half, dy) in [(x, y), (x, -y), (y, x), (y, -x)] {
                    if let Err(e) = self
                        .canvas
                        .draw_line(Point::new(cx - half, cy + dy), Point::new(cx + half, cy + dy))
                    {
                        trace!("circle span failed: {}", e);
                    }
                }
            }
        }

        if outline.a != 0 {
            self.canvas.set_draw_color(outline.to_sdl());
            let ring: Vec<Point> = octant
                .iter()
                .flat_map(|&(x, y)| {
                    [
                        (x, y),
                        (y, x),
                        (-y, x),
                        (-x, y),
                        (-x, -y),
                        (-y, -x),
                        (y, -x),
                        (x, -y),
                    ]
                })
                .map(|(dx, dy)| Point::new(cx + dx, cy + dy))
                .collect();
            if let Err(e) = self.canvas.draw_points(ring.as_slice()) {
                trace!("circle outline failed: {}", e);
            }
        }
    }

    fn draw_texture(&mut self, texture: &Rc<Texture>, src: IntRect, x: i32, y: i32) {
        let uploaded = match self.uploads.get_or_upload(texture) {
            Ok(t) => t,
            Err(e) => {
                trace!("sprite upload failed: {}", e);
                return;
            },
        };
        let src_rect = SdlRect::new(src.x as i32, src.y as i32, src.width, src.height);
        let dst_rect = SdlRect::new(x, y, src.width, src.height);
        if let Err(e) = self.canvas.copy(uploaded, src_rect, dst_rect) {
            trace!("sprite copy failed: {}", e);
        }
    }

    fn snapshot(&mut self) -> Result<PixelBuffer, RenderError> {
        let (width, height) = self.canvas.output_size().map_err(RenderError::Surface)?;
        let bytes = self
            .canvas
            .read_pixels(None, PixelFormatEnum::RGBA8888)
            .map_err(RenderError::Surface)?;
        PixelBuffer::from_bytes(width, height, bytes).ok_or_else(|| {
            RenderError::Surface(format!("unexpected read-back size for {}x{}", width, height))
        })
    }

    fn blit(&mut self, buffer: &PixelBuffer) -> Result<(), RenderError> {
        let mut frame = self
            .uploads
            .creator
            .create_texture_static(PixelFormatEnum::RGBA8888, buffer.width(), buffer.height())
            .map_err(|e| RenderError::Surface(e.to_string()))?;
        frame
            .update(None, buffer.as_bytes(), (buffer.width() * 4) as usize)
            .map_err(|e| RenderError::Surface(e.to_string()))?;
        self.canvas.copy(&frame, None, None).map_err(RenderError::Surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_octant_starts_on_axis_and_ends_on_diagonal() {
        let octant = circle_octant(10);
        assert_eq!(octant[0], (10, 0));
        let &(x, y) = octant.last().unwrap();
        assert!(x >= y && x - y <= 1);
    }

    #[test]
    fn test_software_snapshot_blit_round_trip() {
        let mut surface = PixelBuffer::with_size(8, 8);
        surface.plot(3, 4, Color::RED);
        let mut shot = surface.snapshot().unwrap();
        shot.set_pixel(0, 0, Color::GREEN);
        surface.blit(&shot).unwrap();
        assert_eq!(surface.get_pixel(3, 4), Some(Color::RED));
        assert_eq!(surface.get_pixel(0, 0), Some(Color::GREEN));
    }

    #[test]
    fn test_software_blit_rejects_wrong_size() {
        let mut surface = PixelBuffer::with_size(8, 8);
        let other = PixelBuffer::with_size(4, 4);
        assert!(matches!(surface.blit(&other), Err(RenderError::Surface(_))));
    }

    fn red_square() -> Rc<Texture> {
        let mut texture = Texture::new(2, 2);
        texture.fill_rect(0, 0, 2, 2, Color::RED);
        Rc::new(texture)
    }

    #[test]
    fn test_canvas_uploads_each_texture_once() {
        let target = sdl2::surface::Surface::new(8, 8, PixelFormatEnum::RGBA8888).unwrap();
        let mut canvas = target.into_canvas().unwrap();
        let creator = canvas.texture_creator();
        let mut uploads = TextureUploads::new(&creator);

        let sprite = red_square();
        let other = red_square();
        let src = IntRect::new(0, 0, 2, 2);
        {
            let mut surface = CanvasSurface::new(&mut canvas, &mut uploads);
            surface.clear(Color::BLACK);
            surface.draw_texture(&sprite, src, 1, 1);
            surface.draw_texture(&Rc::clone(&sprite), src, 4, 4);
            let shot = surface.snapshot().unwrap();
            assert_eq!(shot.get_pixel(1, 1), Some(Color::RED));
            assert_eq!(shot.get_pixel(5, 5), Some(Color::RED));
            assert_eq!(shot.get_pixel(0, 0), Some(Color::BLACK));
        }
        assert_eq!(uploads.uploaded_count(), 1);

        CanvasSurface::new(&mut canvas, &mut uploads).draw_texture(&other, src, 0, 0);
        assert_eq!(uploads.uploaded_count(), 2);
    }

    #[test]
    fn test_software_circle_outline_is_optional() {
        let mut surface = PixelBuffer::with_size(20, 20);
        Surface::circle(&mut surface, 10, 10, 5, Color::GREEN, Color::TRANSPARENT);
        assert_eq!(surface.get_pixel(15, 10), Some(Color::GREEN));
        Surface::circle(&mut surface, 10, 10, 5, Color::GREEN, Color::WHITE);
        assert_eq!(surface.get_pixel(15, 10), Some(Color::WHITE));
    }
}
