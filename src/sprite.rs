//! Sprite textures and loading.
//!
//! Textures are plain RGBA pixel grids on the CPU; surfaces upload them when
//! drawn. Loading goes through [`SpriteLoader`], which keeps every decoded or
//! packed texture in an explicit [`TextureCache`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{info, warn};

use crate::animation::{detect_frame_layout, FrameLayout};
use crate::display::Color;
use crate::error::SpriteError;
use crate::geometry::IntRect;
use crate::player::Direction;

// ============================================================================
// Texture
// ============================================================================

/// A texture stored as RGBA pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<u8>, // RGBA format, 4 bytes per pixel
}

impl Texture {
    /// Create a new fully transparent texture
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    /// Create texture from raw RGBA data
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() == (width * height * 4) as usize {
            Some(Self {
                width,
                height,
                pixels: data,
            })
        } else {
            None
        }
    }

    /// Decode an image file (PNG) into RGBA
    pub fn load(path: &Path) -> Result<Self, SpriteError> {
        if !path.is_file() {
            return Err(SpriteError::NotFound(path.to_path_buf()));
        }
        let image = image::open(path)
            .map_err(|source| SpriteError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = image.dimensions();
        Self::from_rgba(width, height, image.into_raw()).ok_or_else(|| SpriteError::Geometry {
            path: path.to_path_buf(),
            detail: "decoded buffer does not match its dimensions".into(),
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

    /// Set a pixel in the texture
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width && y < self.height {
            let idx = ((y * self.width + x) * 4) as usize;
            self.pixels[idx] = color.r;
            self.pixels[idx + 1] = color.g;
            self.pixels[idx + 2] = color.b;
            self.pixels[idx + 3] = color.a;
        }
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x < self.width && y < self.height {
            let idx = ((y * self.width + x) * 4) as usize;
            Some(Color::rgba(
                self.pixels[idx],
                self.pixels[idx + 1],
                self.pixels[idx + 2],
                self.pixels[idx + 3],
            ))
        } else {
            None
        }
    }

    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Color) {
        for py in y..y.saturating_add(h) {
            for px in x..x.saturating_add(w) {
                self.set_pixel(px, py, color);
            }
        }
    }

    /// Copy all of `src` with its top-left corner at (x, y)
    pub fn copy_from(&mut self, src: &Texture, x: u32, y: u32) {
        for sy in 0..src.height {
            for sx in 0..src.width {
                if let Some(c) = src.pixel(sx, sy) {
                    self.set_pixel(x + sx, y + sy, c);
                }
            }
        }
    }

    /// Raw RGBA bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

// ============================================================================
// Cache and loader
// ============================================================================

/// Shared textures keyed by source path
#[derive(Debug, Default)]
pub struct TextureCache {
    textures: HashMap<PathBuf, Rc<Texture>>,
}

impl TextureCache {
    pub fn get(&self, key: &Path) -> Option<Rc<Texture>> {
        self.textures.get(key).cloned()
    }

    pub fn insert(&mut self, key: PathBuf, texture: Texture) -> Rc<Texture> {
        let shared = Rc::new(texture);
        self.textures.insert(key, Rc::clone(&shared));
        shared
    }
}

/// A texture plus the frame rectangles that cut it into an animation
#[derive(Debug, Clone)]
pub struct Strip {
    pub texture: Rc<Texture>,
    pub frames: Vec<IntRect>,
}

impl Strip {
    /// Size of the first frame, (0, 0) for an empty strip
    pub fn frame_size(&self) -> (u32, u32) {
        self.frames.first().map_or((0, 0), |f| (f.width, f.height))
    }
}

/// Explicit spritesheet geometry. Unset sizes divide the sheet evenly
/// across `count` columns and use the full sheet height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetGeometry {
    pub count: u32,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Default)]
pub struct SpriteLoader {
    cache: TextureCache,
}

impl SpriteLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load (or fetch from cache) a single texture
    pub fn load_texture(&mut self, path: &Path) -> Result<Rc<Texture>, SpriteError> {
        if let Some(texture) = self.cache.get(path) {
            return Ok(texture);
        }
        let texture = Texture::load(path)?;
        Ok(self.cache.insert(path.to_path_buf(), texture))
    }

    /// Whole image as a single frame
    pub fn load_still(&mut self, path: &Path) -> Result<Strip, SpriteError> {
        let texture = self.load_texture(path)?;
        let frames = vec![IntRect::new(0, 0, texture.width(), texture.height())];
        Ok(Strip { texture, frames })
    }

    /// Horizontal spritesheet with explicit frame geometry
    pub fn load_sheet(&mut self, path: &Path, geometry: SheetGeometry) -> Result<Strip, SpriteError> {
        let texture = self.load_texture(path)?;
        let bad = |detail: String| SpriteError::Geometry {
            path: path.to_path_buf(),
            detail,
        };

        if geometry.count == 0 {
            return Err(bad("frame count is zero".into()));
        }
        let width = geometry.width.unwrap_or(texture.width() / geometry.count);
        let height = geometry.height.unwrap_or(texture.height());
        if width == 0 || height == 0 {
            return Err(bad(format!("empty frame size {}x{}", width, height)));
        }
        if width * geometry.count > texture.width() || height > texture.height() {
            return Err(bad(format!(
                "{} frames of {}x{} exceed the {}x{} sheet",
                geometry.count,
                width,
                height,
                texture.width(),
                texture.height()
            )));
        }

        let frames = FrameLayout {
            count: geometry.count,
            width,
            height,
        }
        .frames();
        Ok(Strip { texture, frames })
    }

    /// Horizontal spritesheet with geometry guessed from its size
    pub fn load_sheet_auto(&mut self, path: &Path) -> Result<Strip, SpriteError> {
        let texture = self.load_texture(path)?;
        let layout = detect_frame_layout(texture.width(), texture.height());
        if layout.count == 0 {
            return Err(SpriteError::Geometry {
                path: path.to_path_buf(),
                detail: format!("cannot split a {}x{} sheet", texture.width(), texture.height()),
            });
        }
        Ok(Strip {
            texture,
            frames: layout.frames(),
        })
    }

    /// Numbered image files in `folder` (0.png, 1.png, ...) packed side by
    /// side into one strip texture
    pub fn load_sequence(&mut self, folder: &Path) -> Result<Strip, SpriteError> {
        if !folder.is_dir() {
            return Err(SpriteError::NotFound(folder.to_path_buf()));
        }

        let mut files: Vec<PathBuf> = fs::read_dir(folder)
            .map_err(|_| SpriteError::NotFound(folder.to_path_buf()))?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("png"))
            })
            .collect();
        files.sort_by_key(|p| sequence_key(p));

        if files.is_empty() {
            return Err(SpriteError::EmptySequence(folder.to_path_buf()));
        }

        let images = files
            .iter()
            .map(|p| Texture::load(p))
            .collect::<Result<Vec<_>, _>>()?;

        let total_width: u32 = images.iter().map(Texture::width).sum();
        let max_height = images.iter().map(Texture::height).max().unwrap_or(0);
        let mut packed = Texture::new(total_width, max_height);
        let mut frames = Vec::with_capacity(images.len());
        let mut x = 0;
        for image in &images {
            packed.copy_from(image, x, 0);
            frames.push(IntRect::new(x, 0, image.width(), image.height()));
            x += image.width();
        }

        info!("Packed {} frames from {}", frames.len(), folder.display());
        let texture = self.cache.insert(folder.to_path_buf(), packed);
        Ok(Strip { texture, frames })
    }
}

/// Numeric file stems sort numerically, everything else after, by name
fn sequence_key(path: &Path) -> (u32, u64, String) {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    match stem.parse::<u64>() {
        Ok(n) => (0, n, stem),
        Err(_) => (1, 0, stem),
    }
}

// ============================================================================
// Placeholders and per-direction sets
// ============================================================================

pub const PLACEHOLDER_FRAME_WIDTH: u32 = 32;
pub const PLACEHOLDER_FRAME_HEIGHT: u32 = 64;
const WALK_SHADES: [f32; 4] = [1.0, 0.9, 0.8, 0.7];

pub fn placeholder_color(direction: Direction) -> Color {
    match direction {
        Direction::Up => Color::RED,
        Direction::Down => Color::GREEN,
        Direction::Left => Color::BLUE,
        Direction::Right => Color::YELLOW,
    }
}

/// Solid body square plus a marker on the facing side, one frame per shade.
/// Layout is defined on a 32x64 frame and scaled to `width` x `height`.
pub fn placeholder_strip(direction: Direction, shades: &[f32], width: u32, height: u32) -> Strip {
    let count = shades.len() as u32;
    let mut texture = Texture::new(width * count, height);
    let sx = width as f32 / PLACEHOLDER_FRAME_WIDTH as f32;
    let sy = height as f32 / PLACEHOLDER_FRAME_HEIGHT as f32;
    let scaled = |x0: u32, y0: u32, x1: u32, y1: u32| {
        let (ax, ay) = ((x0 as f32 * sx) as u32, (y0 as f32 * sy) as u32);
        let (bx, by) = ((x1 as f32 * sx) as u32, (y1 as f32 * sy) as u32);
        (ax, ay, bx.saturating_sub(ax).max(1), by.saturating_sub(ay).max(1))
    };

    let marker = match direction {
        Direction::Up => (12, 4, 20, 8),
        Direction::Down => (12, 24, 20, 28),
        Direction::Left => (4, 12, 8, 20),
        Direction::Right => (24, 12, 28, 20),
    };

    let base = placeholder_color(direction);
    for (i, &shade) in shades.iter().enumerate() {
        let color = base.darkened(shade);
        let offset = i as u32 * width;
        for (x0, y0, x1, y1) in [(8, 8, 24, 24), marker] {
            let (x, y, w, h) = scaled(x0, y0, x1, y1);
            texture.fill_rect(offset + x, y, w, h, color);
        }
    }

    Strip {
        texture: Rc::new(texture),
        frames: FrameLayout {
            count,
            width,
            height,
        }
        .frames(),
    }
}

/// Walk and idle strips for each facing direction
#[derive(Debug, Clone)]
pub struct SpriteSet {
    pub walk: [Strip; 4],
    pub idle: [Strip; 4],
}

impl SpriteSet {
    pub fn placeholder() -> Self {
        Self::placeholder_sized(PLACEHOLDER_FRAME_WIDTH, PLACEHOLDER_FRAME_HEIGHT)
    }

    pub fn placeholder_sized(width: u32, height: u32) -> Self {
        Self {
            walk: Direction::ALL.map(|d| placeholder_strip(d, &WALK_SHADES, width, height)),
            idle: Direction::ALL.map(|d| placeholder_strip(d, &[1.0], width, height)),
        }
    }

    pub fn walk(&self, direction: Direction) -> &Strip {
        &self.walk[direction.index()]
    }

    pub fn idle(&self, direction: Direction) -> &Strip {
        &self.idle[direction.index()]
    }

    /// Largest frame width and height over every strip
    pub fn frame_extent(&self) -> (u32, u32) {
        self.walk
            .iter()
            .chain(&self.idle)
            .flat_map(|strip| &strip.frames)
            .fold((0, 0), |(w, h), f| (w.max(f.width), h.max(f.height)))
    }

    /// Replace strips with whatever `folder` provides; directions with no
    /// usable file keep their current strip. Returns how many were replaced.
    pub fn load_from(&mut self, loader: &mut SpriteLoader, folder: &Path) -> usize {
        let mut replaced = 0;
        for direction in Direction::ALL {
            let name = direction.name();

            let idle_files = [format!("{}_idle.png", name), format!("{}.png", name)];
            match first_loaded(&idle_files, |f| loader.load_still(&folder.join(f))) {
                Some(strip) => {
                    self.idle[direction.index()] = strip;
                    replaced += 1;
                },
                None => warn!("No idle sprite for {} in {}, using placeholder", name, folder.display()),
            }

            let sheet_files = [
                format!("{}_walk_strip.png", name),
                format!("{}_walk_sheet.png", name),
                format!("{}_walk_anim.png", name),
                format!("{}_walk.png", name),
            ];
            let walk = first_loaded(&sheet_files, |f| loader.load_sheet_auto(&folder.join(f)))
                .or_else(|| {
                    let seq = folder.join(format!("{}_walk", name));
                    loader
                        .load_sequence(&seq)
                        .map_err(|e| log_load_failure(&e))
                        .ok()
                });
            match walk {
                Some(strip) => {
                    self.walk[direction.index()] = strip;
                    replaced += 1;
                },
                None => warn!("No walk sprites for {} in {}, using placeholder", name, folder.display()),
            }
        }
        replaced
    }
}

/// First file in `files` that loads; missing files are skipped quietly,
/// broken ones are logged
fn first_loaded(
    files: &[String],
    mut load: impl FnMut(&str) -> Result<Strip, SpriteError>,
) -> Option<Strip> {
    files
        .iter()
        .find_map(|f| load(f.as_str()).map_err(|e| log_load_failure(&e)).ok())
}

fn log_load_failure(err: &SpriteError) {
    if !matches!(err, SpriteError::NotFound(_)) {
        warn!("{}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rastertoy-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_png(path: &Path, width: u32, height: u32, rgba: [u8; 4]) {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        img.save(path).unwrap();
    }

    #[test]
    fn test_texture_pixel_round_trip() {
        let mut tex = Texture::new(4, 4);
        tex.set_pixel(1, 2, Color::rgba(1, 2, 3, 4));
        assert_eq!(tex.pixel(1, 2), Some(Color::rgba(1, 2, 3, 4)));
        assert_eq!(tex.pixel(4, 0), None);
        assert_eq!(tex.as_bytes()[(2 * 4 + 1) * 4], 1);
    }

    #[test]
    fn test_placeholder_walk_strip_is_four_shaded_frames() {
        let strip = placeholder_strip(Direction::Up, &WALK_SHADES, 32, 64);
        assert_eq!(strip.frames.len(), 4);
        assert_eq!(strip.frame_size(), (32, 64));
        assert_eq!(strip.texture.width(), 128);
        // Body square center in the first and last frames
        assert_eq!(strip.texture.pixel(16, 16), Some(Color::RED));
        assert_eq!(strip.texture.pixel(96 + 16, 16), Some(Color::RED.darkened(0.7)));
        // Up marker above the body, nothing outside
        assert_eq!(strip.texture.pixel(16, 5), Some(Color::RED));
        assert_eq!(strip.texture.pixel(1, 1), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_placeholder_set_has_per_direction_colors() {
        let set = SpriteSet::placeholder();
        assert_eq!(set.idle(Direction::Left).frames.len(), 1);
        assert_eq!(set.idle(Direction::Left).texture.pixel(16, 16), Some(Color::BLUE));
        assert_eq!(set.walk(Direction::Right).texture.pixel(16, 16), Some(Color::YELLOW));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let mut loader = SpriteLoader::new();
        let err = loader.load_texture(Path::new("/nonexistent/sprite.png")).unwrap_err();
        assert!(matches!(err, SpriteError::NotFound(_)));
    }

    #[test]
    fn test_sheet_auto_and_cache() {
        let dir = temp_dir("sheet");
        let path = dir.join("down_walk_strip.png");
        write_png(&path, 256, 64, [10, 20, 30, 255]);

        let mut loader = SpriteLoader::new();
        let strip = loader.load_sheet_auto(&path).unwrap();
        assert_eq!(strip.frames.len(), 4);
        assert_eq!(strip.frame_size(), (64, 64));

        let again = loader.load_sheet_auto(&path).unwrap();
        assert!(Rc::ptr_eq(&strip.texture, &again.texture));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_explicit_sheet_geometry_is_validated() {
        let dir = temp_dir("explicit");
        let path = dir.join("sheet.png");
        write_png(&path, 96, 32, [0, 0, 0, 255]);

        let mut loader = SpriteLoader::new();
        let strip = loader
            .load_sheet(&path, SheetGeometry { count: 3, width: None, height: None })
            .unwrap();
        assert_eq!(strip.frames[2], IntRect::new(64, 0, 32, 32));

        let too_wide = SheetGeometry {
            count: 4,
            width: Some(32),
            height: None,
        };
        assert!(matches!(
            loader.load_sheet(&path, too_wide),
            Err(SpriteError::Geometry { .. })
        ));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_sequence_packs_frames_in_numeric_order() {
        let dir = temp_dir("sequence");
        write_png(&dir.join("0.png"), 8, 16, [255, 0, 0, 255]);
        write_png(&dir.join("1.png"), 8, 16, [0, 255, 0, 255]);
        write_png(&dir.join("10.png"), 8, 16, [0, 0, 255, 255]);
        write_png(&dir.join("2.png"), 8, 16, [255, 255, 0, 255]);

        let mut loader = SpriteLoader::new();
        let strip = loader.load_sequence(&dir).unwrap();
        assert_eq!(strip.frames.len(), 4);
        assert_eq!(strip.texture.width(), 32);
        // Order is 0, 1, 2, 10
        assert_eq!(strip.texture.pixel(16, 0), Some(Color::YELLOW));
        assert_eq!(strip.texture.pixel(24, 0), Some(Color::BLUE));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_empty_sequence_folder() {
        let dir = temp_dir("empty");
        let mut loader = SpriteLoader::new();
        assert!(matches!(
            loader.load_sequence(&dir),
            Err(SpriteError::EmptySequence(_))
        ));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_from_keeps_placeholders_for_missing_directions() {
        let dir = temp_dir("set");
        write_png(&dir.join("left.png"), 20, 40, [1, 2, 3, 255]);
        write_png(&dir.join("left_walk.png"), 128, 64, [1, 2, 3, 255]);

        let mut set = SpriteSet::placeholder();
        let mut loader = SpriteLoader::new();
        assert_eq!(set.load_from(&mut loader, &dir), 2);
        assert_eq!(set.idle(Direction::Left).frame_size(), (20, 40));
        assert_eq!(set.walk(Direction::Left).frame_size(), (64, 64));
        assert_eq!(set.frame_extent(), (64, 64));
        assert_eq!(set.walk(Direction::Up).frame_size(), (32, 64));
        let _ = fs::remove_dir_all(&dir);
    }
}
