//! 2D primitive rasterizer with area fills and an animated player that
//! collides against the exact shapes it walks around.
//!
//! Everything draws through [`renderer::PrimitiveRenderer`] onto a
//! [`display::Surface`]: the SDL2 window in the binary, a
//! [`display::PixelBuffer`] in tests.

pub mod animation;
pub mod collision;
pub mod config;
pub mod display;
pub mod error;
pub mod geometry;
pub mod input;
pub mod player;
pub mod renderer;
pub mod scene;
pub mod sprite;
pub mod util;
