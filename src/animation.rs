//! Frame-based sprite animation.
//!
//! An [`Animation`] owns a list of frame rectangles into a shared texture and
//! steps through them as time accumulates.

use crate::geometry::IntRect;

pub const DEFAULT_FRAME_TIME: f32 = 0.15;

/// Frame driver state machine
#[derive(Debug, Clone)]
pub struct Animation {
    frames: Vec<IntRect>,
    current: usize,
    frame_time: f32,
    timer: f32,
    playing: bool,
    looping: bool,
    finished: bool,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            frames: Vec::new(),
            current: 0,
            frame_time: DEFAULT_FRAME_TIME,
            timer: 0.0,
            playing: false,
            looping: true,
            finished: false,
        }
    }
}

impl Animation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looping animation over `frames`, already reset and playing
    pub fn with_frames(frames: Vec<IntRect>, frame_time: f32) -> Self {
        let mut anim = Self {
            frame_time,
            ..Self::default()
        };
        anim.set_frames(frames);
        anim
    }

    pub fn play(&mut self) {
        if !self.frames.is_empty() {
            self.playing = true;
        }
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.reset();
    }

    /// Back to frame 0 with a fresh timer
    pub fn reset(&mut self) {
        self.current = 0;
        self.timer = 0.0;
        self.finished = false;
    }

    /// Jump to frame `index`; out-of-range indices are ignored
    pub fn set_frame(&mut self, index: usize) {
        if index < self.frames.len() {
            self.current = index;
            self.timer = 0.0;
        }
    }

    /// Accumulate `dt` seconds and step at most one frame
    pub fn advance(&mut self, dt: f32) {
        if !self.playing || self.frames.is_empty() {
            return;
        }

        self.timer += dt;
        if self.timer < self.frame_time {
            return;
        }
        self.timer = 0.0;

        if self.current + 1 < self.frames.len() {
            self.current += 1;
        } else if self.looping {
            self.current = 0;
        } else {
            self.current = self.frames.len() - 1;
            self.finished = true;
            self.playing = false;
        }
    }

    /// Remove every frame; the driver pauses until frames are added again
    pub fn clear(&mut self) {
        self.frames.clear();
        self.current = 0;
        self.timer = 0.0;
        self.finished = false;
        self.playing = false;
    }

    /// Replace the frame table, reset and start playing
    pub fn set_frames(&mut self, frames: Vec<IntRect>) {
        self.clear();
        self.frames = frames;
        self.reset();
        self.play();
    }

    pub fn set_frame_time(&mut self, seconds: f32) {
        self.frame_time = seconds;
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub fn current_frame(&self) -> usize {
        self.current
    }

    pub fn current_rect(&self) -> Option<IntRect> {
        self.frames.get(self.current).copied()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

// ============================================================================
// Spritesheet geometry
// ============================================================================

/// Frame grid of a horizontal spritesheet strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub count: u32,
    pub width: u32,
    pub height: u32,
}

impl FrameLayout {
    /// Frame rectangles left to right along the top row
    pub fn frames(&self) -> Vec<IntRect> {
        (0..self.count)
            .map(|i| IntRect::new(i * self.width, 0, self.width, self.height))
            .collect()
    }
}

/// Guess frame geometry from sheet dimensions.
///
/// In order: 64x64 frames, 32x64 frames, 64-wide columns, 32-wide columns,
/// otherwise exactly four equal columns over the full height. A sheet
/// narrower than four pixels yields no frames.
pub fn detect_frame_layout(width: u32, height: u32) -> FrameLayout {
    let (frame_width, frame_height) = if width % 64 == 0 && height == 64 {
        (64, 64)
    } else if width % 32 == 0 && height == 64 {
        (32, 64)
    } else if width % 64 == 0 {
        (64, height)
    } else if width % 32 == 0 {
        (32, height)
    } else {
        return FrameLayout {
            count: if width < 4 { 0 } else { 4 },
            width: width / 4,
            height,
        };
    };

    FrameLayout {
        count: width / frame_width,
        width: frame_width,
        height: frame_height,
    }
}
