//! The player: keyboard-driven movement validated against world bounds and
//! hitboxes, with per-direction sprite animation.

use std::f32::consts::FRAC_1_SQRT_2;
use std::path::Path;

use log::{debug, info};

use crate::animation::{Animation, DEFAULT_FRAME_TIME};
use crate::collision::Hitboxes;
use crate::error::RenderError;
use crate::geometry::{IntRect, Point2D, Rect};
use crate::input::{Action, InputSource};
use crate::renderer::{Drawable, PrimitiveRenderer};
use crate::sprite::{SpriteLoader, SpriteSet, Strip};

pub const DEFAULT_IDLE_TIMEOUT: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// File name prefix used by sprite assets
    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Facing for a committed displacement; horizontal wins ties
    fn from_displacement(dx: f32, dy: f32) -> Option<Self> {
        if dx == 0.0 && dy == 0.0 {
            None
        } else if dx.abs() >= dy.abs() {
            Some(if dx > 0.0 { Direction::Right } else { Direction::Left })
        } else {
            Some(if dy > 0.0 { Direction::Down } else { Direction::Up })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Idle,
    Walking,
}

/// On-screen placement plus the strip currently shown.
/// The sprite position is the only copy of the player's position.
#[derive(Debug, Clone)]
struct Sprite {
    position: Point2D,
    strip: Strip,
}

pub struct Player {
    sprite: Sprite,
    speed: f32,
    direction: Direction,
    state: MotionState,
    boundaries: Rect,
    last_valid_position: Point2D,
    /// Collision extent, fixed for the current sprite set
    size: (f32, f32),
    idle_timer: f32,
    idle_timeout: f32,
    hitboxes: Hitboxes,
    sprites: SpriteSet,
    animation: Animation,
}

impl Player {
    /// Player with placeholder sprites, facing down, idle
    pub fn new(x: f32, y: f32, speed: f32) -> Self {
        Self::with_sprites(x, y, speed, SpriteSet::placeholder())
    }

    pub fn with_sprites(x: f32, y: f32, speed: f32, sprites: SpriteSet) -> Self {
        let direction = Direction::Down;
        let strip = sprites.idle(direction).clone();
        let size = extent(&sprites);
        let mut player = Self {
            sprite: Sprite {
                position: Point2D::new(x, y),
                strip,
            },
            speed,
            direction,
            state: MotionState::Idle,
            boundaries: Rect::new(0.0, 0.0, 800.0, 600.0),
            last_valid_position: Point2D::new(x, y),
            size,
            idle_timer: 0.0,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            hitboxes: Hitboxes::new(),
            sprites,
            animation: Animation::new(),
        };
        player.animation.set_frame_time(DEFAULT_FRAME_TIME);
        player.apply_strip();
        player
    }

    /// Replace placeholders with sprites from `folder`
    pub fn load_sprites(&mut self, loader: &mut SpriteLoader, folder: &Path) -> usize {
        let replaced = self.sprites.load_from(loader, folder);
        self.size = extent(&self.sprites);
        info!("Loaded {} of 8 sprite strips from {}", replaced, folder.display());
        self.apply_strip();
        replaced
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn position(&self) -> Point2D {
        self.sprite.position
    }

    /// Move without validation
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.sprite.position.set(x, y);
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn set_boundaries(&mut self, boundaries: Rect) {
        self.boundaries = boundaries;
    }

    pub fn set_idle_timeout(&mut self, seconds: f32) {
        self.idle_timeout = seconds;
    }

    pub fn set_frame_time(&mut self, seconds: f32) {
        self.animation.set_frame_time(seconds);
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn hitboxes(&self) -> &Hitboxes {
        &self.hitboxes
    }

    /// Scene composers rebuild this every frame
    pub fn hitboxes_mut(&mut self) -> &mut Hitboxes {
        &mut self.hitboxes
    }

    /// Axis-aligned bounds at the current position
    pub fn bounds(&self) -> Rect {
        self.bounds_at(self.sprite.position)
    }

    fn bounds_at(&self, position: Point2D) -> Rect {
        let (w, h) = self.size;
        Rect::new(position.x, position.y, w, h)
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Both top-left and bottom-right corners inside the world rectangle
    fn within_boundaries(&self, bounds: &Rect) -> bool {
        self.boundaries.contains(bounds.left, bounds.top)
            && self.boundaries.contains(bounds.right(), bounds.bottom())
    }

    fn is_valid_position(&self, position: Point2D) -> bool {
        let bounds = self.bounds_at(position);
        self.within_boundaries(&bounds) && !self.hitboxes.any_intersects(&bounds)
    }

    pub fn is_out_of_bounds(&self) -> bool {
        !self.within_boundaries(&self.bounds())
    }

    /// Roll back to the last validated position when out of bounds
    pub fn keep_in_bounds(&mut self) {
        if self.is_out_of_bounds() {
            let p = self.last_valid_position;
            self.set_position(p.x, p.y);
        }
    }

    /// Push the bounds back inside the world rectangle on each axis
    pub fn clamp_to_bounds(&mut self) {
        let b = self.bounds();
        let world = self.boundaries;
        let mut p = self.sprite.position;

        if b.left < world.left {
            p.x += world.left - b.left;
        } else if b.right() > world.right() {
            p.x -= b.right() - world.right();
        }
        if b.top < world.top {
            p.y += world.top - b.top;
        } else if b.bottom() > world.bottom() {
            p.y -= b.bottom() - world.bottom();
        }

        self.set_position(p.x, p.y);
    }

    pub fn check_collision_with_shapes(&self) -> bool {
        self.hitboxes.any_intersects(&self.bounds())
    }

    // ========================================================================
    // Per-tick update
    // ========================================================================

    /// Sum held directions into a displacement, normalized on diagonals
    fn movement(&self, input: &impl InputSource) -> (f32, f32) {
        let (mut dx, mut dy) = (0.0, 0.0);
        for action in Action::MOVEMENT {
            if input.is_pressed(action) {
                match action {
                    Action::MoveUp => dy -= self.speed,
                    Action::MoveDown => dy += self.speed,
                    Action::MoveLeft => dx -= self.speed,
                    Action::MoveRight => dx += self.speed,
                }
            }
        }
        if dx != 0.0 && dy != 0.0 {
            dx *= FRAC_1_SQRT_2;
            dy *= FRAC_1_SQRT_2;
        }
        (dx, dy)
    }

    /// Try full movement, then X only, then Y only. Returns the committed
    /// displacement, (0, 0) if every candidate was blocked.
    fn try_move(&mut self, dx: f32, dy: f32) -> (f32, f32) {
        let origin = self.sprite.position;
        for (mx, my) in [(dx, dy), (dx, 0.0), (0.0, dy)] {
            if mx == 0.0 && my == 0.0 {
                continue;
            }
            let candidate = Point2D::new(origin.x + mx, origin.y + my);
            if self.is_valid_position(candidate) {
                self.set_position(candidate.x, candidate.y);
                self.last_valid_position = candidate;
                return (mx, my);
            }
        }
        (0.0, 0.0)
    }

    /// Advance one tick: move, update facing and state, animate
    pub fn update(&mut self, input: &impl InputSource, dt: f32) {
        let pressed = Action::MOVEMENT.iter().any(|&a| input.is_pressed(a));
        let (dx, dy) = self.movement(input);
        let (mx, my) = self.try_move(dx, dy);

        let direction = Direction::from_displacement(mx, my).unwrap_or(self.direction);

        let state = if pressed {
            self.idle_timer = 0.0;
            MotionState::Walking
        } else {
            self.idle_timer += dt;
            if self.idle_timer >= self.idle_timeout {
                MotionState::Idle
            } else {
                self.state
            }
        };

        if direction != self.direction || state != self.state {
            debug!(
                "Player {:?}/{:?} -> {:?}/{:?}",
                self.direction, self.state, direction, state
            );
            self.direction = direction;
            self.state = state;
            self.apply_strip();
        }

        if self.state == MotionState::Walking {
            self.animation.advance(dt);
        }
    }

    /// Show the strip for the current direction and state from frame 0
    fn apply_strip(&mut self) {
        let strip = match self.state {
            MotionState::Idle => self.sprites.idle(self.direction),
            MotionState::Walking => self.sprites.walk(self.direction),
        }
        .clone();
        self.animation.set_frames(strip.frames.clone());
        self.sprite.strip = strip;
    }

    fn current_frame(&self) -> Option<IntRect> {
        self.animation.current_rect()
    }
}

/// The largest frame of any strip, so switching strips never changes the
/// extent that was validated
fn extent(sprites: &SpriteSet) -> (f32, f32) {
    let (w, h) = sprites.frame_extent();
    (w as f32, h as f32)
}

impl Drawable for Player {
    fn draw(&self, renderer: &mut PrimitiveRenderer<'_>) -> Result<(), RenderError> {
        if let Some(frame) = self.current_frame() {
            let p = self.sprite.position;
            renderer.draw_texture(&self.sprite.strip.texture, frame, p.x, p.y);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{Color, PixelBuffer};
    use crate::input::InputState;

    const TICK: f32 = 0.016;

    /// 16x16 actor so the obstacle scenarios start clear of it
    fn small_player(x: f32, y: f32) -> Player {
        Player::with_sprites(x, y, 5.0, SpriteSet::placeholder_sized(16, 16))
    }

    fn input(actions: &[Action]) -> InputState {
        actions.iter().fold(InputState::new(), |s, &a| s.with(a))
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_starts_idle_facing_down() {
        let player = Player::new(400.0, 300.0, 5.0);
        assert_eq!(player.state(), MotionState::Idle);
        assert_eq!(player.direction(), Direction::Down);
        assert_eq!(player.bounds(), Rect::new(400.0, 300.0, 32.0, 64.0));
    }

    #[test]
    fn test_diagonal_move_is_normalized_and_faces_horizontal() {
        let mut player = small_player(400.0, 300.0);
        player.hitboxes_mut().add_rectangle(Rect::new(420.0, 300.0, 40.0, 40.0));
        player.update(&input(&[Action::MoveRight, Action::MoveDown]), TICK);

        let p = player.position();
        assert!(close(p.x, 403.5355) && close(p.y, 303.5355), "got {:?}", p);
        assert_eq!(player.direction(), Direction::Right);
        assert_eq!(player.state(), MotionState::Walking);
    }

    #[test]
    fn test_blocked_x_slides_along_y() {
        let mut player = small_player(402.0, 300.0);
        player.hitboxes_mut().add_rectangle(Rect::new(420.0, 290.0, 40.0, 40.0));
        player.update(&input(&[Action::MoveRight, Action::MoveDown]), TICK);

        let p = player.position();
        assert_eq!(p.x, 402.0);
        assert!(close(p.y, 303.5355), "got {:?}", p);
        assert_eq!(player.direction(), Direction::Down);
    }

    #[test]
    fn test_blocked_y_slides_along_x() {
        let mut player = small_player(300.0, 280.0);
        // Floor directly below
        player.hitboxes_mut().add_rectangle(Rect::new(200.0, 298.0, 300.0, 10.0));
        player.update(&input(&[Action::MoveLeft, Action::MoveDown]), TICK);

        let p = player.position();
        assert!(close(p.x, 296.4645), "got {:?}", p);
        assert_eq!(p.y, 280.0);
        assert_eq!(player.direction(), Direction::Left);
    }

    #[test]
    fn test_fully_blocked_keeps_position_and_facing() {
        let mut player = small_player(0.0, 0.0);
        player.update(&input(&[Action::MoveUp, Action::MoveLeft]), TICK);
        assert_eq!(player.position(), Point2D::new(0.0, 0.0));
        assert_eq!(player.direction(), Direction::Down);
        assert_eq!(player.state(), MotionState::Walking);
    }

    #[test]
    fn test_world_edge_blocks_movement() {
        let mut player = small_player(780.0, 100.0);
        player.update(&input(&[Action::MoveRight]), TICK);
        // 16 wide: right edge at 801 would leave the 800 wide world
        assert_eq!(player.position().x, 780.0);
        player.update(&input(&[Action::MoveLeft]), TICK);
        assert_eq!(player.position().x, 775.0);
    }

    #[test]
    fn test_returns_to_idle_after_timeout() {
        let mut player = small_player(100.0, 100.0);
        player.update(&input(&[Action::MoveRight]), TICK);
        assert_eq!(player.state(), MotionState::Walking);

        let none = InputState::new();
        player.update(&none, 0.5);
        assert_eq!(player.state(), MotionState::Walking);
        player.update(&none, 0.5);
        assert_eq!(player.state(), MotionState::Idle);
        assert_eq!(player.animation().frame_count(), 1);
    }

    #[test]
    fn test_direction_change_restarts_walk_cycle() {
        let mut player = small_player(100.0, 100.0);
        player.set_frame_time(0.01);
        let right = input(&[Action::MoveRight]);
        for _ in 0..3 {
            player.update(&right, TICK);
        }
        assert!(player.animation().current_frame() > 0);

        // Switching to the left strip resets to 0 before this tick's advance
        player.update(&input(&[Action::MoveLeft]), 0.0);
        assert_eq!(player.direction(), Direction::Left);
        assert_eq!(player.animation().current_frame(), 0);
        assert_eq!(player.animation().frame_count(), 4);
    }

    #[test]
    fn test_walk_strip_taller_than_idle_never_lands_in_obstacle() {
        let sprites = SpriteSet {
            walk: SpriteSet::placeholder_sized(16, 64).walk,
            idle: SpriteSet::placeholder_sized(16, 16).idle,
        };
        let mut player = Player::with_sprites(100.0, 100.0, 5.0, sprites);
        assert_eq!(player.bounds(), Rect::new(100.0, 100.0, 16.0, 64.0));

        // Clear of a 16x16 box one step right, but not of the 16x64 walk frame
        player.hitboxes_mut().add_rectangle(Rect::new(118.0, 130.0, 40.0, 10.0));
        player.update(&input(&[Action::MoveRight]), TICK);
        assert_eq!(player.position(), Point2D::new(100.0, 100.0));
        assert!(!player.check_collision_with_shapes());

        player.update(&input(&[Action::MoveUp]), TICK);
        assert_eq!(player.position(), Point2D::new(100.0, 95.0));
        assert!(!player.check_collision_with_shapes());
        assert_eq!(player.bounds().height, 64.0);
    }

    #[test]
    fn test_keep_in_bounds_rolls_back() {
        let mut player = small_player(100.0, 100.0);
        player.update(&input(&[Action::MoveRight]), TICK);
        player.set_position(-50.0, 100.0);
        assert!(player.is_out_of_bounds());
        player.keep_in_bounds();
        assert_eq!(player.position(), Point2D::new(105.0, 100.0));
    }

    #[test]
    fn test_clamp_to_bounds_pushes_inside() {
        let mut player = small_player(790.0, -10.0);
        player.clamp_to_bounds();
        assert_eq!(player.position(), Point2D::new(784.0, 0.0));
    }

    #[test]
    fn test_collision_check_uses_current_bounds() {
        let mut player = small_player(100.0, 100.0);
        player.hitboxes_mut().add_circle(Point2D::new(108.0, 108.0), 3.0);
        assert!(player.check_collision_with_shapes());
        player.hitboxes_mut().clear();
        assert!(!player.check_collision_with_shapes());
    }

    #[test]
    fn test_draws_current_frame_at_position() {
        let player = small_player(2.0, 3.0);
        let mut surface = PixelBuffer::with_size(32, 32);
        let mut renderer = PrimitiveRenderer::new(&mut surface);
        player.draw(&mut renderer).unwrap();
        // Idle-down placeholder body spans 4..12 in a 16 wide frame
        assert_eq!(surface.get_pixel(2 + 8, 3 + 1), Some(Color::BLACK));
        assert_eq!(surface.get_pixel(2 + 8, 3 + 3), Some(Color::GREEN));
    }
}
