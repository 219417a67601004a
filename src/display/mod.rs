mod color;
mod pixel_buffer;
mod surface;

pub use color::Color;
pub use pixel_buffer::PixelBuffer;
pub use surface::{CanvasSurface, Surface, TextureUploads};

use sdl2::event::Event;
use sdl2::keyboard::{Keycode, Scancode};
use sdl2::mouse::MouseButton;
use sdl2::render::{BlendMode, Canvas, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

use crate::input::{Action, InputState};

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

/// Window, accelerated canvas and event pump
pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    width: u32,
    height: u32,
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Quit,
    KeyDown(Keycode),
    MouseDown {
        x: i32,
        y: i32,
        button: MouseButtonKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButtonKind {
    Left,
    Right,
}

/// Keys bound to each movement action
const KEY_BINDINGS: [(Action, [Scancode; 2]); 4] = [
    (Action::MoveUp, [Scancode::W, Scancode::Up]),
    (Action::MoveDown, [Scancode::S, Scancode::Down]),
    (Action::MoveLeft, [Scancode::A, Scancode::Left]),
    (Action::MoveRight, [Scancode::D, Scancode::Right]),
];

impl Display {
    /// Create display with custom resolution and VSync settings
    /// vsync=true: locked to monitor refresh (typically 60fps)
    /// vsync=false: uncapped framerate
    pub fn with_options(title: &str, width: u32, height: u32, vsync: bool) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let mut canvas_builder = window.into_canvas().accelerated();
        if vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let mut canvas = canvas_builder.build().map_err(|e| e.to_string())?;
        canvas.set_blend_mode(BlendMode::Blend);

        let event_pump = sdl_context.event_pump()?;

        Ok(Self {
            canvas,
            event_pump,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Creator for sprite uploads; must outlive the [`TextureUploads`] built on it
    pub fn texture_creator(&self) -> TextureCreator<WindowContext> {
        self.canvas.texture_creator()
    }

    /// The window as a drawing surface for one frame
    pub fn surface<'s, 'c>(
        &'s mut self,
        uploads: &'s mut TextureUploads<'c, WindowContext>,
    ) -> CanvasSurface<'s, 'c, Window> {
        CanvasSurface::new(&mut self.canvas, uploads)
    }

    pub fn present(&mut self) {
        self.canvas.present();
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => events.push(InputEvent::Quit),
                Event::KeyDown {
                    keycode: Some(k),
                    repeat: false,
                    ..
                } => events.push(InputEvent::KeyDown(k)),
                Event::MouseButtonDown {
                    x, y, mouse_btn, ..
                } => {
                    if let Some(button) = map_mouse_button(mouse_btn) {
                        events.push(InputEvent::MouseDown { x, y, button });
                    }
                },
                _ => {},
            }
        }

        events
    }

    /// Sample held movement keys (W/A/S/D or arrows)
    pub fn sample_input(&self) -> InputState {
        let keyboard = self.event_pump.keyboard_state();
        let mut state = InputState::new();
        for (action, keys) in KEY_BINDINGS {
            let pressed = keys.iter().any(|&k| keyboard.is_scancode_pressed(k));
            state.set(action, pressed);
        }
        state
    }
}

fn map_mouse_button(btn: MouseButton) -> Option<MouseButtonKind> {
    match btn {
        MouseButton::Left => Some(MouseButtonKind::Left),
        MouseButton::Right => Some(MouseButtonKind::Right),
        _ => None,
    }
}
