use std::path::PathBuf;

use log::{debug, info, warn};
use rastertoy::config::{AppConfig, DEFAULT_CONFIG_PATH};
use rastertoy::display::{
    Display, InputEvent, MouseButtonKind, TextureUploads, DEFAULT_HEIGHT, DEFAULT_WIDTH,
};
use rastertoy::error::EngineError;
use rastertoy::player::Player;
use rastertoy::renderer::{Drawable, PrimitiveRenderer};
use rastertoy::scene::Scene;
use rastertoy::sprite::SpriteLoader;
use rastertoy::util::FpsCounter;
use sdl2::keyboard::Keycode;

/// Command line overrides on top of the config file
#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    width: Option<u32>,
    height: Option<u32>,
    no_vsync: bool,
    scene: Option<PathBuf>,
    sprites: Option<PathBuf>,
}

impl Args {
    fn apply(self, config: &mut AppConfig) {
        if let Some(w) = self.width {
            config.window.width = w;
        }
        if let Some(h) = self.height {
            config.window.height = h;
        }
        if self.no_vsync {
            config.window.vsync = false;
        }
        if self.scene.is_some() {
            config.scene_path = self.scene;
        }
        if self.sprites.is_some() {
            config.player.sprite_dir = self.sprites;
        }
    }
}

fn print_help() {
    println!("Usage: rastertoy [OPTIONS]");
    println!();
    println!("Options:");
    println!(
        "  --config PATH         Read settings from PATH (default: {})",
        DEFAULT_CONFIG_PATH
    );
    println!(
        "  --width W, -w W       Set window width (default: {})",
        DEFAULT_WIDTH
    );
    println!(
        "  --height H, -h H      Set window height (default: {})",
        DEFAULT_HEIGHT
    );
    println!("  --resolution WxH, -r WxH  Set resolution (e.g., 1024x768)");
    println!("  --no-vsync            Disable VSync for uncapped framerate");
    println!("  --scene PATH          Load figures from a JSON scene file");
    println!("  --sprites DIR         Load player sprites from DIR");
    println!("  --help                Show this help message");
    println!();
    println!("Controls:");
    println!("  W/A/S/D, arrows  - Move");
    println!("  Left click       - Flood fill");
    println!("  Right click      - Boundary fill");
    println!("  C                - Clear hitboxes");
    println!("  P                - Log player position");
    println!("  Escape           - Quit");
}

/// Parse command line arguments
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--no-vsync" => parsed.no_vsync = true,
            "--config" => {
                if let Some(v) = value {
                    parsed.config = Some(PathBuf::from(v));
                    i += 1;
                }
            },
            "--scene" => {
                if let Some(v) = value {
                    parsed.scene = Some(PathBuf::from(v));
                    i += 1;
                }
            },
            "--sprites" => {
                if let Some(v) = value {
                    parsed.sprites = Some(PathBuf::from(v));
                    i += 1;
                }
            },
            "--width" | "-w" => {
                if let Some(v) = value {
                    parsed.width = v.parse().ok().or(parsed.width);
                    i += 1;
                }
            },
            "--height" | "-h" => {
                if let Some(v) = value {
                    parsed.height = v.parse().ok().or(parsed.height);
                    i += 1;
                }
            },
            "--resolution" | "-r" => {
                if let Some(v) = value {
                    // Parse WxH format (e.g., 1024x768)
                    if let Some((w, h)) = v.split_once('x') {
                        if let (Ok(w), Ok(h)) = (w.parse::<u32>(), h.parse::<u32>()) {
                            parsed.width = Some(w);
                            parsed.height = Some(h);
                        }
                    }
                    i += 1;
                }
            },
            "--help" => {
                print_help();
                std::process::exit(0);
            },
            other => warn!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }

    parsed
}

fn main() -> Result<(), EngineError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args();
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let mut config = AppConfig::load_or_default(&config_path)?;
    args.apply(&mut config);

    let window = &config.window;
    let mut display = Display::with_options(&window.title, window.width, window.height, window.vsync)?;

    let scene = match &config.scene_path {
        Some(path) => Scene::load(path)?,
        None => Scene::demo(),
    };
    let background = scene.background.unwrap_or(window.background);

    let start = config.player.start;
    let mut player = Player::new(start.x, start.y, config.player.speed);
    player.set_boundaries(config.world_bounds());
    player.set_frame_time(config.player.frame_time);
    player.set_idle_timeout(config.player.idle_timeout);

    let mut loader = SpriteLoader::new();
    match &config.player.sprite_dir {
        Some(dir) => {
            player.load_sprites(&mut loader, dir);
        },
        None => info!("Using placeholder sprites"),
    }

    info!("=== rastertoy ===");
    info!("Resolution: {}x{}", display.width(), display.height());
    info!("VSync: {}", if window.vsync { "ON" } else { "OFF" });
    info!("Scene '{}' with {} figures", scene.name, scene.figures.len());

    let creator = display.texture_creator();
    let mut uploads = TextureUploads::new(&creator);

    let mut fps_counter = FpsCounter::new(60);
    let mut since_report = 0.0;

    'main: loop {
        let (dt, avg_fps) = fps_counter.tick();
        since_report += dt;
        if since_report >= 1.0 {
            debug!(
                "FPS {:.0} avg, {:.2}ms",
                avg_fps,
                fps_counter.avg_frame_time_ms()
            );
            since_report = 0.0;
        }

        let mut pending_fill = None;
        for event in display.poll_events() {
            match event {
                InputEvent::Quit => break 'main,
                InputEvent::KeyDown(key) => match key {
                    Keycode::Escape => break 'main,
                    Keycode::C => {
                        player.hitboxes_mut().clear();
                        info!("Hitboxes cleared");
                    },
                    Keycode::P => {
                        let p = player.position();
                        info!("Player at ({:.1}, {:.1})", p.x, p.y);
                    },
                    _ => {},
                },
                InputEvent::MouseDown { x, y, button } => pending_fill = Some((x, y, button)),
            }
        }

        let input = display.sample_input();
        player.update(&input, config.tick_dt);

        {
            let mut surface = display.surface(&mut uploads);
            let mut renderer = PrimitiveRenderer::new(&mut surface);
            renderer.clear(background);
            scene.compose(&mut renderer, player.hitboxes_mut());
            player.draw(&mut renderer)?;

            if let Some((x, y, button)) = pending_fill {
                let fill = &config.fill;
                let result = match button {
                    MouseButtonKind::Left => renderer.flood_fill(x, y, fill.flood_color, None),
                    MouseButtonKind::Right => {
                        renderer.boundary_fill(x, y, fill.boundary_fill_color, fill.boundary_color)
                    },
                };
                if let Err(e) = result {
                    warn!("Fill at ({}, {}) failed: {}", x, y, e);
                }
            }
        }

        display.present();
    }

    debug!("{} sprite textures were uploaded", uploads.uploaded_count());
    Ok(())
}
