//! Data-driven scene: figures drawn with the primitive renderer, each
//! registering its exact geometry as a hitbox.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::collision::{CollisionShape, Hitboxes};
use crate::display::Color;
use crate::error::{ConfigError, RenderError};
use crate::geometry::{
    circumradius, ellipse_outline, line_hitbox, regular_polygon_points, Point2D,
};
use crate::renderer::{Drawable, PrimitiveRenderer};

fn default_hitbox_radius() -> f32 {
    5.0
}

fn default_thickness() -> f32 {
    2.0
}

fn default_segments() -> u32 {
    32
}

fn default_solid() -> bool {
    true
}

/// A single drawable shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Figure {
    Point {
        at: Point2D,
        color: Color,
        #[serde(default = "default_hitbox_radius")]
        hitbox_radius: f32,
    },
    Line {
        from: Point2D,
        to: Point2D,
        color: Color,
        #[serde(default = "default_thickness")]
        thickness: f32,
    },
    Polyline {
        points: Vec<Point2D>,
        #[serde(default)]
        closed: bool,
        color: Color,
        #[serde(default = "default_thickness")]
        thickness: f32,
    },
    /// Native circle shape
    Circle {
        center: Point2D,
        radius: f32,
        fill: Color,
        #[serde(default = "transparent")]
        outline: Color,
    },
    /// Pixel-plotted midpoint circle
    CircleSymmetric {
        center: Point2D,
        radius: f32,
        color: Color,
    },
    Ellipse {
        center: Point2D,
        rx: f32,
        ry: f32,
        color: Color,
        /// Polygon resolution of the hitbox
        #[serde(default = "default_segments")]
        segments: u32,
    },
    /// Regular polygon
    Polygon {
        sides: u32,
        side_length: f32,
        center: Point2D,
        #[serde(default)]
        start_angle: f32,
        color: Color,
    },
}

const fn transparent() -> Color {
    Color::TRANSPARENT
}

impl Figure {
    /// Collision geometry matching what is drawn
    pub fn hitboxes(&self) -> Vec<CollisionShape> {
        match self {
            Figure::Point {
                at, hitbox_radius, ..
            } => vec![CollisionShape::Circle {
                center: *at,
                radius: *hitbox_radius,
            }],
            Figure::Line {
                from, to, thickness, ..
            } => vec![CollisionShape::Polygon(line_hitbox(
                from.x, from.y, to.x, to.y, *thickness,
            ))],
            Figure::Polyline {
                points,
                closed,
                thickness,
                ..
            } => {
                let mut shapes: Vec<CollisionShape> = points
                    .windows(2)
                    .map(|w| {
                        CollisionShape::Polygon(line_hitbox(w[0].x, w[0].y, w[1].x, w[1].y, *thickness))
                    })
                    .collect();
                if *closed && points.len() > 2 {
                    let (first, last) = (points[0], points[points.len() - 1]);
                    shapes.push(CollisionShape::Polygon(line_hitbox(
                        last.x, last.y, first.x, first.y, *thickness,
                    )));
                }
                shapes
            },
            Figure::Circle { center, radius, .. } | Figure::CircleSymmetric { center, radius, .. } => {
                vec![CollisionShape::Circle {
                    center: *center,
                    radius: *radius,
                }]
            },
            Figure::Ellipse {
                center,
                rx,
                ry,
                segments,
                ..
            } => vec![CollisionShape::Polygon(ellipse_outline(*center, *rx, *ry, *segments))],
            Figure::Polygon {
                sides,
                side_length,
                center,
                start_angle,
                ..
            } => vec![CollisionShape::Polygon(regular_polygon_points(
                *sides,
                circumradius(*sides, *side_length),
                *center,
                *start_angle,
            ))],
        }
    }
}

impl Drawable for Figure {
    fn draw(&self, renderer: &mut PrimitiveRenderer<'_>) -> Result<(), RenderError> {
        match self {
            Figure::Point { at, color, .. } => renderer.draw_point(at.x, at.y, *color),
            Figure::Line {
                from, to, color, ..
            } => renderer.draw_line(from.x, from.y, to.x, to.y, *color),
            Figure::Polyline {
                points,
                closed,
                color,
                ..
            } => renderer.draw_poly_line(points, *closed, *color),
            Figure::Circle {
                center,
                radius,
                fill,
                outline,
            } => renderer.draw_circle(center.x, center.y, *radius, *fill, *outline)?,
            Figure::CircleSymmetric {
                center,
                radius,
                color,
            } => renderer.draw_circle_symmetric(center.x, center.y, *radius, *color)?,
            Figure::Ellipse {
                center,
                rx,
                ry,
                color,
                ..
            } => renderer.draw_ellipse_symmetric(center.x, center.y, *rx, *ry, *color)?,
            Figure::Polygon {
                sides,
                side_length,
                center,
                start_angle,
                color,
            } => renderer.draw_polygon(*sides, *side_length, *center, *start_angle, *color)?,
        }
        Ok(())
    }
}

/// A figure placed in the scene; non-solid props are drawn without a hitbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prop {
    #[serde(flatten)]
    pub figure: Figure,
    #[serde(default = "default_solid")]
    pub solid: bool,
}

impl From<Figure> for Prop {
    fn from(figure: Figure) -> Self {
        Self {
            figure,
            solid: true,
        }
    }
}

/// A set of figures composed every frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub name: String,
    #[serde(default)]
    pub background: Option<Color>,
    #[serde(default)]
    pub figures: Vec<Prop>,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            background: None,
            figures: Vec::new(),
        }
    }

    pub fn add(&mut self, figure: Figure) {
        self.figures.push(figure.into());
    }

    /// Save scene to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        info!("Saved scene '{}' to {}", self.name, path.as_ref().display());
        Ok(())
    }

    /// Load scene from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path.as_ref())?;
        let scene: Self = serde_json::from_str(&json)?;
        info!(
            "Loaded scene '{}' ({} figures) from {}",
            scene.name,
            scene.figures.len(),
            path.as_ref().display()
        );
        Ok(scene)
    }

    /// Clear `hitboxes`, then draw every figure and register the hitboxes
    /// of the solid ones. Figures that fail validation are skipped.
    pub fn compose(&self, renderer: &mut PrimitiveRenderer<'_>, hitboxes: &mut Hitboxes) {
        hitboxes.clear();
        for (i, prop) in self.figures.iter().enumerate() {
            if let Err(e) = prop.figure.draw(renderer) {
                warn!("Skipping figure {} of scene '{}': {}", i, self.name, e);
                continue;
            }
            if prop.solid {
                for shape in prop.figure.hitboxes() {
                    hitboxes.push(shape);
                }
            }
        }
    }

    /// Points, lines, a closed polyline, circles, an ellipse and regular polygons
    pub fn demo() -> Self {
        let p = Point2D::new;
        let mut scene = Self::new("demo");

        for (at, color) in [
            (p(100.0, 100.0), Color::YELLOW),
            (p(150.0, 150.0), Color::WHITE),
            (p(200.0, 200.0), Color::WHITE),
        ] {
            scene.add(Figure::Point {
                at,
                color,
                hitbox_radius: default_hitbox_radius(),
            });
        }

        for (from, to, color) in [
            (p(100.0, 100.0), p(200.0, 200.0), Color::RED),
            (p(250.0, 100.0), p(400.0, 200.0), Color::GREEN),
            (p(400.0, 100.0), p(550.0, 200.0), Color::CYAN),
        ] {
            scene.add(Figure::Line {
                from,
                to,
                color,
                thickness: default_thickness(),
            });
        }

        scene.add(Figure::Polyline {
            points: vec![
                p(300.0, 100.0),
                p(400.0, 150.0),
                p(450.0, 250.0),
                p(350.0, 300.0),
                p(100.0, 300.0),
            ],
            closed: true,
            color: Color::CYAN,
            thickness: default_thickness(),
        });

        scene.add(Figure::Circle {
            center: p(600.0, 200.0),
            radius: 40.0,
            fill: Color::GREEN,
            outline: Color::WHITE,
        });
        scene.add(Figure::CircleSymmetric {
            center: p(700.0, 350.0),
            radius: 60.0,
            color: Color::RED,
        });

        scene.add(Figure::Ellipse {
            center: p(500.0, 100.0),
            rx: 80.0,
            ry: 40.0,
            color: Color::YELLOW,
            segments: default_segments(),
        });

        for (sides, side_length, center, start_angle, color) in [
            (3, 40.0, p(200.0, 400.0), -FRAC_PI_2, Color::RED),
            (4, 40.0, p(10.0, 10.0), FRAC_PI_4, Color::GREEN),
            (4, 40.0, p(30.0, 30.0), FRAC_PI_4, Color::GREEN),
            (6, 60.0, p(600.0, 400.0), 0.0, Color::RED),
            (5, 70.0, p(600.0, 300.0), -FRAC_PI_2, Color::RED),
        ] {
            scene.add(Figure::Polygon {
                sides,
                side_length,
                center,
                start_angle,
                color,
            });
        }

        scene
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("untitled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::PixelBuffer;
    use crate::geometry::Rect;

    #[test]
    fn test_demo_registers_every_hitbox() {
        let scene = Scene::demo();
        let mut surface = PixelBuffer::with_size(800, 600);
        let mut hitboxes = Hitboxes::new();
        scene.compose(&mut PrimitiveRenderer::new(&mut surface), &mut hitboxes);
        // 3 points + 3 lines + 5 polyline segments + 2 circles + 1 ellipse + 5 polygons
        assert_eq!(hitboxes.len(), 19);
        assert_eq!(surface.get_pixel(700, 290), Some(Color::RED));
        assert_eq!(surface.get_pixel(600, 200), Some(Color::GREEN));
    }

    #[test]
    fn test_demo_player_spawn_is_clear() {
        let scene = Scene::demo();
        let mut hitboxes = Hitboxes::new();
        scene.compose(&mut PrimitiveRenderer::unbound(), &mut hitboxes);
        assert!(!hitboxes.any_intersects(&Rect::new(400.0, 300.0, 32.0, 64.0)));
        assert!(hitboxes.any_intersects(&Rect::new(140.0, 140.0, 20.0, 20.0)));
    }

    #[test]
    fn test_compose_replaces_previous_hitboxes() {
        let scene = Scene::demo();
        let mut hitboxes = Hitboxes::new();
        hitboxes.add_rectangle(Rect::new(0.0, 0.0, 800.0, 600.0));
        scene.compose(&mut PrimitiveRenderer::unbound(), &mut hitboxes);
        scene.compose(&mut PrimitiveRenderer::unbound(), &mut hitboxes);
        assert_eq!(hitboxes.len(), 19);
    }

    #[test]
    fn test_invalid_and_non_solid_figures() {
        let mut scene = Scene::new("test");
        scene.add(Figure::Polygon {
            sides: 2,
            side_length: 10.0,
            center: Point2D::new(50.0, 50.0),
            start_angle: 0.0,
            color: Color::RED,
        });
        scene.figures.push(Prop {
            figure: Figure::Point {
                at: Point2D::new(5.0, 5.0),
                color: Color::WHITE,
                hitbox_radius: 5.0,
            },
            solid: false,
        });
        scene.add(Figure::CircleSymmetric {
            center: Point2D::new(20.0, 20.0),
            radius: 4.0,
            color: Color::RED,
        });

        let mut surface = PixelBuffer::with_size(64, 64);
        let mut hitboxes = Hitboxes::new();
        scene.compose(&mut PrimitiveRenderer::new(&mut surface), &mut hitboxes);
        assert_eq!(hitboxes.len(), 1);
        assert_eq!(surface.get_pixel(5, 5), Some(Color::WHITE));
    }

    #[test]
    fn test_json_figure_defaults() {
        let json = r#"{
            "name": "mini",
            "figures": [
                {"kind": "line", "from": {"x": 0, "y": 0}, "to": {"x": 10, "y": 0},
                 "color": {"r": 255, "g": 0, "b": 0}},
                {"kind": "circle", "center": {"x": 5, "y": 5}, "radius": 3,
                 "fill": {"r": 0, "g": 0, "b": 255}, "solid": false}
            ]
        }"#;
        let scene: Scene = serde_json::from_str(json).unwrap();
        assert_eq!(scene.figures.len(), 2);
        assert!(scene.figures[0].solid);
        assert!(!scene.figures[1].solid);
        match &scene.figures[0].figure {
            Figure::Line { thickness, .. } => assert_eq!(*thickness, 2.0),
            other => panic!("unexpected figure {:?}", other),
        }
        match &scene.figures[1].figure {
            Figure::Circle { outline, .. } => assert_eq!(*outline, Color::TRANSPARENT),
            other => panic!("unexpected figure {:?}", other),
        }
    }

    #[test]
    fn test_save_then_load_file() {
        let path = std::env::temp_dir().join(format!("rastertoy-scene-{}.json", std::process::id()));
        let scene = Scene::demo();
        scene.save(&path).unwrap();
        let loaded = Scene::load(&path).unwrap();
        assert_eq!(loaded.name, "demo");
        assert_eq!(loaded.figures.len(), scene.figures.len());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        assert!(matches!(
            Scene::load("/nonexistent/scene.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
