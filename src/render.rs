//! Drawing-surface abstraction and per-shape particle rendering
//!
//! The simulation draws through the small [`Canvas`] trait so hosts can
//! plug in any 2D surface. [`BufferCanvas`] records draw commands; the
//! demo replays them onto an egui [`Painter`] and tests inspect them
//! directly.

use egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};
use std::f32::consts::{FRAC_PI_4, TAU};

use crate::config::SnowflakeShape;
use crate::particles::Particle;

/// Particles fade over their final 3 lifetime units before removal.
pub const FADE_WINDOW: f32 = 3.0;

/// Spoke count of the flake figure.
const FLAKE_RAYS: usize = 6;
const FLAKE_STROKE_WIDTH: f32 = 1.0;

/// Minimal 2D drawing surface.
pub trait Canvas {
    fn width(&self) -> f32;
    fn height(&self) -> f32;
    /// Blank the whole surface.
    fn clear(&mut self);
    fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32);
    fn line(&mut self, from: Pos2, to: Pos2, stroke: f32, color: Color32);
}

/// One recorded drawing command.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DrawOp {
    Circle {
        center: Pos2,
        radius: f32,
        color: Color32,
    },
    Line {
        from: Pos2,
        to: Pos2,
        stroke: f32,
        color: Color32,
    },
}

/// Command-recording surface. `clear` drops everything recorded so far,
/// so after a tick the buffer holds exactly the current frame.
pub struct BufferCanvas {
    width: f32,
    height: f32,
    ops: Vec<DrawOp>,
}

impl BufferCanvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Replay the recorded frame onto an egui painter, offset into `rect`.
    pub fn paint_to(&self, painter: &Painter, rect: Rect) {
        let origin = rect.min.to_vec2();
        for op in &self.ops {
            match *op {
                DrawOp::Circle {
                    center,
                    radius,
                    color,
                } => {
                    painter.circle_filled(center + origin, radius, color);
                }
                DrawOp::Line {
                    from,
                    to,
                    stroke,
                    color,
                } => {
                    painter.line_segment([from + origin, to + origin], Stroke::new(stroke, color));
                }
            }
        }
    }
}

impl Canvas for BufferCanvas {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn clear(&mut self) {
        self.ops.clear();
    }

    fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32) {
        self.ops.push(DrawOp::Circle {
            center,
            radius,
            color,
        });
    }

    fn line(&mut self, from: Pos2, to: Pos2, stroke: f32, color: Color32) {
        self.ops.push(DrawOp::Line {
            from,
            to,
            stroke,
            color,
        });
    }
}

/// Paint one particle, faded by its remaining lifetime. Shapes without a
/// dedicated arm render as discs so the loop survives future variants.
pub fn draw_particle(canvas: &mut dyn Canvas, p: &Particle) {
    let opacity = (p.lifetime / FADE_WINDOW).clamp(0.0, 1.0);
    let alpha = (opacity * 255.0) as u8;
    let color = Color32::from_rgba_premultiplied(p.color.r(), p.color.g(), p.color.b(), alpha);

    match p.shape {
        SnowflakeShape::Flake => draw_flake(canvas, p, color),
        _ => draw_disc(canvas, p, color),
    }
}

fn draw_disc(canvas: &mut dyn Canvas, p: &Particle, color: Color32) {
    canvas.fill_circle(p.pos, p.size, color);
}

fn draw_flake(canvas: &mut dyn Canvas, p: &Particle, color: Color32) {
    let step = TAU / FLAKE_RAYS as f32;
    for i in 0..FLAKE_RAYS {
        let angle = p.rotation + step * i as f32;
        let dir = Vec2::new(angle.cos(), angle.sin());

        // Main spoke
        let tip = p.pos + dir * (p.size * 2.0);
        canvas.line(p.pos, tip, FLAKE_STROKE_WIDTH, color);

        // Two side branches, attached partway along the spoke
        for (attach, bend) in [(0.7, FRAC_PI_4), (1.3, -FRAC_PI_4)] {
            let base = p.pos + dir * (p.size * attach);
            let branch_angle = angle + bend;
            let branch_dir = Vec2::new(branch_angle.cos(), branch_angle.sin());
            let end = base + branch_dir * (p.size * 0.5);
            canvas.line(base, end, FLAKE_STROKE_WIDTH, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(shape: SnowflakeShape, lifetime: f32) -> Particle {
        Particle {
            pos: Pos2::new(40.0, 60.0),
            vel: Vec2::ZERO,
            lifetime,
            size: 4.0,
            color: Color32::WHITE,
            rotation: 0.3,
            shape,
        }
    }

    #[test]
    fn disc_is_one_filled_circle() {
        let mut canvas = BufferCanvas::new(100.0, 100.0);
        let p = particle(SnowflakeShape::Circle, 8.0);
        draw_particle(&mut canvas, &p);

        assert_eq!(canvas.ops().len(), 1);
        match canvas.ops()[0] {
            DrawOp::Circle { center, radius, color } => {
                assert_eq!(center, p.pos);
                assert!((radius - p.size).abs() < f32::EPSILON);
                assert_eq!(color.a(), 255);
            }
            _ => panic!("expected a circle"),
        }
    }

    #[test]
    fn flake_is_eighteen_strokes() {
        let mut canvas = BufferCanvas::new(100.0, 100.0);
        let p = particle(SnowflakeShape::Flake, 8.0);
        draw_particle(&mut canvas, &p);

        // 6 spokes, each with 2 branches
        assert_eq!(canvas.ops().len(), 18);
        assert!(canvas
            .ops()
            .iter()
            .all(|op| matches!(op, DrawOp::Line { .. })));
    }

    #[test]
    fn flake_spokes_span_twice_the_size() {
        let mut canvas = BufferCanvas::new(100.0, 100.0);
        let p = particle(SnowflakeShape::Flake, 8.0);
        draw_particle(&mut canvas, &p);

        let spoke_lengths: Vec<f32> = canvas
            .ops()
            .iter()
            .filter_map(|op| match *op {
                DrawOp::Line { from, to, .. } if from == p.pos => Some((to - from).length()),
                _ => None,
            })
            .collect();
        assert_eq!(spoke_lengths.len(), 6);
        for len in spoke_lengths {
            assert!((len - p.size * 2.0).abs() < 1e-3);
        }
    }

    #[test]
    fn fade_applies_in_final_window() {
        let mut canvas = BufferCanvas::new(100.0, 100.0);
        let p = particle(SnowflakeShape::Circle, 1.5);
        draw_particle(&mut canvas, &p);

        match canvas.ops()[0] {
            DrawOp::Circle { color, .. } => assert_eq!(color.a(), 127),
            _ => panic!("expected a circle"),
        }
    }

    #[test]
    fn full_opacity_outside_fade_window() {
        let mut canvas = BufferCanvas::new(100.0, 100.0);
        let p = particle(SnowflakeShape::Circle, FADE_WINDOW + 0.5);
        draw_particle(&mut canvas, &p);

        match canvas.ops()[0] {
            DrawOp::Circle { color, .. } => assert_eq!(color.a(), 255),
            _ => panic!("expected a circle"),
        }
    }

    #[test]
    fn clear_discards_previous_frame() {
        let mut canvas = BufferCanvas::new(100.0, 100.0);
        draw_particle(&mut canvas, &particle(SnowflakeShape::Circle, 8.0));
        assert!(!canvas.ops().is_empty());
        canvas.clear();
        assert!(canvas.ops().is_empty());
    }
}
