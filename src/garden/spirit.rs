use rand::rngs::StdRng;
use rand::Rng;

use crate::config::Theme;
use crate::types::{DrawOp, Style};

use super::{Layer, Viewport};

pub const SPIRIT_POINTS: usize = 90;
/// The cloud is drawn larger than its model so it reads on a coarse grid.
const SCALE: f32 = 2.0;
const HALO_RADIUS: f32 = 1.5;
pub const HALO_SEGMENTS: usize = 32;
const HALO_GLYPH: char = '∘';

#[derive(Debug, Clone)]
struct Point {
    origin: (f32, f32),
    pos: (f32, f32),
}

/// A galloping cloud of points in the shape of a horse's spirit.
pub struct Spirit {
    centre: (f32, f32),
    /// Fixed orientation of the halo.
    facing: f32,
    /// Orientation of the point cloud; turns slowly.
    heading: f32,
    points: Vec<Point>,
    style: Style,
    halo: Style,
}

impl Spirit {
    pub fn new(rng: &mut StdRng, theme: &Theme, centre: (f32, f32), heading: f32) -> Self {
        let points = (0..SPIRIT_POINTS)
            .map(|_| {
                let origin = (rng.gen_range(-2.0..2.0), rng.gen_range(-1.0..1.0));
                Point {
                    origin,
                    pos: origin,
                }
            })
            .collect();
        Self {
            centre,
            facing: heading,
            heading,
            points,
            style: Style::fg(theme.spirit.clone()),
            halo: Style::fg(theme.spirit.clone()).dim(),
        }
    }
}

impl Layer for Spirit {
    fn tick(&mut self, steps: f32, time: f32, _rng: &mut StdRng) {
        for point in &mut self.points {
            let (ox, oy) = point.origin;
            point.pos = (
                ox + (time * 3.0 + ox).cos() * 0.2,
                oy + (time * 5.0 + ox).sin() * 0.3,
            );
        }
        self.heading += 0.005 * steps;
    }

    fn resolve(&self, viewport: &Viewport, ops: &mut Vec<DrawOp>) {
        let ring = self.facing.cos();
        for i in 0..HALO_SEGMENTS {
            let angle = i as f32 / HALO_SEGMENTS as f32 * std::f32::consts::TAU;
            let x = self.centre.0 + HALO_RADIUS * angle.cos() * ring * SCALE;
            let y = self.centre.1 + HALO_RADIUS * angle.sin() * SCALE;
            if let Some((x, y)) = viewport.project(x, y) {
                ops.push(DrawOp {
                    x,
                    y,
                    ch: HALO_GLYPH,
                    style: self.halo.clone(),
                    z_order: 1,
                });
            }
        }

        let squash = self.heading.cos();
        for point in &self.points {
            let x = self.centre.0 + point.pos.0 * squash * SCALE;
            let y = self.centre.1 + point.pos.1 * SCALE;
            if let Some((x, y)) = viewport.project(x, y) {
                ops.push(DrawOp {
                    x,
                    y,
                    ch: '•',
                    style: self.style.clone(),
                    z_order: 1,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn points_gallop_near_their_origin() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut spirit = Spirit::new(&mut rng, &Theme::default(), (0.0, 0.0), 0.0);
        for i in 0..200 {
            spirit.tick(1.0, i as f32 / 60.0, &mut rng);
            for p in &spirit.points {
                assert!((p.pos.0 - p.origin.0).abs() <= 0.2 + 1e-4);
                assert!((p.pos.1 - p.origin.1).abs() <= 0.3 + 1e-4);
            }
        }
        assert_eq!(spirit.points.len(), SPIRIT_POINTS);
    }

    #[test]
    fn halo_stays_put_while_the_cloud_turns() {
        let view = Viewport {
            width: 120,
            height: 40,
        };
        let halo_cells = |spirit: &Spirit| {
            let mut ops = Vec::new();
            spirit.resolve(&view, &mut ops);
            ops.into_iter()
                .filter(|o| o.ch == HALO_GLYPH)
                .map(|o| (o.x, o.y))
                .collect::<Vec<_>>()
        };

        let mut rng = StdRng::seed_from_u64(5);
        let mut spirit = Spirit::new(&mut rng, &Theme::default(), (0.0, 0.0), 0.0);
        let before = halo_cells(&spirit);
        assert_eq!(before.len(), HALO_SEGMENTS);

        for i in 0..120 {
            spirit.tick(1.0, i as f32 / 60.0, &mut rng);
        }
        assert!(spirit.heading > 0.5);
        assert_eq!(halo_cells(&spirit), before);
    }
}
