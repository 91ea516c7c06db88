//! Garden: the animated backdrop behind the letter.
//!
//! Each layer is a fixed arena of records updated in place every tick and
//! resolved into `DrawOp`s. Layers live in a small world space centred on
//! the origin; the [`Viewport`] maps it onto the terminal grid.

mod petals;
mod spirit;
mod stars;
mod wisteria;

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::Theme;
use crate::types::DrawOp;

pub use petals::Petals;
pub use spirit::Spirit;
pub use stars::Stars;
pub use wisteria::Wisteria;

/// Horizontal half-extent of the visible world.
pub const WORLD_HALF_WIDTH: f32 = 20.0;
/// Vertical half-extent of the visible world.
pub const WORLD_HALF_HEIGHT: f32 = 15.0;

/// Per-frame constants in the layers were tuned for 60 frames per second.
const REFERENCE_FPS: f32 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    /// Map a world position to a grid cell, or `None` when off screen.
    pub fn project(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        let col = (x + WORLD_HALF_WIDTH) / (2.0 * WORLD_HALF_WIDTH) * self.width as f32;
        let row = (WORLD_HALF_HEIGHT - y) / (2.0 * WORLD_HALF_HEIGHT) * self.height as f32;
        if col < 0.0 || row < 0.0 {
            return None;
        }
        let (col, row) = (col.floor() as u32, row.floor() as u32);
        if col >= self.width as u32 || row >= self.height as u32 {
            return None;
        }
        Some((col as u16, row as u16))
    }
}

pub trait Layer {
    /// Advance by `steps` reference frames; `time` is seconds since start.
    fn tick(&mut self, steps: f32, time: f32, rng: &mut StdRng);
    fn resolve(&self, viewport: &Viewport, ops: &mut Vec<DrawOp>);
}

pub struct Garden {
    rng: StdRng,
    time: f32,
    layers: Vec<Box<dyn Layer>>,
}

impl Garden {
    pub fn new(seed: Option<u64>, theme: &Theme) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let layers: Vec<Box<dyn Layer>> = vec![
            Box::new(Stars::new(&mut rng, theme)),
            Box::new(Wisteria::new(&mut rng, theme)),
            Box::new(Spirit::new(&mut rng, theme, (-10.0, -3.0), std::f32::consts::FRAC_PI_4)),
            Box::new(Spirit::new(&mut rng, theme, (10.0, 1.0), -std::f32::consts::FRAC_PI_3)),
            Box::new(Petals::new(&mut rng, theme)),
        ];
        Self {
            rng,
            time: 0.0,
            layers,
        }
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn tick(&mut self, elapsed: Duration) {
        let dt = elapsed.as_secs_f32();
        self.time += dt;
        let steps = dt * REFERENCE_FPS;
        for layer in &mut self.layers {
            layer.tick(steps, self.time, &mut self.rng);
        }
    }

    pub fn resolve(&self, viewport: &Viewport, ops: &mut Vec<DrawOp>) {
        for layer in &self.layers {
            layer.resolve(viewport, ops);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Viewport = Viewport {
        width: 80,
        height: 24,
    };

    #[test]
    fn origin_projects_to_centre() {
        assert_eq!(VIEW.project(0.0, 0.0), Some((40, 12)));
    }

    #[test]
    fn corners_and_outside_points() {
        assert_eq!(VIEW.project(-WORLD_HALF_WIDTH, WORLD_HALF_HEIGHT), Some((0, 0)));
        assert_eq!(VIEW.project(WORLD_HALF_WIDTH, 0.0), None);
        assert_eq!(VIEW.project(0.0, -WORLD_HALF_HEIGHT - 1.0), None);
        assert_eq!(VIEW.project(-25.0, 0.0), None);
    }

    #[test]
    fn seeded_gardens_draw_identically() {
        let theme = Theme::default();
        let mut a = Garden::new(Some(7), &theme);
        let mut b = Garden::new(Some(7), &theme);
        for _ in 0..20 {
            a.tick(Duration::from_millis(50));
            b.tick(Duration::from_millis(50));
        }
        let (mut ops_a, mut ops_b) = (Vec::new(), Vec::new());
        a.resolve(&VIEW, &mut ops_a);
        b.resolve(&VIEW, &mut ops_b);
        let cells = |ops: &[DrawOp]| ops.iter().map(|o| (o.x, o.y, o.ch)).collect::<Vec<_>>();
        assert!(!ops_a.is_empty());
        assert_eq!(cells(&ops_a), cells(&ops_b));
        assert!((a.time() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn stars_sit_beneath_every_other_layer() {
        let garden = Garden::new(Some(11), &Theme::default());
        let mut ops = Vec::new();
        garden.resolve(&VIEW, &mut ops);
        let lowest = ops.iter().map(|o| o.z_order).min();
        assert_eq!(lowest, Some(stars::STAR_Z));
        assert!(ops.iter().filter(|o| o.z_order != stars::STAR_Z).all(|o| o.z_order >= 0));
    }
}
