use std::f32::consts::{FRAC_PI_2, PI};

use rand::rngs::StdRng;
use rand::Rng;

use crate::config::Theme;
use crate::types::{DrawOp, Style};

use super::{Layer, Viewport, WORLD_HALF_WIDTH};

pub const PETAL_COUNT: usize = 250;
/// Petals falling below this wrap back to `TOP`.
const FLOOR: f32 = -20.0;
const TOP: f32 = 20.0;
const GLYPHS: [char; 4] = ['❀', '✿', '*', '·'];

#[derive(Debug, Clone)]
struct Petal {
    x: f32,
    y: f32,
    /// Fall per reference frame.
    speed: f32,
    sway: f32,
    spin: f32,
    phase: f32,
    scale: f32,
}

pub struct Petals {
    petals: Vec<Petal>,
    style: Style,
    faint: Style,
}

impl Petals {
    pub fn new(rng: &mut StdRng, theme: &Theme) -> Self {
        let petals = (0..PETAL_COUNT)
            .map(|_| Petal {
                x: rng.gen_range(-WORLD_HALF_WIDTH..WORLD_HALF_WIDTH),
                y: rng.gen_range(-15.0..15.0),
                speed: rng.gen_range(0.005..0.025),
                sway: rng.gen_range(0.0..10.0),
                spin: rng.gen_range(0.0..PI),
                phase: rng.gen_range(0.0..2.0 * PI),
                scale: rng.gen_range(0.04..0.12),
            })
            .collect();
        Self {
            petals,
            style: Style::fg(theme.petal.clone()),
            faint: Style::fg(theme.petal.clone()).dim(),
        }
    }
}

impl Layer for Petals {
    fn tick(&mut self, steps: f32, time: f32, rng: &mut StdRng) {
        for petal in &mut self.petals {
            petal.y -= petal.speed * steps;
            petal.x += (time * 0.4 + petal.sway).sin() * 0.008 * steps;

            if petal.y < FLOOR {
                petal.y = TOP;
                petal.x = rng.gen_range(-WORLD_HALF_WIDTH..WORLD_HALF_WIDTH);
            }

            petal.spin += (0.005 + (time * 0.5 + petal.phase).sin() * 0.01) * steps;
        }
    }

    fn resolve(&self, viewport: &Viewport, ops: &mut Vec<DrawOp>) {
        for petal in &self.petals {
            let Some((x, y)) = viewport.project(petal.x, petal.y) else {
                continue;
            };
            let turn = (petal.spin / FRAC_PI_2).floor() as i64;
            let ch = GLYPHS[turn.rem_euclid(GLYPHS.len() as i64) as usize];
            let (style, z_order) = if petal.scale < 0.07 {
                (self.faint.clone(), 0)
            } else {
                (self.style.clone(), 3)
            };
            ops.push(DrawOp {
                x,
                y,
                ch,
                style,
                z_order,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn petals_fall_and_wrap_to_the_top() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut petals = Petals::new(&mut rng, &Theme::default());
        petals.petals[0].y = FLOOR + 0.001;
        petals.petals[1].y = 0.0;

        petals.tick(1.0, 0.0, &mut rng);

        assert_eq!(petals.petals[0].y, TOP);
        assert!(petals.petals[0].x.abs() <= WORLD_HALF_WIDTH);
        assert!(petals.petals[1].y < 0.0);
    }

    #[test]
    fn arena_size_is_fixed() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut petals = Petals::new(&mut rng, &Theme::default());
        for i in 0..5_000 {
            petals.tick(3.0, i as f32 * 0.05, &mut rng);
        }
        assert_eq!(petals.petals.len(), PETAL_COUNT);
        assert!(petals.petals.iter().all(|p| p.y >= FLOOR && p.y <= TOP));
    }
}
