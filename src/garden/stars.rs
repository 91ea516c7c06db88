use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::Rng;

use crate::config::Theme;
use crate::types::{DrawOp, Style};

use super::{Layer, Viewport, WORLD_HALF_HEIGHT, WORLD_HALF_WIDTH};

pub const STAR_COUNT: usize = 160;
/// Drawn beneath every other layer.
pub const STAR_Z: i32 = -1;
/// Below this glow a star has faded out completely.
const FADED: f32 = 0.3;

#[derive(Debug, Clone)]
struct Star {
    x: f32,
    y: f32,
    phase: f32,
    /// Twinkle frequency in radians per second.
    rate: f32,
    glow: f32,
}

/// A still field of stars that twinkle and fade.
pub struct Stars {
    stars: Vec<Star>,
    faint: Style,
    bright: Style,
}

impl Stars {
    pub fn new(rng: &mut StdRng, theme: &Theme) -> Self {
        let stars = (0..STAR_COUNT)
            .map(|_| {
                let phase = rng.gen_range(0.0..TAU);
                Star {
                    x: rng.gen_range(-WORLD_HALF_WIDTH..WORLD_HALF_WIDTH),
                    y: rng.gen_range(-WORLD_HALF_HEIGHT..WORLD_HALF_HEIGHT),
                    phase,
                    rate: rng.gen_range(0.5..2.0),
                    glow: glow(0.0, phase, 1.0),
                }
            })
            .collect();
        Self {
            stars,
            faint: Style::fg(theme.star.clone()).dim(),
            bright: Style::fg(theme.star.clone()),
        }
    }
}

fn glow(time: f32, phase: f32, rate: f32) -> f32 {
    0.5 + 0.5 * (time * rate + phase).sin()
}

impl Layer for Stars {
    fn tick(&mut self, _steps: f32, time: f32, _rng: &mut StdRng) {
        for star in &mut self.stars {
            star.glow = glow(time, star.phase, star.rate);
        }
    }

    fn resolve(&self, viewport: &Viewport, ops: &mut Vec<DrawOp>) {
        for star in &self.stars {
            if star.glow < FADED {
                continue;
            }
            let Some((x, y)) = viewport.project(star.x, star.y) else {
                continue;
            };
            let (ch, style) = if star.glow > 0.95 {
                ('✦', &self.bright)
            } else if star.glow > 0.7 {
                ('·', &self.bright)
            } else {
                ('·', &self.faint)
            };
            ops.push(DrawOp {
                x,
                y,
                ch,
                style: style.clone(),
                z_order: STAR_Z,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    const VIEW: Viewport = Viewport {
        width: 80,
        height: 24,
    };

    #[test]
    fn faded_stars_are_not_drawn() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut stars = Stars::new(&mut rng, &Theme::default());
        for star in &mut stars.stars {
            star.glow = 0.0;
        }
        stars.stars[0].glow = 1.0;
        stars.stars[0].x = 0.0;
        stars.stars[0].y = 0.0;

        let mut ops = Vec::new();
        stars.resolve(&VIEW, &mut ops);
        assert_eq!(ops.len(), 1);
        assert_eq!((ops[0].x, ops[0].y, ops[0].ch), (40, 12, '✦'));
        assert_eq!(ops[0].z_order, STAR_Z);
    }

    #[test]
    fn stars_twinkle_in_place() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut stars = Stars::new(&mut rng, &Theme::default());
        let before: Vec<(f32, f32, f32)> = stars.stars.iter().map(|s| (s.x, s.y, s.glow)).collect();

        stars.tick(1.0, 1.3, &mut rng);

        assert_eq!(stars.stars.len(), STAR_COUNT);
        let mut changed = 0;
        for (star, (x, y, glow)) in stars.stars.iter().zip(before) {
            assert_eq!((star.x, star.y), (x, y));
            assert!((0.0..=1.0).contains(&star.glow));
            if (star.glow - glow).abs() > 1e-3 {
                changed += 1;
            }
        }
        assert!(changed > STAR_COUNT / 2);
    }
}
