use rand::rngs::StdRng;
use rand::Rng;

use crate::config::Theme;
use crate::types::{DrawOp, Style};

use super::{Layer, Viewport};

const BLOOMS: usize = 15;
const ANCHORS: [(f32, f32); 3] = [(-8.0, 7.0), (8.0, 7.0), (0.0, 8.0)];

#[derive(Debug, Clone)]
struct Bloom {
    dx: f32,
    dy: f32,
    scale: f32,
}

#[derive(Debug, Clone)]
struct Cluster {
    anchor: (f32, f32),
    blooms: Vec<Bloom>,
    style: Style,
}

/// Hanging wisteria clusters swaying in the wind, each in its own shade.
pub struct Wisteria {
    clusters: Vec<Cluster>,
    sway: f32,
}

impl Wisteria {
    pub fn new(rng: &mut StdRng, theme: &Theme) -> Self {
        let clusters = ANCHORS
            .iter()
            .zip(&theme.wisteria)
            .map(|(&anchor, colour)| Cluster {
                anchor,
                style: Style::fg(colour.clone()),
                blooms: (0..BLOOMS)
                    .map(|i| Bloom {
                        dx: rng.gen_range(-0.25..0.25),
                        dy: -(i as f32) * 0.3,
                        scale: 0.4 - i as f32 * 0.02,
                    })
                    .collect(),
            })
            .collect();
        Self { clusters, sway: 0.0 }
    }
}

impl Layer for Wisteria {
    fn tick(&mut self, _steps: f32, time: f32, _rng: &mut StdRng) {
        self.sway = (time * 0.5).sin() * 0.1;
    }

    fn resolve(&self, viewport: &Viewport, ops: &mut Vec<DrawOp>) {
        let (sin, cos) = self.sway.sin_cos();
        for cluster in &self.clusters {
            for bloom in &cluster.blooms {
                let x = cluster.anchor.0 + bloom.dx * cos - bloom.dy * sin;
                let y = cluster.anchor.1 + bloom.dx * sin + bloom.dy * cos;
                let Some((x, y)) = viewport.project(x, y) else {
                    continue;
                };
                let ch = if bloom.scale > 0.3 {
                    '✽'
                } else if bloom.scale > 0.2 {
                    '*'
                } else {
                    '·'
                };
                ops.push(DrawOp {
                    x,
                    y,
                    ch,
                    style: cluster.style.clone(),
                    z_order: 2,
                });
            }
        }
    }
}
