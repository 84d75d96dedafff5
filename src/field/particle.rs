//! Drifting glow particles.

use std::f64::consts::TAU;

use rand::Rng;

use super::InputState;
use super::palette::{Hue, Palette};
use crate::config::{DepthBand, FieldConfig};

/// Relative size swing of the pulse.
const PULSE_AMPLITUDE: f64 = 0.25;

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub vx: f64,
    pub vy: f64,
    /// Depth lost per frame.
    pub vz: f64,
    pub size: f64,
    pub opacity: f64,
    pub hue: Hue,
    pub phase: f64,
    pub pulse_speed: f64,
}

impl Particle {
    pub fn spawn<R: Rng>(
        rng: &mut R,
        input: &InputState,
        band: &DepthBand,
        palette: &Palette,
    ) -> Self {
        let (lo, hi) = palette.particle_opacity;
        Self {
            x: rng.random::<f64>() * input.width,
            y: rng.random::<f64>() * input.height,
            z: band.near + rng.random::<f64>() * band.span(),
            vx: (rng.random::<f64>() - 0.5) * 0.5,
            vy: (rng.random::<f64>() - 0.5) * 0.5,
            vz: rng.random::<f64>() * 2.0 + 0.5,
            size: rng.random::<f64>() * 3.0 + 1.0,
            opacity: lo + rng.random::<f64>() * (hi - lo),
            hue: Hue::ALL[rng.random_range(0..Hue::ALL.len())],
            phase: rng.random::<f64>() * TAU,
            pulse_speed: rng.random::<f64>() * 0.04 + 0.01,
        }
    }

    pub fn update<R: Rng>(&mut self, rng: &mut R, input: &InputState, cfg: &FieldConfig) {
        self.x += self.vx;
        self.y += self.vy;

        if let Some((px, py)) = input.pointer {
            let dx = px - self.x;
            let dy = py - self.y;
            let dist = dx.hypot(dy);
            if dist > 0.0 && dist < cfg.pointer_radius {
                let push = cfg.pointer_force * (1.0 - dist / cfg.pointer_radius);
                self.x -= dx / dist * push;
                self.y -= dy / dist * push;
            }
        }

        if self.x < 0.0 || self.x > input.width {
            self.vx = -self.vx;
        }
        if self.y < 0.0 || self.y > input.height {
            self.vy = -self.vy;
        }

        self.phase = (self.phase + self.pulse_speed) % TAU;

        let band = &cfg.particle_depth;
        self.z -= self.vz;
        if self.z < band.near {
            self.z = band.far;
            self.x = rng.random::<f64>() * input.width;
            self.y = rng.random::<f64>() * input.height;
        }
    }

    /// Projected disc radius including the pulse, never below one pixel.
    pub fn radius(&self, scale: f64) -> f64 {
        (self.size * scale * (1.0 + PULSE_AMPLITUDE * self.phase.sin())).max(1.0)
    }
}
