//! Slow rotating wireframe / gradient shapes.

use std::f64::consts::TAU;

use rand::Rng;

use super::InputState;
use super::palette::Hue;
use crate::config::DepthBand;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Cube,
    Sphere,
    Ring,
}

impl ShapeKind {
    const ALL: [ShapeKind; 3] = [ShapeKind::Cube, ShapeKind::Sphere, ShapeKind::Ring];
}

#[derive(Clone, Debug, PartialEq)]
pub struct Shape3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub size: f64,
    /// Rotation angles around x, y, z.
    pub rotation: [f64; 3],
    pub spin: [f64; 3],
    pub vz: f64,
    pub kind: ShapeKind,
    pub hue: Hue,
}

impl Shape3D {
    pub fn spawn<R: Rng>(rng: &mut R, input: &InputState, band: &DepthBand) -> Self {
        let mut angle = || rng.random::<f64>() * TAU;
        let rotation = [angle(), angle(), angle()];
        let mut spin_speed = || (rng.random::<f64>() - 0.5) * 0.02;
        let spin = [spin_speed(), spin_speed(), spin_speed()];
        Self {
            x: rng.random::<f64>() * input.width,
            y: rng.random::<f64>() * input.height,
            z: band.near + rng.random::<f64>() * band.span(),
            size: rng.random::<f64>() * 30.0 + 20.0,
            rotation,
            spin,
            vz: rng.random::<f64>() + 0.3,
            kind: ShapeKind::ALL[rng.random_range(0..ShapeKind::ALL.len())],
            hue: Hue::ALL[rng.random_range(0..Hue::ALL.len())],
        }
    }

    pub fn update<R: Rng>(&mut self, rng: &mut R, input: &InputState, band: &DepthBand) {
        for (angle, spin) in self.rotation.iter_mut().zip(self.spin) {
            *angle = (*angle + spin) % TAU;
        }
        self.z -= self.vz;
        if self.z < band.near {
            self.z = band.far;
            self.x = rng.random::<f64>() * input.width;
            self.y = rng.random::<f64>() * input.height;
        }
    }
}

const CUBE_EDGES: [(usize, usize); 12] = [
    (0, 1), (1, 2), (2, 3), (3, 0),
    (4, 5), (5, 6), (6, 7), (7, 4),
    (0, 4), (1, 5), (2, 6), (3, 7),
];

pub type Segment = ((f64, f64), (f64, f64));

/// Cube wireframe of edge `size` centered on the origin, rotated around y then
/// x, flattened orthographically and finally spun by `rot_z` in the plane.
pub fn cube_edges(size: f64, rotation: [f64; 3]) -> [Segment; 12] {
    let h = size / 2.0;
    let corners = [
        [-h, -h, -h], [h, -h, -h], [h, h, -h], [-h, h, -h],
        [-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h],
    ];
    let (sx, cx) = rotation[0].sin_cos();
    let (sy, cy) = rotation[1].sin_cos();
    let flat = corners.map(|[x, y, z]| {
        let (x, z) = (x * cy - z * sy, x * sy + z * cy);
        let y = y * cx - z * sx;
        rotate((x, y), rotation[2])
    });
    CUBE_EDGES.map(|(a, b)| (flat[a], flat[b]))
}

pub fn rotate((x, y): (f64, f64), angle: f64) -> (f64, f64) {
    let (s, c) = angle.sin_cos();
    (x * c - y * s, x * s + y * c)
}
