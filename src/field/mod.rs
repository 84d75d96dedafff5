//! Depth-field background engine.
//!
//! A fixed pool of particles and shapes drifts toward the viewer through a
//! depth band and is perspective-projected onto a 2D surface every frame.
//! Nearby mid-field particles are linked into a faint mesh, the pointer pushes
//! particles aside, and the scroll-aware variant adds a depth-scaled parallax
//! offset. Everything here is plain data and arithmetic; the browser side lives
//! in `canvas` and talks to the engine through the `Surface` trait.

use rand::rngs::SmallRng;

use crate::config::FieldConfig;

pub mod canvas;
pub mod palette;
pub mod particle;
pub mod projection;
pub mod shape;

use palette::{Palette, Rgba, Theme};
use particle::Particle;
use projection::{Projected, Projector};
use shape::{Shape3D, ShapeKind};

/// Particles further off-surface than this are not drawn.
const PARTICLE_MARGIN: f64 = 50.0;
const SHAPE_MARGIN: f64 = 100.0;
const CUBE_LINE_WIDTH: f64 = 2.0;
const SPHERE_LINE_WIDTH: f64 = 1.0;
const RING_LINE_WIDTH: f64 = 1.5;

/// Host input read by the per-frame step. Event handlers write it; nothing else
/// does.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputState {
    pub width: f64,
    pub height: f64,
    /// `None` until the pointer first moves over the page.
    pub pointer: Option<(f64, f64)>,
    pub scroll_y: f64,
}

impl InputState {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            pointer: None,
            scroll_y: 0.0,
        }
    }
}

/// Drawing primitives the engine needs. Implemented over a canvas 2D context in
/// the browser and by a recorder in tests.
pub trait Surface {
    fn clear(&mut self, width: f64, height: f64);
    fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Rgba, width: f64);
    /// Filled disc with a radial gradient from `color` at the center to fully
    /// transparent at `glow_radius`.
    fn glow(&mut self, center: (f64, f64), radius: f64, glow_radius: f64, color: Rgba);
    fn outline(
        &mut self,
        center: (f64, f64),
        radii: (f64, f64),
        rotation: f64,
        color: Rgba,
        width: f64,
    );
}

/// Wraps a surface and drops any call carrying non-finite geometry.
struct Finite<'a, S: Surface> {
    inner: &'a mut S,
    skipped: usize,
}

fn finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

impl<S: Surface> Finite<'_, S> {
    fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Rgba, width: f64) {
        if finite(&[from.0, from.1, to.0, to.1, width]) {
            self.inner.line(from, to, color, width);
        } else {
            self.skipped += 1;
        }
    }

    fn glow(&mut self, center: (f64, f64), radius: f64, glow_radius: f64, color: Rgba) {
        if finite(&[center.0, center.1, radius, glow_radius]) && radius > 0.0 && glow_radius > 0.0 {
            self.inner.glow(center, radius, glow_radius, color);
        } else {
            self.skipped += 1;
        }
    }

    fn outline(
        &mut self,
        center: (f64, f64),
        radii: (f64, f64),
        rotation: f64,
        color: Rgba,
        width: f64,
    ) {
        let values = [center.0, center.1, radii.0, radii.1, rotation, width];
        if finite(&values) && radii.0 > 0.0 && radii.1 > 0.0 {
            self.inner.outline(center, radii, rotation, color, width);
        } else {
            self.skipped += 1;
        }
    }
}

pub struct Field {
    config: FieldConfig,
    palette: Palette,
    particles: Vec<Particle>,
    shapes: Vec<Shape3D>,
    /// Per-frame projection of every particle, reused across frames.
    scratch: Vec<Option<Projected>>,
    rng: SmallRng,
}

impl Field {
    pub fn new(config: FieldConfig, theme: Theme, input: &InputState, rng: SmallRng) -> Self {
        let mut field = Self {
            particles: Vec::with_capacity(config.particle_count),
            shapes: Vec::with_capacity(config.shape_count),
            scratch: Vec::with_capacity(config.particle_count),
            palette: Palette::for_theme(theme),
            config,
            rng,
        };
        field.seed(input);
        field
    }

    /// Replace both pools with fresh entities in the palette for `theme`.
    pub fn reseed(&mut self, theme: Theme, input: &InputState) {
        log::debug!("depth field reseed for {theme:?}");
        self.palette = Palette::for_theme(theme);
        self.seed(input);
    }

    fn seed(&mut self, input: &InputState) {
        self.particles.clear();
        self.shapes.clear();
        for _ in 0..self.config.particle_count {
            let band = &self.config.particle_depth;
            let p = Particle::spawn(&mut self.rng, input, band, &self.palette);
            self.particles.push(p);
        }
        for _ in 0..self.config.shape_count {
            let s = Shape3D::spawn(&mut self.rng, input, &self.config.shape_depth);
            self.shapes.push(s);
        }
    }

    pub fn theme(&self) -> Theme {
        self.palette.theme
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn shapes(&self) -> &[Shape3D] {
        &self.shapes
    }

    /// Scroll parallax for the scroll-aware variant; nearer (larger scale)
    /// entities move further.
    fn parallax(&self, input: &InputState, scale: f64) -> f64 {
        if self.config.scroll_aware {
            -input.scroll_y * self.config.scroll_parallax * (scale - 1.0)
        } else {
            0.0
        }
    }

    fn project(
        &self,
        projector: &Projector,
        input: &InputState,
        x: f64,
        y: f64,
        z: f64,
    ) -> Option<Projected> {
        let mut p = projector.project(x, y, z)?;
        p.y += self.parallax(input, p.scale);
        p.y.is_finite().then_some(p)
    }

    /// Advance one frame and draw it. Returns how many draw calls were dropped
    /// for non-finite geometry.
    pub fn step<S: Surface>(&mut self, input: &InputState, surface: &mut S) -> usize {
        let (w, h) = (input.width, input.height);
        let projector = Projector::new(self.config.perspective, self.config.max_scale, w, h);
        surface.clear(w, h);
        let mut out = Finite {
            inner: surface,
            skipped: 0,
        };

        self.draw_links(&projector, input, &mut out);

        let shape_band = self.config.shape_depth;
        let shape_alpha = self.palette.shape_opacity;
        for i in 0..self.shapes.len() {
            self.shapes[i].update(&mut self.rng, input, &shape_band);
            let s = &self.shapes[i];
            let Some(p) = self.project(&projector, input, s.x, s.y, s.z) else {
                continue;
            };
            if !p.on_surface(w, h, SHAPE_MARGIN) {
                continue;
            }
            let size = (s.size * p.scale).max(5.0);
            let color = self.palette.color(s.hue).with_alpha(shape_alpha);
            draw_shape(&mut out, s, p.point(), size, color);
        }

        for i in 0..self.particles.len() {
            self.particles[i].update(&mut self.rng, input, &self.config);
            let pt = &self.particles[i];
            let Some(p) = self.project(&projector, input, pt.x, pt.y, pt.z) else {
                continue;
            };
            if !p.on_surface(w, h, PARTICLE_MARGIN) {
                continue;
            }
            let r = pt.radius(p.scale);
            let color = self.palette.color(pt.hue).with_alpha(pt.opacity);
            out.glow(p.point(), r, (r * 2.0).max(5.0), color);
        }

        out.skipped
    }

    /// Mesh lines between mid-field particles, using positions from before this
    /// frame's update.
    fn draw_links<S: Surface>(
        &mut self,
        projector: &Projector,
        input: &InputState,
        out: &mut Finite<'_, S>,
    ) {
        let band = self.config.link_band;
        let max_d = self.config.link_distance;
        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.clear();
        scratch.extend(self.particles.iter().map(|p| {
            if band.contains(p.z) {
                self.project(projector, input, p.x, p.y, p.z)
            } else {
                None
            }
        }));

        let base = self.palette.link_opacity;
        let width = self.palette.link_width;
        let color = self.palette.color(palette::Hue::Primary);
        for i in 0..scratch.len() {
            let Some(a) = scratch[i] else { continue };
            for b in scratch[i + 1..].iter().flatten() {
                let d = (a.x - b.x).hypot(a.y - b.y);
                if d < max_d {
                    let alpha = (1.0 - d / max_d) * base;
                    out.line(a.point(), b.point(), color.with_alpha(alpha), width);
                }
            }
        }
        self.scratch = scratch;
    }
}

fn draw_shape<S: Surface>(
    out: &mut Finite<'_, S>,
    s: &Shape3D,
    (cx, cy): (f64, f64),
    size: f64,
    color: Rgba,
) {
    match s.kind {
        ShapeKind::Cube => {
            for ((ax, ay), (bx, by)) in shape::cube_edges(size, s.rotation) {
                out.line((cx + ax, cy + ay), (cx + bx, cy + by), color, CUBE_LINE_WIDTH);
            }
        }
        ShapeKind::Sphere => {
            let r = size / 2.0;
            out.glow((cx, cy), r, size.max(10.0), color);
            out.outline((cx, cy), (r, r), 0.0, color, SPHERE_LINE_WIDTH);
        }
        ShapeKind::Ring => {
            let r = size / 2.0;
            // Foreshorten by the x tilt but keep a sliver visible edge-on.
            let ry = (r * s.rotation[0].cos().abs()).max(r * 0.08);
            out.outline((cx, cy), (r, ry), s.rotation[2], color, RING_LINE_WIDTH);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Clear,
        Line((f64, f64), (f64, f64)),
        Glow((f64, f64), f64),
        Outline((f64, f64), (f64, f64)),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl Surface for Recorder {
        fn clear(&mut self, _width: f64, _height: f64) {
            self.calls.push(Call::Clear);
        }
        fn line(&mut self, from: (f64, f64), to: (f64, f64), _color: Rgba, _width: f64) {
            self.calls.push(Call::Line(from, to));
        }
        fn glow(&mut self, center: (f64, f64), radius: f64, _glow_radius: f64, _color: Rgba) {
            self.calls.push(Call::Glow(center, radius));
        }
        fn outline(
            &mut self,
            center: (f64, f64),
            radii: (f64, f64),
            _rotation: f64,
            _color: Rgba,
            _width: f64,
        ) {
            self.calls.push(Call::Outline(center, radii));
        }
    }

    fn coords(call: &Call) -> Vec<f64> {
        match call {
            Call::Clear => vec![],
            Call::Line(a, b) => vec![a.0, a.1, b.0, b.1],
            Call::Glow(c, r) => vec![c.0, c.1, *r],
            Call::Outline(c, r) => vec![c.0, c.1, r.0, r.1],
        }
    }

    fn field(config: FieldConfig, seed: u64) -> (Field, InputState) {
        let input = InputState::new(1024.0, 768.0);
        (Field::new(config, Theme::Dark, &input, seeded(seed)), input)
    }

    #[test]
    fn seeds_configured_pool_sizes() {
        let (f, _) = field(FieldConfig::default(), 1);
        assert_eq!(f.particles().len(), 80);
        assert_eq!(f.shapes().len(), 15);
    }

    #[test]
    fn depth_stays_in_band_over_many_frames() {
        let cfg = FieldConfig::default();
        let (mut f, mut input) = field(cfg.clone(), 2);
        input.pointer = Some((512.0, 384.0));
        let mut rec = Recorder::default();
        for _ in 0..3_000 {
            f.step(&input, &mut rec);
            rec.calls.clear();
            assert!(f.particles().iter().all(|p| cfg.particle_depth.contains(p.z)));
            assert!(f.shapes().iter().all(|s| cfg.shape_depth.contains(s.z)));
        }
    }

    #[test]
    fn frame_starts_with_clear_and_never_draws_non_finite() {
        let (mut f, mut input) = field(FieldConfig::default(), 3);
        input.pointer = Some((10.0, 10.0));
        let mut rec = Recorder::default();
        for _ in 0..200 {
            let skipped = f.step(&input, &mut rec);
            assert_eq!(skipped, 0);
        }
        assert_eq!(rec.calls[0], Call::Clear);
        assert!(rec.calls.iter().flat_map(coords).all(f64::is_finite));
        assert!(rec.calls.iter().any(|c| matches!(c, Call::Glow(..))));
    }

    #[test]
    fn non_finite_particle_is_skipped_not_drawn() {
        let mut cfg = FieldConfig::default();
        cfg.shape_count = 0;
        cfg.particle_count = 1;
        let (mut f, input) = field(cfg, 4);
        f.particles[0].x = f64::NAN;
        f.particles[0].z = 500.0;
        let mut rec = Recorder::default();
        f.step(&input, &mut rec);
        assert_eq!(rec.calls, vec![Call::Clear]);
    }

    #[test]
    fn close_mid_field_particles_are_linked() {
        let mut cfg = FieldConfig::default();
        cfg.shape_count = 0;
        cfg.particle_count = 3;
        let (mut f, input) = field(cfg, 5);
        for (i, p) in f.particles.iter_mut().enumerate() {
            p.x = 512.0 + i as f64;
            p.y = 384.0;
            p.z = 600.0;
        }
        // Third particle sits outside the mesh band.
        f.particles[2].z = 100.0;
        let mut rec = Recorder::default();
        f.step(&input, &mut rec);
        let lines = rec.calls.iter().filter(|c| matches!(c, Call::Line(..))).count();
        assert_eq!(lines, 1);
    }

    #[test]
    fn reseed_switches_palette_and_rebuilds_pools() {
        let (mut f, input) = field(FieldConfig::default(), 6);
        let before = f.particles()[0].clone();
        f.reseed(Theme::Light, &input);
        assert_eq!(f.theme(), Theme::Light);
        assert_eq!(f.particles().len(), 80);
        assert_ne!(f.particles()[0], before);
    }

    #[test]
    fn scroll_parallax_only_in_scroll_variant() {
        let (f, mut input) = field(FieldConfig::default(), 7);
        input.scroll_y = 300.0;
        assert_eq!(f.parallax(&input, 2.0), 0.0);

        let cfg = FieldConfig {
            scroll_aware: true,
            ..FieldConfig::default()
        };
        let (g, _) = field(cfg, 7);
        assert!(g.parallax(&input, 2.0) < 0.0);
        assert_eq!(g.parallax(&input, 1.0), 0.0);
    }
}
