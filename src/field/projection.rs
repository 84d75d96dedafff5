//! Perspective divide from simulated depth to screen space.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Projected {
    pub fn point(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Within the surface grown by `margin` on every side.
    pub fn on_surface(&self, width: f64, height: f64, margin: f64) -> bool {
        self.x >= -margin
            && self.x <= width + margin
            && self.y >= -margin
            && self.y <= height + margin
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Projector {
    perspective: f64,
    max_scale: f64,
    cx: f64,
    cy: f64,
}

impl Projector {
    pub fn new(perspective: f64, max_scale: f64, width: f64, height: f64) -> Self {
        Self {
            perspective,
            max_scale,
            cx: width / 2.0,
            cy: height / 2.0,
        }
    }

    /// `perspective / (perspective - z)`, clamped to `max_scale`. `None` when the
    /// divisor is not positive or the result is not finite.
    pub fn scale(&self, z: f64) -> Option<f64> {
        let denom = self.perspective - z;
        if !(denom > 0.0) {
            return None;
        }
        let s = (self.perspective / denom).min(self.max_scale);
        (s.is_finite() && s > 0.0).then_some(s)
    }

    pub fn project(&self, x: f64, y: f64, z: f64) -> Option<Projected> {
        let scale = self.scale(z)?;
        let p = Projected {
            x: (x - self.cx) * scale + self.cx,
            y: (y - self.cy) * scale + self.cy,
            scale,
        };
        (p.x.is_finite() && p.y.is_finite()).then_some(p)
    }
}
