//! Host-supplied tuning. Both configs accept partial JSON objects; anything
//! missing falls back to the defaults below.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Closed depth range `[near, far]` an entity lives in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DepthBand {
    pub near: f64,
    pub far: f64,
}

impl DepthBand {
    pub const fn new(near: f64, far: f64) -> Self {
        Self { near, far }
    }

    pub fn contains(&self, z: f64) -> bool {
        z >= self.near && z <= self.far
    }

    pub fn span(&self) -> f64 {
        self.far - self.near
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub particle_count: usize,
    pub shape_count: usize,
    /// Camera distance used by the perspective divide.
    pub perspective: f64,
    /// Upper clamp on the projected scale factor.
    pub max_scale: f64,
    pub particle_depth: DepthBand,
    pub shape_depth: DepthBand,
    /// Particles must both sit in this band to be linked.
    pub link_band: DepthBand,
    pub link_distance: f64,
    pub pointer_radius: f64,
    pub pointer_force: f64,
    /// Canvas spans the whole document and shifts with scroll.
    pub scroll_aware: bool,
    pub scroll_parallax: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 80,
            shape_count: 15,
            perspective: 1000.0,
            max_scale: 8.0,
            particle_depth: DepthBand::new(1.0, 900.0),
            shape_depth: DepthBand::new(1.0, 850.0),
            link_band: DepthBand::new(500.0, 900.0),
            link_distance: 150.0,
            pointer_radius: 200.0,
            pointer_force: 2.0,
            scroll_aware: false,
            scroll_parallax: 0.15,
        }
    }
}

impl FieldConfig {
    pub fn from_json(json: Option<&str>) -> Result<Self> {
        let cfg: Self = match json {
            Some(s) if !s.trim().is_empty() => serde_json::from_str(s)?,
            _ => Self::default(),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects bands that would let `perspective - depth` reach zero.
    pub fn validate(&self) -> Result<()> {
        if !(self.perspective.is_finite() && self.perspective > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "perspective must be positive, got {}",
                self.perspective
            )));
        }
        if !(self.max_scale.is_finite() && self.max_scale >= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "max_scale must be >= 1, got {}",
                self.max_scale
            )));
        }
        for (name, band) in [
            ("particle_depth", self.particle_depth),
            ("shape_depth", self.shape_depth),
            ("link_band", self.link_band),
        ] {
            if !(band.near.is_finite() && band.far.is_finite()) || band.near < 0.0 {
                return Err(Error::InvalidConfig(format!("{name}: bounds must be finite and >= 0")));
            }
            if band.near >= band.far {
                return Err(Error::InvalidConfig(format!(
                    "{name}: near {} must be below far {}",
                    band.near, band.far
                )));
            }
            if band.far >= self.perspective {
                return Err(Error::InvalidConfig(format!(
                    "{name}: far {} must be below perspective {}",
                    band.far, self.perspective
                )));
            }
        }
        if self.link_distance <= 0.0 || self.pointer_radius <= 0.0 {
            return Err(Error::InvalidConfig(
                "link_distance and pointer_radius must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Timings and sizes for the mini-games, all durations in milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub typing_seconds: u32,
    pub memory_reveal_ms: f64,
    pub bug_seconds: u32,
    pub bug_spawn_ms: f64,
    pub bug_ttl_ms: f64,
    pub bug_move_ms: f64,
    pub bug_points: u32,
    pub bug_size: f64,
    pub bug_area: (f64, f64),
    pub ai_delay_ms: f64,
    pub rps_think_ms: f64,
    pub rps_reveal_ms: f64,
    pub snake_grid: i32,
    pub snake_interval_ms: f64,
    pub snake_min_interval_ms: f64,
    pub snake_speedup_ms: f64,
    pub snake_food_points: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            typing_seconds: 60,
            memory_reveal_ms: 1000.0,
            bug_seconds: 30,
            bug_spawn_ms: 1500.0,
            bug_ttl_ms: 3000.0,
            bug_move_ms: 100.0,
            bug_points: 10,
            bug_size: 60.0,
            bug_area: (600.0, 400.0),
            ai_delay_ms: 500.0,
            rps_think_ms: 700.0,
            rps_reveal_ms: 500.0,
            snake_grid: 20,
            snake_interval_ms: 150.0,
            snake_min_interval_ms: 60.0,
            snake_speedup_ms: 5.0,
            snake_food_points: 10,
        }
    }
}

impl GameConfig {
    pub fn from_json(json: Option<&str>) -> Result<Self> {
        let cfg: Self = match json {
            Some(s) if !s.trim().is_empty() => serde_json::from_str(s)?,
            _ => Self::default(),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.typing_seconds == 0 || self.bug_seconds == 0 {
            return Err(Error::InvalidConfig("round lengths must be non-zero".into()));
        }
        let periods = [
            self.bug_spawn_ms,
            self.bug_move_ms,
            self.bug_ttl_ms,
            self.snake_interval_ms,
            self.snake_min_interval_ms,
        ];
        if periods.iter().any(|p| !(p.is_finite() && *p > 0.0)) {
            return Err(Error::InvalidConfig("timer periods must be positive".into()));
        }
        if self.snake_min_interval_ms > self.snake_interval_ms {
            return Err(Error::InvalidConfig(
                "snake_min_interval_ms exceeds snake_interval_ms".into(),
            ));
        }
        if self.snake_grid < 4 {
            return Err(Error::InvalidConfig("snake_grid must be at least 4".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        FieldConfig::default().validate().unwrap();
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = FieldConfig::from_json(Some(r#"{"particle_count": 12, "scroll_aware": true}"#))
            .unwrap();
        assert_eq!(cfg.particle_count, 12);
        assert!(cfg.scroll_aware);
        assert_eq!(cfg.shape_count, 15);
        assert_eq!(cfg.perspective, 1000.0);
    }

    #[test]
    fn empty_json_is_default() {
        assert_eq!(FieldConfig::from_json(None).unwrap(), FieldConfig::default());
        assert_eq!(GameConfig::from_json(Some("  ")).unwrap(), GameConfig::default());
    }

    #[test]
    fn band_reaching_perspective_is_rejected() {
        let err = FieldConfig::from_json(Some(
            r#"{"particle_depth": {"near": 1.0, "far": 1000.0}}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = GameConfig::from_json(Some("{nope")).unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn snake_floor_above_start_is_rejected() {
        let err = GameConfig::from_json(Some(r#"{"snake_min_interval_ms": 500.0}"#)).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
