//! Theme palettes for the depth field.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn css(&self) -> String {
        format!("rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, self.a)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark(dark: bool) -> Self {
        if dark { Theme::Dark } else { Theme::Light }
    }
}

/// Color class of an entity; resolved against the active palette at draw time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hue {
    Primary,
    Secondary,
    Accent,
}

impl Hue {
    pub const ALL: [Hue; 3] = [Hue::Primary, Hue::Secondary, Hue::Accent];
}

#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    pub theme: Theme,
    primary: Rgba,
    secondary: Rgba,
    accent: Rgba,
    /// Particle opacity is drawn uniformly from this range.
    pub particle_opacity: (f64, f64),
    pub shape_opacity: f64,
    pub link_opacity: f64,
    pub link_width: f64,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            // Light backgrounds need denser strokes to stay visible.
            Theme::Light => Self {
                theme,
                primary: Rgba::rgb(99, 102, 241),
                secondary: Rgba::rgb(139, 92, 246),
                accent: Rgba::rgb(236, 72, 153),
                particle_opacity: (0.5, 0.9),
                shape_opacity: 0.25,
                link_opacity: 0.3,
                link_width: 1.5,
            },
            Theme::Dark => Self {
                theme,
                primary: Rgba::rgb(129, 140, 248),
                secondary: Rgba::rgb(167, 139, 250),
                accent: Rgba::rgb(244, 114, 182),
                particle_opacity: (0.3, 0.8),
                shape_opacity: 0.15,
                link_opacity: 0.2,
                link_width: 1.0,
            },
        }
    }

    pub fn color(&self, hue: Hue) -> Rgba {
        match hue {
            Hue::Primary => self.primary,
            Hue::Secondary => self.secondary,
            Hue::Accent => self.accent,
        }
    }
}
