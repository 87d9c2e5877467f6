use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Half-open containment: the right and bottom edges belong to the
    /// neighbouring rect.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }
}

/// The visible region a view renders into, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub dpr: f64,
}

impl Viewport {
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            dpr: 1.0,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("color must start with '#': {0:?}")]
    MissingHash(String),
    #[error("expected 3, 6 or 8 hex digits, got {0}")]
    BadLength(usize),
    #[error("invalid hex digit in {0:?}")]
    BadDigit(String),
}

/// RGBA color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            1.0,
        )
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> Result<Self, ColorParseError> {
        let digits = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(s.to_string()))?;
        if !digits.is_ascii() {
            return Err(ColorParseError::BadDigit(s.to_string()));
        }

        let byte = |range: &str| {
            u8::from_str_radix(range, 16).map_err(|_| ColorParseError::BadDigit(s.to_string()))
        };

        match digits.len() {
            3 => {
                let mut channels = [0u8; 3];
                for (i, c) in digits.chars().enumerate() {
                    let v = byte(&c.to_string())?;
                    channels[i] = v * 17;
                }
                Ok(Self::rgb8(channels[0], channels[1], channels[2]))
            }
            6 | 8 => {
                let mut color = Self::rgb8(byte(&digits[0..2])?, byte(&digits[2..4])?, byte(&digits[4..6])?);
                if digits.len() == 8 {
                    color.a = f32::from(byte(&digits[6..8])?) / 255.0;
                }
                Ok(color)
            }
            n => Err(ColorParseError::BadLength(n)),
        }
    }

    /// `#rrggbb`, alpha dropped.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |c: f32| (f64::from(c).clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Hue in degrees, saturation and lightness in `0.0..=1.0`.
    pub fn to_hsl(self) -> (f64, f64, f64) {
        let r = f64::from(self.r);
        let g = f64::from(self.g);
        let b = f64::from(self.b);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        let delta = max - min;

        if delta == 0.0 {
            return (0.0, 0.0, l);
        }

        let s = if l > 0.5 {
            delta / (2.0 - max - min)
        } else {
            delta / (max + min)
        };
        let h = if max == r {
            ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            (b - r) / delta + 2.0
        } else {
            (r - g) / delta + 4.0
        };
        (h * 60.0, s, l)
    }

    pub fn from_hsl(h: f64, s: f64, l: f64, a: f32) -> Self {
        let l = l.clamp(0.0, 1.0);
        let s = s.clamp(0.0, 1.0);
        if s == 0.0 {
            let v = l as f32;
            return Self::rgba(v, v, v, a);
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let h = h.rem_euclid(360.0) / 360.0;
        Self::rgba(
            hue_to_channel(p, q, h + 1.0 / 3.0) as f32,
            hue_to_channel(p, q, h) as f32,
            hue_to_channel(p, q, h - 1.0 / 3.0) as f32,
            a,
        )
    }

    /// Raise HSL lightness by `ratio` of its current value.
    pub fn lighten(self, ratio: f64) -> Self {
        let (h, s, l) = self.to_hsl();
        Self::from_hsl(h, s, l + l * ratio, self.a)
    }

    /// Lower HSL lightness by `ratio` of its current value.
    pub fn darken(self, ratio: f64) -> Self {
        let (h, s, l) = self.to_hsl();
        Self::from_hsl(h, s, l - l * ratio, self.a)
    }
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}
