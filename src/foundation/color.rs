use std::fmt;

use serde::{Deserialize, Serialize};

use crate::foundation::{
    core::Rgba8Premul,
    error::{PhotostripError, PhotostripResult},
};

/// Straight-alpha RGBA8 color as entered by the user.
///
/// Serializes as a lowercase `#rrggbb` / `#rrggbbaa` string and accepts the
/// short `#rgb` / `#rgba` forms plus the named background presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColorRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ColorRgba8 {
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color or a preset name (case-insensitive).
    pub fn parse(s: &str) -> PhotostripResult<Self> {
        let s = s.trim();
        if let Some(preset) = BACKGROUND_PRESETS
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(s))
        {
            return Self::parse_hex(preset.hex);
        }
        Self::parse_hex(s)
    }

    fn parse_hex(s: &str) -> PhotostripResult<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid(s));
        }

        fn nibble(s: &str, i: usize) -> Option<u8> {
            let v = u8::from_str_radix(&s[i..i + 1], 16).ok()?;
            Some(v * 17)
        }
        fn byte(s: &str, i: usize) -> Option<u8> {
            u8::from_str_radix(&s[i..i + 2], 16).ok()
        }

        let parsed = match hex.len() {
            3 => nibble(hex, 0)
                .zip(nibble(hex, 1))
                .zip(nibble(hex, 2))
                .map(|((r, g), b)| Self::rgb(r, g, b)),
            4 => nibble(hex, 0)
                .zip(nibble(hex, 1))
                .zip(nibble(hex, 2))
                .zip(nibble(hex, 3))
                .map(|(((r, g), b), a)| Self::rgba(r, g, b, a)),
            6 => byte(hex, 0)
                .zip(byte(hex, 2))
                .zip(byte(hex, 4))
                .map(|((r, g), b)| Self::rgb(r, g, b)),
            8 => byte(hex, 0)
                .zip(byte(hex, 2))
                .zip(byte(hex, 4))
                .zip(byte(hex, 6))
                .map(|(((r, g), b), a)| Self::rgba(r, g, b, a)),
            _ => None,
        };
        parsed.ok_or_else(|| invalid(s))
    }

    pub fn to_premul(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, self.a)
    }
}

fn invalid(s: &str) -> PhotostripError {
    PhotostripError::validation(format!(
        "invalid color \"{s}\": expected #rgb, #rgba, #rrggbb, #rrggbbaa or a preset name"
    ))
}

impl fmt::Display for ColorRgba8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for ColorRgba8 {
    type Err = PhotostripError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ColorRgba8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ColorRgba8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A named background swatch offered by the booth UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorPreset {
    pub name: &'static str,
    pub hex: &'static str,
}

pub const BACKGROUND_PRESETS: &[ColorPreset] = &[
    ColorPreset { name: "White", hex: "#fff" },
    ColorPreset { name: "Black", hex: "#222" },
    ColorPreset { name: "Pink", hex: "#f8bbd0" },
    ColorPreset { name: "Green", hex: "#a5d6a7" },
    ColorPreset { name: "Blue", hex: "#90caf9" },
    ColorPreset { name: "Yellow", hex: "#fff59d" },
    ColorPreset { name: "Purple", hex: "#ce93d8" },
    ColorPreset { name: "Maroon", hex: "#8d6e63" },
    ColorPreset { name: "Burgundy", hex: "#6d4c41" },
];
