//! Serializable color representation.

use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Hex color parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("Color must start with '#': {0}")]
    MissingHash(String),
    #[error("Unsupported color length {len} in {input}")]
    BadLength { input: String, len: usize },
    #[error("Invalid hex digit in {0}")]
    BadDigit(String),
}

/// RGBA8 color that survives serde round trips and compares exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(input: &str) -> Result<Self, ColorParseError> {
        let digits = input
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(input.to_string()))?;

        let nibble = |c: char| {
            c.to_digit(16)
                .map(|d| d as u8)
                .ok_or_else(|| ColorParseError::BadDigit(input.to_string()))
        };
        let chars: Vec<char> = digits.chars().collect();

        match chars.len() {
            3 | 4 => {
                let mut channels = [255u8; 4];
                for (slot, &c) in channels.iter_mut().zip(&chars) {
                    let v = nibble(c)?;
                    *slot = v << 4 | v;
                }
                Ok(Self::new(channels[0], channels[1], channels[2], channels[3]))
            }
            6 | 8 => {
                let mut channels = [255u8; 4];
                for (slot, pair) in channels.iter_mut().zip(chars.chunks(2)) {
                    *slot = nibble(pair[0])? << 4 | nibble(pair[1])?;
                }
                Ok(Self::new(channels[0], channels[1], channels[2], channels[3]))
            }
            len => Err(ColorParseError::BadLength {
                input: input.to_string(),
                len,
            }),
        }
    }

    /// Format as `#rrggbbaa`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }
}

impl Default for SerializableColor {
    fn default() -> Self {
        Self::black()
    }
}

impl fmt::Display for SerializableColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for SerializableColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}
