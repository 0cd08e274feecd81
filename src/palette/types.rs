use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// An opaque 24-bit colour
///
/// Parsed from `0x1a4d2e`, `#1a4d2e` or `1a4d2e`; serialized in the `0x`
/// form FFmpeg's colour source understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);
    pub const WHITE: Rgb = Rgb([0xff, 0xff, 0xff]);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    /// Colour literal for FFmpeg's `color=c=` source
    pub fn to_ffmpeg(&self) -> String {
        format!("0x{:02x}{:02x}{:02x}", self.0[0], self.0[1], self.0[2])
    }

    pub fn with_alpha(&self, alpha: u8) -> [u8; 4] {
        [self.0[0], self.0[1], self.0[2], alpha]
    }
}

impl FromStr for Rgb {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidValue {
            key: "color".to_string(),
            value: s.to_string(),
        };

        let trimmed = s.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .or_else(|| trimmed.strip_prefix('#'))
            .unwrap_or(trimmed);

        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_ffmpeg()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ffmpeg())
    }
}

/// Background colours for one pillar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    /// Registered name, also used as the run id prefix
    pub name: String,

    /// Solid background behind the hook segment
    pub hook_background: Rgb,
}

impl Palette {
    pub fn new<S: Into<String>>(name: S, hook_background: Rgb) -> Self {
        Self {
            name: name.into(),
            hook_background,
        }
    }
}
