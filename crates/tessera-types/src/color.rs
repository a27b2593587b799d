//! Validated hex color strings.
//!
//! Colors travel the wire as CSS-style `#rrggbb` strings. [`HexColor`]
//! guarantees the format at the type level: any value that exists has been
//! validated and normalized to lowercase, so downstream code (canvas
//! rendering, heatmap export) never re-checks it.

use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

/// Number of hex digits in an `#rrggbb` color.
const HEX_DIGITS: usize = 6;

/// Error returned when a string is not a valid `#rrggbb` color.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {value:?}: expected #rrggbb hex")]
pub struct ColorParseError {
    /// The rejected input, as received.
    pub value: String,
}

/// A validated, lowercase-normalized `#rrggbb` color string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HexColor(String);

impl HexColor {
    /// Parse and normalize a color from its wire form.
    ///
    /// Accepts exactly `#` followed by six hex digits, in either case;
    /// the stored value is lowercased.
    ///
    /// # Errors
    ///
    /// Returns [`ColorParseError`] for any other shape.
    pub fn parse(raw: &str) -> Result<Self, ColorParseError> {
        let digits = raw.strip_prefix('#').ok_or_else(|| ColorParseError {
            value: raw.to_owned(),
        })?;
        let valid = digits.len() == HEX_DIGITS && digits.chars().all(|c| c.is_ascii_hexdigit());
        if valid {
            Ok(Self(raw.to_ascii_lowercase()))
        } else {
            Err(ColorParseError {
                value: raw.to_owned(),
            })
        }
    }

    /// Return the normalized `#rrggbb` string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for HexColor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
