use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Color/material appearance of the cabinet.
///
/// The showroom line offers `wood`, `resin` and `metal`; the simplified line
/// offers `natural`, `walnut` and `white`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantId {
    Wood,
    Resin,
    Metal,
    Natural,
    Walnut,
    White,
}

/// Material family a variant renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    Opaque,
    Translucent,
}

impl VariantId {
    pub const ALL: [VariantId; 6] = [
        VariantId::Wood,
        VariantId::Resin,
        VariantId::Metal,
        VariantId::Natural,
        VariantId::Walnut,
        VariantId::White,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            VariantId::Wood => "wood",
            VariantId::Resin => "resin",
            VariantId::Metal => "metal",
            VariantId::Natural => "natural",
            VariantId::Walnut => "walnut",
            VariantId::White => "white",
        }
    }

    #[must_use]
    pub fn surface(self) -> SurfaceKind {
        match self {
            VariantId::Resin => SurfaceKind::Translucent,
            _ => SurfaceKind::Opaque,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_translucent(self) -> bool {
        self.surface() == SurfaceKind::Translucent
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariantId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VariantId::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Config(format!("unknown variant '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays() {
        for variant in VariantId::ALL {
            assert_eq!(variant.to_string().parse::<VariantId>().unwrap(), variant);
        }
        assert_eq!(" Resin ".parse::<VariantId>().unwrap(), VariantId::Resin);
        assert!("oak".parse::<VariantId>().is_err());
    }

    #[test]
    fn only_resin_is_translucent() {
        let translucent: Vec<_> = VariantId::ALL
            .into_iter()
            .filter(|v| v.is_translucent())
            .collect();
        assert_eq!(translucent, [VariantId::Resin]);
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&VariantId::Walnut).unwrap();
        assert_eq!(json, "\"walnut\"");
        let back: VariantId = serde_json::from_str("\"metal\"").unwrap();
        assert_eq!(back, VariantId::Metal);
    }
}
