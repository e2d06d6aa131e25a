//! Blend mode definitions for compositing.
//!
//! Lists all supported blend modes. The shader generators and the CPU
//! fallback use these enums to select the correct blend operation; the
//! discriminants are stable and index the name table.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BlendError;

/// Blend mode for compositing layers.
///
/// The first fifteen modes reduce to Porter-Duff coefficient formulas (see
/// [`crate::formula::BlendFormula`]); the rest require explicit per-mode
/// shader code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u32)]
pub enum BlendMode {
    // ── Porter-Duff / coefficient modes ─────────
    Clear = 0,
    Src = 1,
    Dst = 2,
    #[default]
    SrcOver = 3,
    DstOver = 4,
    SrcIn = 5,
    DstIn = 6,
    SrcOut = 7,
    DstOut = 8,
    SrcATop = 9,
    DstATop = 10,
    Xor = 11,
    PlusLighter = 12,
    Modulate = 13,
    Screen = 14,

    // ── Separable advanced modes ────────────────
    Overlay = 15,
    Darken = 16,
    Lighten = 17,
    ColorDodge = 18,
    ColorBurn = 19,
    HardLight = 20,
    SoftLight = 21,
    Difference = 22,
    Exclusion = 23,
    Multiply = 24,

    // ── Non-separable (HSL) modes ───────────────
    Hue = 25,
    Saturation = 26,
    Color = 27,
    Luminosity = 28,

    // ── Extensions ──────────────────────────────
    PlusDarker = 29,
}

/// Stable mode names, indexed by discriminant. Used by diagnostics and
/// regression tests; order must match the enum exactly.
const MODE_NAMES: [&str; 30] = [
    "Clear",
    "Src",
    "Dst",
    "SrcOver",
    "DstOver",
    "SrcIn",
    "DstIn",
    "SrcOut",
    "DstOut",
    "SrcATop",
    "DstATop",
    "Xor",
    "PlusLighter",
    "Modulate",
    "Screen",
    "Overlay",
    "Darken",
    "Lighten",
    "ColorDodge",
    "ColorBurn",
    "HardLight",
    "SoftLight",
    "Difference",
    "Exclusion",
    "Multiply",
    "Hue",
    "Saturation",
    "Color",
    "Luminosity",
    "PlusDarker",
];

impl BlendMode {
    /// All blend modes in discriminant order.
    pub const ALL: [BlendMode; 30] = [
        Self::Clear,
        Self::Src,
        Self::Dst,
        Self::SrcOver,
        Self::DstOver,
        Self::SrcIn,
        Self::DstIn,
        Self::SrcOut,
        Self::DstOut,
        Self::SrcATop,
        Self::DstATop,
        Self::Xor,
        Self::PlusLighter,
        Self::Modulate,
        Self::Screen,
        Self::Overlay,
        Self::Darken,
        Self::Lighten,
        Self::ColorDodge,
        Self::ColorBurn,
        Self::HardLight,
        Self::SoftLight,
        Self::Difference,
        Self::Exclusion,
        Self::Multiply,
        Self::Hue,
        Self::Saturation,
        Self::Color,
        Self::Luminosity,
        Self::PlusDarker,
    ];

    /// Stable human-readable name.
    pub fn name(self) -> &'static str {
        MODE_NAMES[self as usize]
    }
}

impl FromStr for BlendMode {
    type Err = BlendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlendMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| BlendError::UnknownMode(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_count_and_order() {
        assert_eq!(BlendMode::ALL.len(), 30);
        assert_eq!(MODE_NAMES.len(), 30);
        for (i, mode) in BlendMode::ALL.iter().enumerate() {
            assert_eq!(*mode as usize, i, "discriminants must be dense");
        }
    }

    #[test]
    fn test_names_are_stable() {
        assert_eq!(BlendMode::Clear.name(), "Clear");
        assert_eq!(BlendMode::SrcOver.name(), "SrcOver");
        assert_eq!(BlendMode::PlusLighter.name(), "PlusLighter");
        assert_eq!(BlendMode::ColorDodge.name(), "ColorDodge");
        assert_eq!(BlendMode::Luminosity.name(), "Luminosity");
        assert_eq!(BlendMode::PlusDarker.name(), "PlusDarker");
    }

    #[test]
    fn test_names_are_unique() {
        for (i, a) in MODE_NAMES.iter().enumerate() {
            for b in MODE_NAMES.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_from_str_round_trip() {
        for mode in BlendMode::ALL {
            let parsed: BlendMode = mode.name().parse().unwrap();
            assert_eq!(parsed, mode);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        let err = "Dissolve".parse::<BlendMode>().unwrap_err();
        assert!(matches!(err, BlendError::UnknownMode(_)));
    }
}
