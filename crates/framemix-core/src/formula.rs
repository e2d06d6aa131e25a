//! Porter-Duff blend formulas and the coefficient classifier.
//!
//! A [`BlendFormula`] describes a blend as a pair of weighted terms combined
//! by a blend equation, the representation used by fixed-function hardware
//! blending and by the coefficient shader path. [`BlendFormula::for_mode`]
//! decides whether a mode reduces to such a formula under the given coverage
//! conditions; modes that do not (Overlay and friends) take the per-mode
//! formula path instead.

use crate::blend::BlendMode;

/// Blend coefficient: the multiplier applied to one term of a blend formula.
///
/// `Zero` is the sentinel for "omit this term entirely". The `Src1*`
/// coefficients reference the secondary (dual-source) output and may only
/// appear in formulas that define one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BlendModeCoeff {
    Zero = 0,
    One = 1,
    SrcColor = 2,
    OneMinusSrcColor = 3,
    DstColor = 4,
    OneMinusDstColor = 5,
    SrcAlpha = 6,
    OneMinusSrcAlpha = 7,
    DstAlpha = 8,
    OneMinusDstAlpha = 9,
    Src1Color = 10,
    OneMinusSrc1Color = 11,
    Src1Alpha = 12,
    OneMinusSrc1Alpha = 13,
}

impl BlendModeCoeff {
    /// Whether this coefficient reads the secondary (dual-source) output.
    pub fn refers_src1(self) -> bool {
        matches!(
            self,
            Self::Src1Color | Self::OneMinusSrc1Color | Self::Src1Alpha | Self::OneMinusSrc1Alpha
        )
    }
}

/// How the two weighted terms of a blend formula combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BlendEquation {
    /// `clamp(src + dst, 0, 1)`
    Add = 0,
    /// `clamp(src - dst, 0, 1)`
    Subtract = 1,
    /// `clamp(dst - src, 0, 1)`
    ReverseSubtract = 2,
}

/// How an output color is derived from the source color and the coverage
/// value before coefficient weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum OutputType {
    /// The zero vector.
    None = 0,
    /// Coverage verbatim.
    Coverage = 1,
    /// `src * coverage`
    Modulate = 2,
    /// `src.a * coverage`
    SAModulate = 3,
    /// `(1 - src.a) * coverage`
    ISAModulate = 4,
    /// `(1 - src) * coverage`, full 4-component complement.
    ISCModulate = 5,
}

/// A fixed-coefficient blend description.
///
/// Immutable value consumed once per shader emission (or per CPU pixel in
/// the reference path). The secondary output exists only when a `Src1*`
/// coefficient reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendFormula {
    pub equation: BlendEquation,
    pub src_coeff: BlendModeCoeff,
    pub dst_coeff: BlendModeCoeff,
    pub primary_output: OutputType,
    pub secondary_output: OutputType,
}

/// Plain coefficient formula: primary output is the coverage-modulated
/// source color, no dual-source output.
const fn coeff_formula(src_coeff: BlendModeCoeff, dst_coeff: BlendModeCoeff) -> BlendFormula {
    BlendFormula {
        equation: BlendEquation::Add,
        src_coeff,
        dst_coeff,
        primary_output: OutputType::Modulate,
        secondary_output: OutputType::None,
    }
}

/// Formula whose source term never contributes (Clear, Dst).
const fn no_src_formula(dst_coeff: BlendModeCoeff) -> BlendFormula {
    BlendFormula {
        equation: BlendEquation::Add,
        src_coeff: BlendModeCoeff::Zero,
        dst_coeff,
        primary_output: OutputType::None,
        secondary_output: OutputType::None,
    }
}

/// Coverage formula of the shape `D' = D - P * D`, where `P` is the primary
/// output. Expressed as `ReverseSubtract(P * dst, D)`.
const fn coverage_src_zero_formula(primary_output: OutputType) -> BlendFormula {
    BlendFormula {
        equation: BlendEquation::ReverseSubtract,
        src_coeff: BlendModeCoeff::DstColor,
        dst_coeff: BlendModeCoeff::One,
        primary_output,
        secondary_output: OutputType::None,
    }
}

/// Dual-source coverage formula: `D' = srcCoeff * P + (1 - S1) * D`, with
/// primary `P = src * coverage` and a secondary output feeding the dst
/// coefficient.
const fn coverage_dual_source_formula(
    src_coeff: BlendModeCoeff,
    secondary_output: OutputType,
) -> BlendFormula {
    BlendFormula {
        equation: BlendEquation::Add,
        src_coeff,
        dst_coeff: BlendModeCoeff::OneMinusSrc1Color,
        primary_output: OutputType::Modulate,
        secondary_output,
    }
}

impl BlendFormula {
    /// True when the formula reads the dual-source output.
    pub fn needs_secondary_output(&self) -> bool {
        let needed = self.src_coeff.refers_src1() || self.dst_coeff.refers_src1();
        debug_assert!(
            !needed || self.secondary_output != OutputType::None,
            "src1 coefficient without a secondary output"
        );
        needed
    }

    /// Classify `mode` as a coefficient blend, if possible.
    ///
    /// Returns `None` for the advanced modes, which require per-mode shader
    /// formulas. When `has_coverage` is set, the returned formula already
    /// folds the coverage value into its output types; formulas for Src,
    /// SrcIn, SrcOut and DstATop then rely on dual-source blending.
    pub fn for_mode(mode: BlendMode, has_coverage: bool) -> Option<BlendFormula> {
        use BlendModeCoeff::*;

        // Modes whose coefficients are unaffected by coverage: the coverage
        // folds into the modulated primary output.
        let formula = match mode {
            BlendMode::Dst => no_src_formula(One),
            BlendMode::SrcOver => coeff_formula(One, OneMinusSrcAlpha),
            BlendMode::DstOver => coeff_formula(OneMinusDstAlpha, One),
            BlendMode::SrcATop => coeff_formula(DstAlpha, OneMinusSrcAlpha),
            BlendMode::Xor => coeff_formula(OneMinusDstAlpha, OneMinusSrcAlpha),
            BlendMode::PlusLighter => coeff_formula(One, One),
            BlendMode::Screen => coeff_formula(One, OneMinusSrcColor),

            BlendMode::Clear if !has_coverage => no_src_formula(Zero),
            BlendMode::Src if !has_coverage => coeff_formula(One, Zero),
            BlendMode::SrcIn if !has_coverage => coeff_formula(DstAlpha, Zero),
            BlendMode::DstIn if !has_coverage => coeff_formula(Zero, SrcAlpha),
            BlendMode::SrcOut if !has_coverage => coeff_formula(OneMinusDstAlpha, Zero),
            BlendMode::DstOut if !has_coverage => coeff_formula(Zero, OneMinusSrcAlpha),
            BlendMode::DstATop if !has_coverage => coeff_formula(OneMinusDstAlpha, SrcAlpha),
            BlendMode::Modulate if !has_coverage => coeff_formula(Zero, SrcColor),

            // Coverage f with dst-only result: D' = (1 - P) * D.
            BlendMode::Clear => coverage_src_zero_formula(OutputType::Coverage),
            BlendMode::DstIn => coverage_src_zero_formula(OutputType::ISAModulate),
            BlendMode::DstOut => coverage_src_zero_formula(OutputType::SAModulate),
            BlendMode::Modulate => coverage_src_zero_formula(OutputType::ISCModulate),

            // Coverage f with a surviving source term needs dual-source
            // blending: D' = srcCoeff * f * S + (1 - S1) * D.
            BlendMode::Src => coverage_dual_source_formula(One, OutputType::Coverage),
            BlendMode::SrcIn => coverage_dual_source_formula(DstAlpha, OutputType::Coverage),
            BlendMode::SrcOut => {
                coverage_dual_source_formula(OneMinusDstAlpha, OutputType::Coverage)
            }
            BlendMode::DstATop => {
                coverage_dual_source_formula(OneMinusDstAlpha, OutputType::ISAModulate)
            }

            _ => return None,
        };
        Some(formula)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advanced_modes_have_no_formula() {
        for mode in [
            BlendMode::Overlay,
            BlendMode::Darken,
            BlendMode::Lighten,
            BlendMode::ColorDodge,
            BlendMode::ColorBurn,
            BlendMode::HardLight,
            BlendMode::SoftLight,
            BlendMode::Difference,
            BlendMode::Exclusion,
            BlendMode::Multiply,
            BlendMode::Hue,
            BlendMode::Saturation,
            BlendMode::Color,
            BlendMode::Luminosity,
            BlendMode::PlusDarker,
        ] {
            assert!(BlendFormula::for_mode(mode, false).is_none(), "{mode:?}");
            assert!(BlendFormula::for_mode(mode, true).is_none(), "{mode:?}");
        }
    }

    #[test]
    fn test_porter_duff_table_without_coverage() {
        use BlendModeCoeff::*;
        let expect = [
            (BlendMode::Clear, Zero, Zero),
            (BlendMode::Src, One, Zero),
            (BlendMode::Dst, Zero, One),
            (BlendMode::SrcOver, One, OneMinusSrcAlpha),
            (BlendMode::DstOver, OneMinusDstAlpha, One),
            (BlendMode::SrcIn, DstAlpha, Zero),
            (BlendMode::DstIn, Zero, SrcAlpha),
            (BlendMode::SrcOut, OneMinusDstAlpha, Zero),
            (BlendMode::DstOut, Zero, OneMinusSrcAlpha),
            (BlendMode::SrcATop, DstAlpha, OneMinusSrcAlpha),
            (BlendMode::DstATop, OneMinusDstAlpha, SrcAlpha),
            (BlendMode::Xor, OneMinusDstAlpha, OneMinusSrcAlpha),
            (BlendMode::PlusLighter, One, One),
            (BlendMode::Modulate, Zero, SrcColor),
            (BlendMode::Screen, One, OneMinusSrcColor),
        ];
        for (mode, src, dst) in expect {
            let f = BlendFormula::for_mode(mode, false).unwrap();
            assert_eq!(f.src_coeff, src, "{mode:?}");
            assert_eq!(f.dst_coeff, dst, "{mode:?}");
            assert_eq!(f.equation, BlendEquation::Add, "{mode:?}");
            assert!(!f.needs_secondary_output(), "{mode:?}");
        }
    }

    #[test]
    fn test_coverage_dual_source_modes() {
        for mode in [
            BlendMode::Src,
            BlendMode::SrcIn,
            BlendMode::SrcOut,
            BlendMode::DstATop,
        ] {
            let f = BlendFormula::for_mode(mode, true).unwrap();
            assert!(f.needs_secondary_output(), "{mode:?}");
            assert_eq!(f.dst_coeff, BlendModeCoeff::OneMinusSrc1Color);
            assert_ne!(f.secondary_output, OutputType::None);
        }
    }

    #[test]
    fn test_coverage_src_zero_modes_use_reverse_subtract() {
        let expect = [
            (BlendMode::Clear, OutputType::Coverage),
            (BlendMode::DstIn, OutputType::ISAModulate),
            (BlendMode::DstOut, OutputType::SAModulate),
            (BlendMode::Modulate, OutputType::ISCModulate),
        ];
        for (mode, primary) in expect {
            let f = BlendFormula::for_mode(mode, true).unwrap();
            assert_eq!(f.equation, BlendEquation::ReverseSubtract, "{mode:?}");
            assert_eq!(f.primary_output, primary, "{mode:?}");
            assert_eq!(f.src_coeff, BlendModeCoeff::DstColor, "{mode:?}");
            assert_eq!(f.dst_coeff, BlendModeCoeff::One, "{mode:?}");
            assert!(!f.needs_secondary_output(), "{mode:?}");
        }
    }

    #[test]
    fn test_coverage_invariant_modes() {
        for mode in [
            BlendMode::Dst,
            BlendMode::SrcOver,
            BlendMode::DstOver,
            BlendMode::SrcATop,
            BlendMode::Xor,
            BlendMode::PlusLighter,
            BlendMode::Screen,
        ] {
            let plain = BlendFormula::for_mode(mode, false).unwrap();
            let covered = BlendFormula::for_mode(mode, true).unwrap();
            assert_eq!(plain, covered, "{mode:?}");
        }
    }

    #[test]
    fn test_secondary_output_only_with_src1_coeff() {
        for mode in BlendMode::ALL {
            for has_coverage in [false, true] {
                if let Some(f) = BlendFormula::for_mode(mode, has_coverage) {
                    let refers = f.src_coeff.refers_src1() || f.dst_coeff.refers_src1();
                    assert_eq!(
                        refers,
                        f.secondary_output != OutputType::None,
                        "{mode:?} coverage={has_coverage}"
                    );
                }
            }
        }
    }
}
