//! CPU reference implementation of the blend modes.
//!
//! Operates on premultiplied-alpha `[f32; 4]` pixels and mirrors the
//! generated shader math statement for statement: [`apply_formula`] is the
//! numeric twin of the coefficient shader path, [`blend_pixel`] of the
//! per-mode formula path. The software fallback renderer uses these
//! directly; the shader tests use them as ground truth.

use crate::blend::BlendMode;
use crate::formula::{BlendEquation, BlendFormula, BlendModeCoeff, OutputType};

/// Premultiplied RGBA pixel, channels in `[0, 1]`.
pub type Rgba = [f32; 4];

const ZERO: Rgba = [0.0; 4];

fn splat(v: f32) -> Rgba {
    [v; 4]
}

fn mul(a: Rgba, b: Rgba) -> Rgba {
    [a[0] * b[0], a[1] * b[1], a[2] * b[2], a[3] * b[3]]
}

fn complement(a: Rgba) -> Rgba {
    [1.0 - a[0], 1.0 - a[1], 1.0 - a[2], 1.0 - a[3]]
}

fn clamp01(a: Rgba) -> Rgba {
    a.map(|v| v.clamp(0.0, 1.0))
}

/// Derive an output color from the source color and coverage.
fn output_color(ty: OutputType, src: Rgba, coverage: Rgba) -> Rgba {
    match ty {
        OutputType::None => ZERO,
        OutputType::Coverage => coverage,
        OutputType::Modulate => mul(src, coverage),
        OutputType::SAModulate => mul(splat(src[3]), coverage),
        OutputType::ISAModulate => mul(splat(1.0 - src[3]), coverage),
        OutputType::ISCModulate => mul(complement(src), coverage),
    }
}

/// Componentwise multiplier selected by a blend coefficient.
fn coeff_multiplier(coeff: BlendModeCoeff, primary: Rgba, secondary: Rgba, dst: Rgba) -> Rgba {
    match coeff {
        BlendModeCoeff::Zero => ZERO,
        BlendModeCoeff::One => splat(1.0),
        BlendModeCoeff::SrcColor => primary,
        BlendModeCoeff::OneMinusSrcColor => complement(primary),
        BlendModeCoeff::DstColor => dst,
        BlendModeCoeff::OneMinusDstColor => complement(dst),
        BlendModeCoeff::SrcAlpha => splat(primary[3]),
        BlendModeCoeff::OneMinusSrcAlpha => splat(1.0 - primary[3]),
        BlendModeCoeff::DstAlpha => splat(dst[3]),
        BlendModeCoeff::OneMinusDstAlpha => splat(1.0 - dst[3]),
        BlendModeCoeff::Src1Color => secondary,
        BlendModeCoeff::OneMinusSrc1Color => complement(secondary),
        BlendModeCoeff::Src1Alpha => splat(secondary[3]),
        BlendModeCoeff::OneMinusSrc1Alpha => splat(1.0 - secondary[3]),
    }
}

/// Evaluate a coefficient blend formula on one pixel.
///
/// Mirrors the coefficient shader path: primary/secondary outputs, the two
/// weighted terms (a `Zero` coefficient omits its term) and the clamped
/// combining equation.
pub fn apply_formula(formula: &BlendFormula, src: Rgba, coverage: Rgba, dst: Rgba) -> Rgba {
    let primary = output_color(formula.primary_output, src, coverage);
    let secondary = if formula.needs_secondary_output() {
        output_color(formula.secondary_output, src, coverage)
    } else {
        ZERO
    };

    let dst_term = if formula.dst_coeff == BlendModeCoeff::Zero {
        ZERO
    } else {
        mul(dst, coeff_multiplier(formula.dst_coeff, primary, secondary, dst))
    };
    let src_term = if formula.src_coeff == BlendModeCoeff::Zero {
        ZERO
    } else {
        mul(
            primary,
            coeff_multiplier(formula.src_coeff, primary, secondary, dst),
        )
    };

    let combined = match formula.equation {
        BlendEquation::Add => [
            src_term[0] + dst_term[0],
            src_term[1] + dst_term[1],
            src_term[2] + dst_term[2],
            src_term[3] + dst_term[3],
        ],
        BlendEquation::Subtract => [
            src_term[0] - dst_term[0],
            src_term[1] - dst_term[1],
            src_term[2] - dst_term[2],
            src_term[3] - dst_term[3],
        ],
        BlendEquation::ReverseSubtract => [
            dst_term[0] - src_term[0],
            dst_term[1] - src_term[1],
            dst_term[2] - src_term[2],
            dst_term[3] - src_term[3],
        ],
    };
    clamp01(combined)
}

/// Blend one pixel with full coverage.
///
/// Coefficient modes evaluate their formula; advanced modes run the
/// per-mode math. Both agree with the generated shader code.
pub fn blend_pixel(mode: BlendMode, src: Rgba, dst: Rgba) -> Rgba {
    match BlendFormula::for_mode(mode, false) {
        Some(formula) => apply_formula(&formula, src, splat(1.0), dst),
        None => blend_advanced(mode, src, dst),
    }
}

fn blend_advanced(mode: BlendMode, src: Rgba, dst: Rgba) -> Rgba {
    let sa = src[3];
    let da = dst[3];
    // Every advanced mode performs src-over on alpha.
    let out_a = sa + (1.0 - sa) * da;

    let rgb = match mode {
        BlendMode::Overlay => hard_light_rgb(dst, src),
        BlendMode::HardLight => hard_light_rgb(src, dst),
        BlendMode::Darken => per_channel(src, dst, |s, d| {
            ((1.0 - sa) * d + s).min((1.0 - da) * s + d)
        }),
        BlendMode::Lighten => per_channel(src, dst, |s, d| {
            ((1.0 - sa) * d + s).max((1.0 - da) * s + d)
        }),
        BlendMode::ColorDodge => per_channel(src, dst, |s, d| color_dodge_channel(s, d, sa, da)),
        BlendMode::ColorBurn => per_channel(src, dst, |s, d| color_burn_channel(s, d, sa, da)),
        BlendMode::SoftLight => {
            if da == 0.0 {
                return src;
            }
            per_channel(src, dst, |s, d| soft_light_channel(s, d, sa, da))
        }
        BlendMode::Difference => per_channel(src, dst, |s, d| {
            s + d - 2.0 * (s * da).min(d * sa)
        }),
        BlendMode::Exclusion => per_channel(src, dst, |s, d| d + s - 2.0 * d * s),
        BlendMode::Multiply => per_channel(src, dst, |s, d| {
            (1.0 - sa) * d + (1.0 - da) * s + s * d
        }),
        BlendMode::Hue => {
            let base = set_luminance(
                set_saturation(scale3(rgb3(src), da), scale3(rgb3(dst), sa)),
                sa * da,
                scale3(rgb3(dst), sa),
            );
            add_unblended_tails(base, src, dst)
        }
        BlendMode::Saturation => {
            let base = set_luminance(
                set_saturation(scale3(rgb3(dst), sa), scale3(rgb3(src), da)),
                sa * da,
                scale3(rgb3(dst), sa),
            );
            add_unblended_tails(base, src, dst)
        }
        BlendMode::Color => {
            let base = set_luminance(scale3(rgb3(src), da), sa * da, scale3(rgb3(dst), sa));
            add_unblended_tails(base, src, dst)
        }
        BlendMode::Luminosity => {
            let base = set_luminance(scale3(rgb3(dst), sa), sa * da, scale3(rgb3(src), da));
            add_unblended_tails(base, src, dst)
        }
        BlendMode::PlusDarker => {
            let clamped =
                per_channel(src, dst, |s, d| (1.0 + s + d - da - sa).clamp(0.0, 1.0));
            if out_a > 0.0 {
                clamped
            } else {
                [0.0; 3]
            }
        }
        _ => unreachable!("no advanced blend math for {mode:?}"),
    };

    [rgb[0], rgb[1], rgb[2], out_a]
}

fn per_channel(src: Rgba, dst: Rgba, f: impl Fn(f32, f32) -> f32) -> [f32; 3] {
    [f(src[0], dst[0]), f(src[1], dst[1]), f(src[2], dst[2])]
}

fn hard_light_rgb(src: Rgba, dst: Rgba) -> [f32; 3] {
    let sa = src[3];
    let da = dst[3];
    let mut rgb = per_channel(src, dst, |s, d| {
        if 2.0 * s < sa {
            2.0 * s * d
        } else {
            sa * da - 2.0 * (da - d) * (sa - s)
        }
    });
    for i in 0..3 {
        rgb[i] += src[i] * (1.0 - da) + dst[i] * (1.0 - sa);
    }
    rgb
}

fn color_dodge_channel(s: f32, d: f32, sa: f32, da: f32) -> f32 {
    if d == 0.0 {
        return s * (1.0 - da);
    }
    let denom = sa - s;
    if denom == 0.0 {
        sa * da + s * (1.0 - da) + d * (1.0 - sa)
    } else {
        let ratio = da.min(d * sa / denom);
        ratio * sa + s * (1.0 - da) + d * (1.0 - sa)
    }
}

fn color_burn_channel(s: f32, d: f32, sa: f32, da: f32) -> f32 {
    if da == d {
        sa * da + s * (1.0 - da) + d * (1.0 - sa)
    } else if s == 0.0 {
        d * (1.0 - sa)
    } else {
        let ratio = (da - (da - d) * sa / s).max(0.0);
        sa * ratio + s * (1.0 - da) + d * (1.0 - sa)
    }
}

// Caller has already checked that dst alpha > 0.
fn soft_light_channel(s: f32, d: f32, sa: f32, da: f32) -> f32 {
    if 2.0 * s <= sa {
        (d * d * (sa - 2.0 * s)) / da + (1.0 - da) * s + d * (-sa + 2.0 * s + 1.0)
    } else if 4.0 * d <= da {
        let d_sqd = d * d;
        let d_cub = d_sqd * d;
        let da_sqd = da * da;
        let da_cub = da_sqd * da;
        (da_sqd * (s - d * (3.0 * sa - 6.0 * s - 1.0)) + 12.0 * da * d_sqd * (sa - 2.0 * s)
            - 16.0 * d_cub * (sa - 2.0 * s)
            - da_cub * s)
            / da_sqd
    } else {
        d * (sa - 2.0 * s + 1.0) + s - (da * d).sqrt() * (sa - 2.0 * s) - da * s
    }
}

// ── Non-separable HSL helpers ───────────────────────────────────

fn rgb3(c: Rgba) -> [f32; 3] {
    [c[0], c[1], c[2]]
}

fn scale3(c: [f32; 3], k: f32) -> [f32; 3] {
    [c[0] * k, c[1] * k, c[2] * k]
}

fn add_unblended_tails(base: [f32; 3], src: Rgba, dst: Rgba) -> [f32; 3] {
    let sa = src[3];
    let da = dst[3];
    [
        base[0] + (1.0 - sa) * dst[0] + (1.0 - da) * src[0],
        base[1] + (1.0 - sa) * dst[1] + (1.0 - da) * src[1],
        base[2] + (1.0 - sa) * dst[2] + (1.0 - da) * src[2],
    ]
}

fn luminance(c: [f32; 3]) -> f32 {
    0.3 * c[0] + 0.59 * c[1] + 0.11 * c[2]
}

/// Recenter `hue_sat` by the luminance delta to `lum_color`, then rescale
/// back into `[0, alpha]` if a component escaped.
fn set_luminance(hue_sat: [f32; 3], alpha: f32, lum_color: [f32; 3]) -> [f32; 3] {
    let diff = luminance([
        lum_color[0] - hue_sat[0],
        lum_color[1] - hue_sat[1],
        lum_color[2] - hue_sat[2],
    ]);
    let mut out = [hue_sat[0] + diff, hue_sat[1] + diff, hue_sat[2] + diff];
    let out_lum = luminance(out);
    let min_comp = out[0].min(out[1]).min(out[2]);
    let max_comp = out[0].max(out[1]).max(out[2]);
    if min_comp < 0.0 && out_lum != min_comp {
        out = out.map(|v| out_lum + ((v - out_lum) * out_lum) / (out_lum - min_comp));
    }
    if max_comp > alpha && max_comp != out_lum {
        out = out.map(|v| out_lum + ((v - out_lum) * (alpha - out_lum)) / (max_comp - out_lum));
    }
    out
}

fn saturation(c: [f32; 3]) -> f32 {
    c[0].max(c[1]).max(c[2]) - c[0].min(c[1]).min(c[2])
}

// Returns (adjusted min, adjusted mid, adjusted max).
fn set_saturation_helper(min_comp: f32, mid_comp: f32, max_comp: f32, sat: f32) -> [f32; 3] {
    if min_comp < max_comp {
        [
            0.0,
            sat * (mid_comp - min_comp) / (max_comp - min_comp),
            sat,
        ]
    } else {
        [0.0, 0.0, 0.0]
    }
}

/// Redistribute `hue_lum`'s channels so its saturation matches `sat_color`,
/// preserving the channel order. Six-way sort, as in the shader helper.
fn set_saturation(hue_lum: [f32; 3], sat_color: [f32; 3]) -> [f32; 3] {
    let sat = saturation(sat_color);
    let [r, g, b] = hue_lum;
    let mut out = [0.0; 3];
    if r <= g {
        if g <= b {
            let v = set_saturation_helper(r, g, b, sat);
            out = [v[0], v[1], v[2]];
        } else if r <= b {
            let v = set_saturation_helper(r, b, g, sat);
            out = [v[0], v[2], v[1]];
        } else {
            let v = set_saturation_helper(b, r, g, sat);
            out = [v[1], v[2], v[0]];
        }
    } else if r <= b {
        let v = set_saturation_helper(g, r, b, sat);
        out = [v[1], v[0], v[2]];
    } else if g <= b {
        let v = set_saturation_helper(g, b, r, sat);
        out = [v[2], v[0], v[1]];
    } else {
        let v = set_saturation_helper(b, g, r, sat);
        out = [v[2], v[1], v[0]];
    }
    out
}
