//! Blend mode shader generation.
//!
//! Emits the GLSL statements that composite a source color, an optional
//! coverage value and a destination color under a [`BlendMode`]. Modes
//! that reduce to a Porter-Duff coefficient formula go through
//! [`append_coeff_blend`]; the advanced modes each have a dedicated
//! generator registered in `BLEND_HANDLERS`. Inputs are identifiers of
//! `vec4` values already in scope; all colors are premultiplied.

use framemix_core::{BlendEquation, BlendFormula, BlendMode, BlendModeCoeff, OutputType};
use tracing::trace;

use crate::builder::FragmentShaderBuilder;

/// Emit the blend arithmetic for `mode`, writing the composited color to
/// `out_color`.
///
/// Asks the coefficient classifier first; modes without a coefficient
/// formula under the given coverage conditions take the per-mode formula
/// path. `coverage_color` is only read by coverage-aware coefficient
/// formulas.
pub fn append_mode(
    builder: &mut FragmentShaderBuilder,
    src_color: &str,
    coverage_color: &str,
    dst_color: &str,
    out_color: &str,
    mode: BlendMode,
    has_coverage_processor: bool,
) {
    match BlendFormula::for_mode(mode, has_coverage_processor) {
        Some(formula) => {
            trace!(mode = mode.name(), path = "coefficient", "emitting blend");
            append_coeff_blend(builder, src_color, coverage_color, dst_color, out_color, &formula);
        }
        None => {
            trace!(mode = mode.name(), path = "formula", "emitting blend");
            handle_blend_modes(builder, src_color, dst_color, out_color, mode);
        }
    }
}

// ── Coefficient path ────────────────────────────────────────────

type OutputHandler = fn(src_color: &str, coverage: &str) -> String;

fn output_none(_src: &str, _coverage: &str) -> String {
    "vec4(0.0)".to_string()
}

fn output_coverage(_src: &str, coverage: &str) -> String {
    coverage.to_string()
}

fn output_modulate(src: &str, coverage: &str) -> String {
    format!("{src} * {coverage}")
}

fn output_sa_modulate(src: &str, coverage: &str) -> String {
    format!("{src}.a * {coverage}")
}

fn output_isa_modulate(src: &str, coverage: &str) -> String {
    format!("(1.0 - {src}.a) * {coverage}")
}

fn output_isc_modulate(src: &str, coverage: &str) -> String {
    format!("(vec4(1.0) - {src}) * {coverage}")
}

/// Indexed by `OutputType` discriminant.
const OUTPUT_HANDLERS: [OutputHandler; 6] = [
    output_none,
    output_coverage,
    output_modulate,
    output_sa_modulate,
    output_isa_modulate,
    output_isc_modulate,
];

fn output_expr(ty: OutputType, src_color: &str, coverage: &str) -> String {
    OUTPUT_HANDLERS[ty as usize](src_color, coverage)
}

/// The multiplier a non-Zero coefficient applies to its term, or `None`
/// for `One`. `primary`/`secondary` name the output colors already emitted.
fn coeff_factor(
    coeff: BlendModeCoeff,
    primary: &str,
    secondary: &str,
    dst_color: &str,
) -> Option<String> {
    match coeff {
        // Zero omits the whole term; callers never ask for its factor.
        BlendModeCoeff::Zero => unreachable!("Zero coefficient has no factor"),
        BlendModeCoeff::One => None,
        BlendModeCoeff::SrcColor => Some(primary.to_string()),
        BlendModeCoeff::OneMinusSrcColor => Some(format!("(vec4(1.0) - {primary})")),
        BlendModeCoeff::DstColor => Some(dst_color.to_string()),
        BlendModeCoeff::OneMinusDstColor => Some(format!("(vec4(1.0) - {dst_color})")),
        BlendModeCoeff::SrcAlpha => Some(format!("{primary}.a")),
        BlendModeCoeff::OneMinusSrcAlpha => Some(format!("(1.0 - {primary}.a)")),
        BlendModeCoeff::DstAlpha => Some(format!("{dst_color}.a")),
        BlendModeCoeff::OneMinusDstAlpha => Some(format!("(1.0 - {dst_color}.a)")),
        BlendModeCoeff::Src1Color => Some(secondary.to_string()),
        BlendModeCoeff::OneMinusSrc1Color => Some(format!("(vec4(1.0) - {secondary})")),
        BlendModeCoeff::Src1Alpha => Some(format!("{secondary}.a")),
        BlendModeCoeff::OneMinusSrc1Alpha => Some(format!("(1.0 - {secondary}.a)")),
    }
}

/// Emit one coefficient-weighted term as a local `vec4`.
fn append_term(
    builder: &mut FragmentShaderBuilder,
    term_name: &str,
    base: &str,
    coeff: BlendModeCoeff,
    primary: &str,
    secondary: &str,
    dst_color: &str,
) {
    if coeff == BlendModeCoeff::Zero {
        builder.code_append(&format!("vec4 {term_name} = vec4(0.0);"));
    } else {
        match coeff_factor(coeff, primary, secondary, dst_color) {
            Some(factor) => builder.code_append(&format!("vec4 {term_name} = {base} * {factor};")),
            None => builder.code_append(&format!("vec4 {term_name} = {base};")),
        }
    }
}

/// Emit a coefficient blend: primary/secondary output colors, the two
/// weighted terms and the clamped combining equation.
pub fn append_coeff_blend(
    builder: &mut FragmentShaderBuilder,
    src_color: &str,
    coverage_color: &str,
    dst_color: &str,
    out_color: &str,
    formula: &BlendFormula,
) {
    let primary = "primaryOutputColor";
    builder.code_append(&format!(
        "vec4 {primary} = {};",
        output_expr(formula.primary_output, src_color, coverage_color)
    ));

    let secondary = "secondaryOutputColor";
    if formula.needs_secondary_output() {
        builder.code_append(&format!(
            "vec4 {secondary} = {};",
            output_expr(formula.secondary_output, src_color, coverage_color)
        ));
    }

    append_term(
        builder,
        "dst",
        dst_color,
        formula.dst_coeff,
        primary,
        secondary,
        dst_color,
    );
    append_term(
        builder,
        "src",
        primary,
        formula.src_coeff,
        primary,
        secondary,
        dst_color,
    );

    // Clamping guards against additive coefficient pairs overflowing.
    let combined = match formula.equation {
        BlendEquation::Add => "clamp(src + dst, 0.0, 1.0)",
        BlendEquation::Subtract => "clamp(src - dst, 0.0, 1.0)",
        BlendEquation::ReverseSubtract => "clamp(dst - src, 0.0, 1.0)",
    };
    builder.code_append(&format!("{out_color} = {combined};"));
}

// ── Formula path ────────────────────────────────────────────────

type BlendHandler = fn(&mut FragmentShaderBuilder, &str, &str, &str);

/// Keyed dispatch table for the advanced modes; order is irrelevant.
const BLEND_HANDLERS: [(BlendMode, BlendHandler); 15] = [
    (BlendMode::Overlay, blend_overlay),
    (BlendMode::Darken, blend_darken),
    (BlendMode::Lighten, blend_lighten),
    (BlendMode::ColorDodge, blend_color_dodge),
    (BlendMode::ColorBurn, blend_color_burn),
    (BlendMode::HardLight, blend_hard_light),
    (BlendMode::SoftLight, blend_soft_light),
    (BlendMode::Difference, blend_difference),
    (BlendMode::Exclusion, blend_exclusion),
    (BlendMode::Multiply, blend_multiply),
    (BlendMode::Hue, blend_hue),
    (BlendMode::Saturation, blend_saturation),
    (BlendMode::Color, blend_color),
    (BlendMode::Luminosity, blend_luminosity),
    (BlendMode::PlusDarker, blend_plus_darker),
];

fn handle_blend_modes(
    builder: &mut FragmentShaderBuilder,
    src_color: &str,
    dst_color: &str,
    out_color: &str,
    mode: BlendMode,
) {
    // These all perform src-over on the alpha channel.
    builder.code_append(&format!(
        "{out_color}.a = {src_color}.a + (1.0 - {src_color}.a) * {dst_color}.a;"
    ));
    let handler = BLEND_HANDLERS
        .iter()
        .find(|(m, _)| *m == mode)
        .map(|(_, handler)| *handler)
        .unwrap_or_else(|| unreachable!("no blend handler for {}", mode.name()));
    handler(builder, src_color, dst_color, out_color);
}

const COMPONENTS: [char; 3] = ['r', 'g', 'b'];

fn hard_light(builder: &mut FragmentShaderBuilder, out: &str, src: &str, dst: &str) {
    for c in COMPONENTS {
        builder.code_append(&format!("if (2.0 * {src}.{c} < {src}.a) {{"));
        builder.code_append(&format!("{out}.{c} = 2.0 * {src}.{c} * {dst}.{c};"));
        builder.code_append("} else {");
        builder.code_append(&format!(
            "{out}.{c} = {src}.a * {dst}.a - 2.0 * ({dst}.a - {dst}.{c}) * ({src}.a - {src}.{c});"
        ));
        builder.code_append("}");
    }
    builder.code_append(&format!(
        "{out}.rgb += {src}.rgb * (1.0 - {dst}.a) + {dst}.rgb * (1.0 - {src}.a);"
    ));
}

// Does one component of color-dodge.
fn color_dodge_component(builder: &mut FragmentShaderBuilder, out: &str, src: &str, dst: &str, c: char) {
    builder.code_append(&format!("if (0.0 == {dst}.{c}) {{"));
    builder.code_append(&format!("{out}.{c} = {src}.{c} * (1.0 - {dst}.a);"));
    builder.code_append("} else {");
    builder.code_append(&format!("float d = {src}.a - {src}.{c};"));
    builder.code_append("if (0.0 == d) {");
    builder.code_append(&format!(
        "{out}.{c} = {src}.a * {dst}.a + {src}.{c} * (1.0 - {dst}.a) + {dst}.{c} * (1.0 - {src}.a);"
    ));
    builder.code_append("} else {");
    builder.code_append(&format!("d = min({dst}.a, {dst}.{c} * {src}.a / d);"));
    builder.code_append(&format!(
        "{out}.{c} = d * {src}.a + {src}.{c} * (1.0 - {dst}.a) + {dst}.{c} * (1.0 - {src}.a);"
    ));
    builder.code_append("}");
    builder.code_append("}");
}

// Does one component of color-burn.
fn color_burn_component(builder: &mut FragmentShaderBuilder, out: &str, src: &str, dst: &str, c: char) {
    builder.code_append(&format!("if ({dst}.a == {dst}.{c}) {{"));
    builder.code_append(&format!(
        "{out}.{c} = {src}.a * {dst}.a + {src}.{c} * (1.0 - {dst}.a) + {dst}.{c} * (1.0 - {src}.a);"
    ));
    builder.code_append(&format!("}} else if (0.0 == {src}.{c}) {{"));
    builder.code_append(&format!("{out}.{c} = {dst}.{c} * (1.0 - {src}.a);"));
    builder.code_append("} else {");
    builder.code_append(&format!(
        "float d = max(0.0, {dst}.a - ({dst}.a - {dst}.{c}) * {src}.a / {src}.{c});"
    ));
    builder.code_append(&format!(
        "{out}.{c} = {src}.a * d + {src}.{c} * (1.0 - {dst}.a) + {dst}.{c} * (1.0 - {src}.a);"
    ));
    builder.code_append("}");
}

// Does one component of soft-light. Caller has already checked that dst
// alpha is positive.
fn soft_light_component_pos_dst_alpha(
    builder: &mut FragmentShaderBuilder,
    out: &str,
    src: &str,
    dst: &str,
    c: char,
) {
    // if (2S < Sa)
    builder.code_append(&format!("if (2.0 * {src}.{c} <= {src}.a) {{"));
    // (D^2 (Sa-2 S))/Da+(1-Da) S+D (-Sa+2 S+1)
    builder.code_append(&format!(
        "{out}.{c} = ({dst}.{c}*{dst}.{c}*({src}.a - 2.0*{src}.{c})) / {dst}.a +\
         (1.0 - {dst}.a) * {src}.{c} + {dst}.{c}*(-{src}.a + 2.0*{src}.{c} + 1.0);"
    ));
    // else if (4D < Da)
    builder.code_append(&format!("}} else if (4.0 * {dst}.{c} <= {dst}.a) {{"));
    builder.code_append(&format!("float DSqd = {dst}.{c} * {dst}.{c};"));
    builder.code_append(&format!("float DCub = DSqd * {dst}.{c};"));
    builder.code_append(&format!("float DaSqd = {dst}.a * {dst}.a;"));
    builder.code_append(&format!("float DaCub = DaSqd * {dst}.a;"));
    // (Da^3 (-S)+Da^2 (S-D (3 Sa-6 S-1))+12 Da D^2 (Sa-2 S)-16 D^3 (Sa-2 S))/Da^2
    builder.code_append(&format!(
        "{out}.{c} = (DaSqd*({src}.{c} - {dst}.{c} * (3.0*{src}.a - 6.0*{src}.{c} - 1.0)) +\
         12.0*{dst}.a*DSqd*({src}.a - 2.0*{src}.{c}) - 16.0*DCub * ({src}.a - 2.0*{src}.{c}) -\
         DaCub*{src}.{c}) / DaSqd;"
    ));
    builder.code_append("} else {");
    // -sqrt(Da * D) (Sa-2 S)-Da S+D (Sa-2 S+1)+S
    builder.code_append(&format!(
        "{out}.{c} = {dst}.{c}*({src}.a - 2.0*{src}.{c} + 1.0) + {src}.{c} -\
         sqrt({dst}.a*{dst}.{c})*({src}.a - 2.0*{src}.{c}) - {dst}.a*{src}.{c};"
    ));
    builder.code_append("}");
}

fn blend_overlay(builder: &mut FragmentShaderBuilder, src: &str, dst: &str, out: &str) {
    // Overlay is hard-light with the src and dst reversed.
    hard_light(builder, out, dst, src);
}

fn blend_darken(builder: &mut FragmentShaderBuilder, src: &str, dst: &str, out: &str) {
    builder.code_append(&format!(
        "{out}.rgb = min((1.0 - {src}.a) * {dst}.rgb + {src}.rgb, (1.0 - {dst}.a) * {src}.rgb + {dst}.rgb);"
    ));
}

fn blend_lighten(builder: &mut FragmentShaderBuilder, src: &str, dst: &str, out: &str) {
    builder.code_append(&format!(
        "{out}.rgb = max((1.0 - {src}.a) * {dst}.rgb + {src}.rgb, (1.0 - {dst}.a) * {src}.rgb + {dst}.rgb);"
    ));
}

fn blend_color_dodge(builder: &mut FragmentShaderBuilder, src: &str, dst: &str, out: &str) {
    for c in COMPONENTS {
        color_dodge_component(builder, out, src, dst, c);
    }
}

fn blend_color_burn(builder: &mut FragmentShaderBuilder, src: &str, dst: &str, out: &str) {
    for c in COMPONENTS {
        color_burn_component(builder, out, src, dst, c);
    }
}

fn blend_hard_light(builder: &mut FragmentShaderBuilder, src: &str, dst: &str, out: &str) {
    hard_light(builder, out, src, dst);
}

fn blend_soft_light(builder: &mut FragmentShaderBuilder, src: &str, dst: &str, out: &str) {
    builder.code_append(&format!("if (0.0 == {dst}.a) {{"));
    builder.code_append(&format!("{out}.rgba = {src};"));
    builder.code_append("} else {");
    for c in COMPONENTS {
        soft_light_component_pos_dst_alpha(builder, out, src, dst, c);
    }
    builder.code_append("}");
}

fn blend_difference(builder: &mut FragmentShaderBuilder, src: &str, dst: &str, out: &str) {
    builder.code_append(&format!(
        "{out}.rgb = {src}.rgb + {dst}.rgb - 2.0 * min({src}.rgb * {dst}.a, {dst}.rgb * {src}.a);"
    ));
}

fn blend_exclusion(builder: &mut FragmentShaderBuilder, src: &str, dst: &str, out: &str) {
    builder.code_append(&format!(
        "{out}.rgb = {dst}.rgb + {src}.rgb - 2.0 * {dst}.rgb * {src}.rgb;"
    ));
}

fn blend_multiply(builder: &mut FragmentShaderBuilder, src: &str, dst: &str, out: &str) {
    builder.code_append(&format!(
        "{out}.rgb = (1.0 - {src}.a) * {dst}.rgb + (1.0 - {dst}.a) * {src}.rgb + {src}.rgb * {dst}.rgb;"
    ));
}

fn blend_hue(builder: &mut FragmentShaderBuilder, src: &str, dst: &str, out: &str) {
    // SetLum(SetSat(S * Da, Sat(D * Sa)), Sa*Da, D*Sa) + (1 - Sa) * D + (1 - Da) * S
    add_sat_function(builder);
    add_lum_function(builder);
    builder.code_append(&format!("vec4 dstSrcAlpha = {dst} * {src}.a;"));
    builder.code_append(&format!(
        "{out}.rgb = set_luminance(set_saturation({src}.rgb * {dst}.a, dstSrcAlpha.rgb), dstSrcAlpha.a, dstSrcAlpha.rgb);"
    ));
    builder.code_append(&format!(
        "{out}.rgb += (1.0 - {src}.a) * {dst}.rgb + (1.0 - {dst}.a) * {src}.rgb;"
    ));
}

fn blend_saturation(builder: &mut FragmentShaderBuilder, src: &str, dst: &str, out: &str) {
    // SetLum(SetSat(D * Sa, Sat(S * Da)), Sa*Da, D*Sa) + (1 - Sa) * D + (1 - Da) * S
    add_sat_function(builder);
    add_lum_function(builder);
    builder.code_append(&format!("vec4 dstSrcAlpha = {dst} * {src}.a;"));
    builder.code_append(&format!(
        "{out}.rgb = set_luminance(set_saturation(dstSrcAlpha.rgb, {src}.rgb * {dst}.a), dstSrcAlpha.a, dstSrcAlpha.rgb);"
    ));
    builder.code_append(&format!(
        "{out}.rgb += (1.0 - {src}.a) * {dst}.rgb + (1.0 - {dst}.a) * {src}.rgb;"
    ));
}

fn blend_color(builder: &mut FragmentShaderBuilder, src: &str, dst: &str, out: &str) {
    // SetLum(S * Da, Sa*Da, D * Sa) + (1 - Sa) * D + (1 - Da) * S
    add_lum_function(builder);
    builder.code_append(&format!("vec4 srcDstAlpha = {src} * {dst}.a;"));
    builder.code_append(&format!(
        "{out}.rgb = set_luminance(srcDstAlpha.rgb, srcDstAlpha.a, {dst}.rgb * {src}.a);"
    ));
    builder.code_append(&format!(
        "{out}.rgb += (1.0 - {src}.a) * {dst}.rgb + (1.0 - {dst}.a) * {src}.rgb;"
    ));
}

fn blend_luminosity(builder: &mut FragmentShaderBuilder, src: &str, dst: &str, out: &str) {
    // SetLum(D * Sa, Sa*Da, S * Da) + (1 - Sa) * D + (1 - Da) * S
    add_lum_function(builder);
    builder.code_append(&format!("vec4 srcDstAlpha = {src} * {dst}.a;"));
    builder.code_append(&format!(
        "{out}.rgb = set_luminance({dst}.rgb * {src}.a, srcDstAlpha.a, srcDstAlpha.rgb);"
    ));
    builder.code_append(&format!(
        "{out}.rgb += (1.0 - {src}.a) * {dst}.rgb + (1.0 - {dst}.a) * {src}.rgb;"
    ));
}

fn blend_plus_darker(builder: &mut FragmentShaderBuilder, src: &str, dst: &str, out: &str) {
    // max(0, 1 - ((Da * (1 - Dc) + Sa * (1 - Sc)))), zeroed if alpha is 0.
    builder.code_append(&format!(
        "{out}.rgb = clamp(1.0 + {src}.rgb + {dst}.rgb - {dst}.a - {src}.a, 0.0, 1.0);"
    ));
    builder.code_append(&format!("{out}.rgb *= ({out}.a > 0.0) ? 1.0 : 0.0;"));
}

// ── Shared HSL helper functions ─────────────────────────────────

const LUMINANCE_FN: &str = r#"
float luminance(vec3 color) {
 return dot(vec3(0.3, 0.59, 0.11), color);
}
"#;

const SET_LUMINANCE_FN: &str = r#"
vec3 set_luminance(vec3 hueSat, float alpha, vec3 lumColor) {
  float diff = luminance(lumColor - hueSat);
  vec3 outColor = hueSat + diff;
  float outLum = luminance(outColor);
  float minComp = min(min(outColor.r, outColor.g), outColor.b);
  float maxComp = max(max(outColor.r, outColor.g), outColor.b);
  if (minComp < 0.0 && outLum != minComp) {
    outColor = outLum + ((outColor - vec3(outLum, outLum, outLum)) * outLum) / (outLum - minComp);
  }
  if (maxComp > alpha && maxComp != outLum) {
    outColor = outLum + ((outColor - vec3(outLum, outLum, outLum)) * (alpha - outLum)) / (maxComp - outLum);
  }
  return outColor;
}
"#;

const SATURATION_FN: &str = r#"
float saturation(vec3 color) {
 return max(max(color.r, color.g), color.b) - min(min(color.r, color.g), color.b);
}
"#;

// Returns the adjusted min, mid, and max channels as r, g, b; inout params
// for the three components miscompile on some mobile drivers.
const SET_SATURATION_HELPER_FN: &str = r#"
vec3 set_saturation_helper(float minComp, float midComp, float maxComp, float sat) {
  if (minComp < maxComp) {
    vec3 result;
    result.r = 0.0;
    result.g = sat * (midComp - minComp) / (maxComp - minComp);
    result.b = sat;
    return result;
  } else {
    return vec3(0, 0, 0);
  }
}
"#;

const SET_SATURATION_FN: &str = r#"
vec3 set_saturation(vec3 hueLumColor, vec3 satColor) {
  float sat = saturation(satColor);
  if (hueLumColor.r <= hueLumColor.g) {
    if (hueLumColor.g <= hueLumColor.b) {
      hueLumColor.rgb = set_saturation_helper(hueLumColor.r, hueLumColor.g, hueLumColor.b, sat);
    } else if (hueLumColor.r <= hueLumColor.b) {
      hueLumColor.rbg = set_saturation_helper(hueLumColor.r, hueLumColor.b, hueLumColor.g, sat);
    } else {
      hueLumColor.brg = set_saturation_helper(hueLumColor.b, hueLumColor.r, hueLumColor.g, sat);
    }
  } else if (hueLumColor.r <= hueLumColor.b) {
    hueLumColor.grb = set_saturation_helper(hueLumColor.g, hueLumColor.r, hueLumColor.b, sat);
  } else if (hueLumColor.g <= hueLumColor.b) {
    hueLumColor.gbr = set_saturation_helper(hueLumColor.g, hueLumColor.b, hueLumColor.r, sat);
  } else {
    hueLumColor.bgr = set_saturation_helper(hueLumColor.b, hueLumColor.g, hueLumColor.r, sat);
  }
  return hueLumColor;
}
"#;

/// Register `luminance` and `set_luminance`:
/// `vec3 set_luminance(vec3 hueSat, float alpha, vec3 lumColor)` produces a
/// color with the hue and saturation of `hueSat` and the luminosity of
/// `lumColor`.
fn add_lum_function(builder: &mut FragmentShaderBuilder) {
    builder.add_function(LUMINANCE_FN);
    builder.add_function(SET_LUMINANCE_FN);
}

/// Register `saturation`, `set_saturation_helper` and `set_saturation`:
/// `vec3 set_saturation(vec3 hueLumColor, vec3 satColor)` produces a color
/// with the hue and luminosity of `hueLumColor` and the saturation of
/// `satColor`.
fn add_sat_function(builder: &mut FragmentShaderBuilder) {
    builder.add_function(SATURATION_FN);
    builder.add_function(SET_SATURATION_HELPER_FN);
    builder.add_function(SET_SATURATION_FN);
}
