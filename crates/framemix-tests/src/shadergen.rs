//! Integration tests for blend shader generation.
//!
//! Exercises whole compile passes: several blend emissions sharing one
//! accumulator, helper deduplication across modes, and the CPU reference
//! agreeing with the classifier's path selection.

use framemix_core::{apply_formula, blend_pixel, BlendFormula, BlendMode};
use framemix_shadergen::{append_mode, FragmentShaderBuilder};

const HSL_MODES: [BlendMode; 4] = [
    BlendMode::Hue,
    BlendMode::Saturation,
    BlendMode::Color,
    BlendMode::Luminosity,
];

fn append(builder: &mut FragmentShaderBuilder, mode: BlendMode, out: &str) {
    append_mode(
        builder,
        "srcColor",
        "coverageColor",
        "dstColor",
        out,
        mode,
        false,
    );
}

#[test]
fn hsl_helpers_appear_once_across_all_four_modes() {
    let mut builder = FragmentShaderBuilder::new();
    for (i, mode) in HSL_MODES.iter().enumerate() {
        append(&mut builder, *mode, &format!("outColor{i}"));
    }
    let text = builder.shader_text();
    for signature in [
        "float luminance(vec3",
        "vec3 set_luminance(vec3",
        "float saturation(vec3",
        "vec3 set_saturation_helper(float",
        "vec3 set_saturation(vec3",
    ] {
        assert_eq!(text.matches(signature).count(), 1, "{signature}");
    }
}

#[test]
fn requesting_hue_twice_does_not_duplicate_helpers() {
    let mut builder = FragmentShaderBuilder::new();
    append(&mut builder, BlendMode::Hue, "outColorA");
    append(&mut builder, BlendMode::Hue, "outColorB");
    let text = builder.shader_text();
    assert_eq!(text.matches("vec3 set_saturation(vec3").count(), 1);
    assert_eq!(text.matches("vec3 set_luminance(vec3").count(), 1);
    // Both emissions still produced their statements.
    assert!(text.contains("outColorA.rgb"));
    assert!(text.contains("outColorB.rgb"));
}

#[test]
fn helper_functions_precede_blend_statements() {
    let mut builder = FragmentShaderBuilder::new();
    append(&mut builder, BlendMode::Color, "outColor");
    let text = builder.shader_text();
    let fn_pos = text.find("vec3 set_luminance(vec3").unwrap();
    let use_pos = text.find("outColor.rgb = set_luminance(").unwrap();
    assert!(fn_pos < use_pos);
}

#[test]
fn every_mode_emits_under_both_coverage_settings() {
    for mode in BlendMode::ALL {
        for has_coverage in [false, true] {
            let mut builder = FragmentShaderBuilder::new();
            append_mode(
                &mut builder,
                "srcColor",
                "coverageColor",
                "dstColor",
                "outColor",
                mode,
                has_coverage,
            );
            let text = builder.shader_text();
            assert!(
                text.contains("outColor"),
                "{mode:?} coverage={has_coverage} wrote nothing to the output"
            );
        }
    }
}

#[test]
fn coefficient_and_formula_paths_are_disjoint() {
    for mode in BlendMode::ALL {
        let mut builder = FragmentShaderBuilder::new();
        append(&mut builder, mode, "outColor");
        let text = builder.shader_text();
        let on_coeff_path = BlendFormula::for_mode(mode, false).is_some();
        assert_eq!(
            text.contains("primaryOutputColor"),
            on_coeff_path,
            "{mode:?}"
        );
        assert_eq!(
            text.contains("outColor.a = srcColor.a"),
            !on_coeff_path,
            "{mode:?}"
        );
    }
}

#[test]
fn mode_parsed_from_name_emits_its_formula() {
    let mode: BlendMode = "Multiply".parse().unwrap();
    let mut builder = FragmentShaderBuilder::new();
    append(&mut builder, mode, "outColor");
    assert!(builder
        .shader_text()
        .contains("srcColor.rgb * dstColor.rgb"));
}

#[test]
fn cpu_reference_covers_every_mode() {
    let src = [0.25, 0.5, 0.75, 0.8];
    let dst = [0.6, 0.4, 0.2, 0.9];
    for mode in BlendMode::ALL {
        let out = blend_pixel(mode, src, dst);
        for (i, v) in out.iter().enumerate() {
            assert!(
                (0.0..=1.0).contains(v),
                "{mode:?} channel {i} out of range: {v}"
            );
        }
    }
}

#[test]
fn cpu_coefficient_path_matches_blend_pixel() {
    let src = [0.3, 0.2, 0.6, 0.7];
    let dst = [0.1, 0.8, 0.4, 0.5];
    for mode in BlendMode::ALL {
        if let Some(formula) = BlendFormula::for_mode(mode, false) {
            let via_formula = apply_formula(&formula, src, [1.0; 4], dst);
            let via_mode = blend_pixel(mode, src, dst);
            assert_eq!(via_formula, via_mode, "{mode:?}");
        }
    }
}
