//! FrameMix Core - Foundation types for compositing
//!
//! This crate provides the fundamental blending types used throughout
//! FrameMix:
//! - Blend mode enumeration and stable mode names
//! - Porter-Duff blend formulas and the coefficient classifier
//! - CPU reference implementation of every blend mode
//!
//! The GPU shader generators in `framemix-shadergen` consume these types;
//! the CPU path in [`pixel`] mirrors the generated shader math exactly and
//! doubles as the ground truth for regression tests.

pub mod blend;
pub mod error;
pub mod formula;
pub mod pixel;

pub use blend::BlendMode;
pub use error::BlendError;
pub use formula::{BlendEquation, BlendFormula, BlendModeCoeff, OutputType};
pub use pixel::{apply_formula, blend_pixel, Rgba};
