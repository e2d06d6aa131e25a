//! FrameMix Shadergen - fragment shader source generation
//!
//! Translates blend modes into GLSL fragment shader statements. The
//! [`FragmentShaderBuilder`] accumulates statements and deduplicated helper
//! functions for one shader compile pass; [`blend::append_mode`] emits the
//! blend arithmetic for a mode, choosing between the Porter-Duff
//! coefficient path and the per-mode formula path.

pub mod blend;
pub mod builder;

pub use blend::{append_coeff_blend, append_mode};
pub use builder::FragmentShaderBuilder;
