//! Integration test crate for FrameMix.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on the core and shadergen crates to verify they work
//! together.

#[cfg(test)]
mod shadergen;
