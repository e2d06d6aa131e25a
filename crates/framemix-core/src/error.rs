//! Blending subsystem errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlendError {
    #[error("unknown blend mode: {0}")]
    UnknownMode(String),
}
