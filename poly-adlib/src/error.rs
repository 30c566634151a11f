//! Error types for PRF/INS parsing

use poly_common::ReadError;
use thiserror::Error;

/// Errors that can occur when parsing audio assets
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdlibError {
    /// Profile file shorter than the fixed layout
    #[error("profile too small: {0} bytes (need {need})", need = crate::PRF_MIN_SIZE)]
    PrfTooSmall(usize),

    /// Instrument file shorter than the fixed 80-byte layout
    #[error("instrument patch too small: {0} bytes (need {need})", need = crate::INS_SIZE)]
    InsTooSmall(usize),

    /// Instrument mode byte is neither melodic (0) nor percussion (1)
    #[error("invalid instrument mode {0}")]
    BadMode(u8),

    /// A read ran past the end of the file
    #[error("unexpected end of audio asset: {0}")]
    UnexpectedEof(#[from] ReadError),
}
