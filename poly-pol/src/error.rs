//! Error types for POL parsing

use poly_common::ReadError;
use thiserror::Error;

/// Errors that can occur when parsing a POL file
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolError {
    /// File too small to contain the 20-byte header
    #[error("file too small to contain POL header ({0} bytes)")]
    TooSmall(usize),

    /// Header offset tables are not in their required order
    #[error("POL header tables out of order ({name} at 0x{offset:04X})")]
    BadTableOrder {
        /// Name of the offending table
        name: &'static str,
        /// Offset the table claimed
        offset: u16,
    },

    /// Palette region too short for even one palette
    #[error("palette region holds no complete palette")]
    NoPalette,

    /// A read ran past the end of the file
    #[error("unexpected end of POL data: {0}")]
    UnexpectedEof(#[from] ReadError),
}
