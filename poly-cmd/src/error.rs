//! Error types for CMD parsing

use poly_common::ReadError;
use thiserror::Error;

/// Errors that can occur when parsing a CMD file
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CmdError {
    /// Opcode outside the 0-14 range
    #[error("invalid opcode {opcode} at offset 0x{offset:04X}")]
    BadOpcode {
        /// Decoded opcode value
        opcode: u8,
        /// Offset of the opcode byte
        offset: usize,
    },

    /// A scaled-rotated draw enables both secondary rotation angles,
    /// which selects the 3-D transform this player does not implement
    #[error("unsupported dual-angle rotation at offset 0x{offset:04X}")]
    UnsupportedRotation {
        /// Offset of the opcode byte
        offset: usize,
    },

    /// A read ran past the end of the file
    #[error("unexpected end of CMD data: {0}")]
    UnexpectedEof(#[from] ReadError),
}
