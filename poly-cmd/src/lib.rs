//! Poly-CMD: parser and writer for the CMD cutscene bytecode
//!
//! A `.CMD` file is the script of a cutscene: a header of subscene
//! offsets followed by variable-length bytecode. Commands draw shapes
//! from the companion `.POL` file, switch palettes, mark frame
//! boundaries and (in the original) handle text and input. All
//! multi-byte fields are big-endian.
//!
//! # File structure
//!
//! ```text
//! Header:
//!   u16 sub_count           - number of subscenes
//!   u16 offset[sub_count]   - start of each subscene, relative to base
//!   ... bytecode ...        - base = (sub_count + 1) * 2
//! ```
//!
//! A `sub_count` of zero means one implicit subscene starting right
//! after the count word.
//!
//! # Opcode encoding
//!
//! ```text
//! byte = opcode << 2        - low two bits unused (legacy packing)
//! byte & 0x80               - end of subscene
//! ```
//!
//! Commands are grouped into frames: every `markCurPos` terminates the
//! frame it appears in, and a trailing run of commands without one forms
//! a final frame of its own.

mod command;
mod error;
mod parser;
mod writer;

pub use command::{Command, KeyHandler, TextPos};
pub use error::CmdError;
pub use parser::{Frame, Script, Subscene, parse_cmd};
pub use writer::{encode_command, encode_script};

// =============================================================================
// Opcodes
// =============================================================================

/// Bytecode opcodes (`byte >> 2`)
pub mod opcode {
    /// Frame boundary; presents the accumulated frame
    pub const MARK_CUR_POS: u8 = 0;
    /// Set the clear-screen mode
    pub const REFRESH_SCREEN: u8 = 1;
    /// Wait N display frames
    pub const WAIT_FOR_SYNC: u8 = 2;
    /// Draw a shape at a position
    pub const DRAW_SHAPE: u8 = 3;
    /// Copy a palette into one half of the palette buffer
    pub const SET_PALETTE: u8 = 4;
    /// Alias of [`MARK_CUR_POS`]
    pub const MARK_CUR_POS_2: u8 = 5;
    /// Draw subtitle text
    pub const DRAW_CAPTION_TEXT: u8 = 6;
    /// No operation
    pub const NOP: u8 = 7;
    /// Three skipped bytes (purpose unknown)
    pub const SKIP_3: u8 = 8;
    /// Refresh and poll input
    pub const REFRESH_ALL: u8 = 9;
    /// Draw a scaled shape
    pub const DRAW_SHAPE_SCALE: u8 = 10;
    /// Draw a scaled and rotated shape
    pub const DRAW_SHAPE_SCALE_ROT: u8 = 11;
    /// Copy between screen buffers
    pub const COPY_SCREEN: u8 = 12;
    /// Draw text at an explicit position
    pub const DRAW_TEXT_AT_POS: u8 = 13;
    /// Input-driven branching
    pub const HANDLE_KEYS: u8 = 14;

    /// Highest valid opcode
    pub const MAX: u8 = 14;
}

/// Shape-word flag: an explicit (x, y) position follows
pub const SHAPE_HAS_POS: u16 = 0x8000;

/// Shape-word flag (`drawShapeScaleRotate` only): a zoom value follows
pub const SHAPE_HAS_ZOOM: u16 = 0x4000;

/// Shape-word flag: second rotation angle follows
pub const SHAPE_HAS_ROT_B: u16 = 0x2000;

/// Shape-word flag: third rotation angle follows
pub const SHAPE_HAS_ROT_C: u16 = 0x1000;

/// Shape-word mask for the shape id
pub const SHAPE_ID_MASK: u16 = 0x07FF;

/// Default second rotation angle when the flag is absent (degrees)
pub const DEFAULT_ROT_B: u16 = 180;

/// Default third rotation angle when the flag is absent (degrees)
pub const DEFAULT_ROT_C: u16 = 90;

/// `handleKeys` terminator byte
pub const KEY_LIST_END: u8 = 0xFF;
