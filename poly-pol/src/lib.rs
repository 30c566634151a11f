//! Poly-POL: parser for the POL polygon/palette cutscene asset
//!
//! A `.POL` file carries everything a cutscene draws: shape definitions
//! (lists of primitives), the vertex records they reference, and one or
//! more 16-colour palettes in the 12-bit Amiga `0x0RGB` format. All
//! multi-byte fields are big-endian.
//!
//! # File structure
//!
//! ```text
//! Header (20 bytes, five big-endian u16 offsets):
//!   0x02: shape offset table
//!   0x06: palette data
//!   0x0A: vertices offset table
//!   0x0E: shape data table
//!   0x12: vertices data table
//! ```
//!
//! Shape count and palette count are not stored; they are derived from
//! the distances between the table offsets. Each shape is a list of
//! primitives, each primitive a flags word (offset present / alpha /
//! vertex-record index), an optional 4-byte offset, and a colour byte.
//! Vertex records are tagged by their first byte: `0` is a point, high
//! bit set is an ellipse, anything else is a polygon of `n + 1` vertices
//! (one absolute pair followed by exactly `n` signed byte deltas).

mod error;
mod parser;
mod shape;

pub use error::PolError;
pub use parser::parse_pol;
pub use shape::{Color, Palette, Pol, Primitive, PrimitiveKind, Shape};

// =============================================================================
// Constants
// =============================================================================

/// Size of the POL header in bytes
pub const HEADER_SIZE: usize = 0x14;

/// Colours per palette
pub const PALETTE_COLORS: usize = 16;

/// Bytes per stored palette (16 colours x 2 bytes)
pub const PALETTE_BYTES: usize = PALETTE_COLORS * 2;

/// Primitive flags word: a 4-byte (x, y) offset follows
pub const PRIM_HAS_OFFSET: u16 = 0x8000;

/// Primitive flags word: draw with 50/50 alpha blending
pub const PRIM_ALPHA: u16 = 0x4000;

/// Primitive flags word: low bits hold the vertex-record index
pub const PRIM_INDEX_MASK: u16 = 0x3FFF;

/// Vertex-record tag bit marking an ellipse
pub const VERTS_ELLIPSE: u8 = 0x80;
