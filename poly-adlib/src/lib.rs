//! Poly-AdLib: cutscene audio profile and instrument patch formats
//!
//! The audio side of a cutscene is three little-endian PC-DOS assets:
//!
//! - `.PRF` — the profile: sixteen instrument slots (each naming an
//!   `.INS` file and carrying per-slot note/velocity offsets, a MIDI
//!   program number, a hardware channel and a loop flag), timer setup,
//!   and the name of the `.MID` file to play.
//! - `.INS` — an 80-byte AdLib instrument patch: two FM operators of
//!   thirteen 16-bit fields each, plus the two wave-select bytes.
//! - `.MID` — a standard MIDI file, consumed by the OPL3 core itself.
//!
//! This crate parses PRF and INS and translates the legacy AdLib
//! operator patches into the [`OplPatch`] model a modern OPL3 core is
//! fed with, including the octave fold that reproduces the original
//! hardware's 3-bit block register silently wrapping at octave 8.

mod error;
mod ins;
mod patch;
mod prf;

pub use error::AdlibError;
pub use ins::{InsData, InsOperator, parse_ins};
pub use patch::{OplOperator, OplPatch, fold_note_offset};
pub use prf::{PrfData, parse_prf};

// =============================================================================
// Constants
// =============================================================================

/// Instrument slots in a profile
pub const PRF_SLOTS: usize = 16;

/// Bytes per instrument name field in a profile
pub const PRF_NAME_LEN: usize = 30;

/// Minimum profile size (through the trailing duration field)
pub const PRF_MIN_SIZE: usize = 752;

/// Size of an instrument patch file
pub const INS_SIZE: usize = 80;
