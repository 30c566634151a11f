//! Poly-Common: shared byte-level plumbing for the polycine asset parsers
//!
//! The four cutscene asset formats (CMD, POL, PRF, INS) are offset-table
//! driven binary files with mixed endianness: the video assets are
//! big-endian (Amiga heritage), the audio assets little-endian (PC-DOS).
//! This crate provides the one building block they all share: a
//! bounds-checked typed reader over a byte slice.
//!
//! Every read either succeeds or returns a [`ReadError`] carrying the
//! offending offset — parsers never panic on truncated input.

mod reader;

pub use reader::{ByteReader, ReadError, cstr};
