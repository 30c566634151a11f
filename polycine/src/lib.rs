//! Polycine: the core of a player for Flashback's vector-polygon
//! cutscenes
//!
//! One cutscene is two binary assets: a `.CMD` bytecode script and a
//! `.POL` polygon/palette file. This crate interprets the script
//! against a draw-list renderer, rasterizes the result with the
//! original engine's scanline arithmetic into a 256x224 RGBA
//! framebuffer, and drives the cutscene's AdLib music (`.PRF` profile +
//! `.INS` patches + `.MID` file) through a pluggable OPL3 core.
//!
//! # Architecture
//!
//! ```text
//! bytes ──> poly-pol ──┐
//! bytes ──> poly-cmd ──┴─> Cutscene (immutable, shared)
//!                              │
//!                           Player
//!                          /       \
//!                        Vm         SynthDriver ──> dyn OplSynth ──> PCM
//!                         │              ▲
//!                      Renderer          │ poly-adlib (PRF/INS → OplPatch)
//!                         │
//!                      raster ──> 256x224 RGBA framebuffer
//! ```
//!
//! The host shell owns windowing, input, timing and the audio device;
//! the player only exposes frame stepping, a framebuffer and a PCM
//! render call. Everything is deterministic: given a cutscene and a
//! frame index, the framebuffer is a pure function of the pair.

pub mod assets;
pub mod cutscene;
pub mod error;
pub mod player;
pub mod raster;
pub mod renderer;
pub mod synth;
pub mod vm;

#[cfg(test)]
mod integration;
#[cfg(test)]
pub(crate) mod testdata;

pub use assets::{AssetSource, DirSource, prf_name_for};
pub use cutscene::Cutscene;
pub use error::PlayerError;
pub use player::{MidiState, Player, PlayerState};
pub use renderer::{
    FRAMEBUFFER_BYTES, SCREEN_HEIGHT, SCREEN_WIDTH, VIEWPORT_H, VIEWPORT_W, VIEWPORT_X, VIEWPORT_Y,
};
pub use synth::{ChannelInfo, OplSynth, SynthDriver, SynthError, SynthFactory, VolumeModel};
pub use vm::Vm;
