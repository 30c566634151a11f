//! OPL3 synth seam and driver
//!
//! The FM core itself is pluggable: anything that can accept instrument
//! definitions, swallow a standard MIDI file and render interleaved PCM
//! implements [`OplSynth`]. The [`SynthDriver`] owns the core and the
//! cutscene-audio logic above it: profile loading, instrument fan-out,
//! channel mutes, hot-swaps and the retry contract for hosts where audio
//! cannot start until a user gesture.

mod driver;


pub use driver::SynthDriver;

use poly_adlib::OplPatch;
use thiserror::Error;

/// MIDI continuous controller number for channel volume
pub const MIDI_CC_VOLUME: u8 = 7;

/// MIDI channels / profile slots
pub const MIDI_CHANNELS: usize = 16;

/// Volume response models an OPL3 core can apply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum VolumeModel {
    /// Whatever the core considers idiomatic
    Auto = 0,
    /// Linear generic scaling
    Generic = 1,
    /// The chip's own logarithmic response (the cutscene default)
    #[default]
    NativeOpl3 = 2,
    /// DMX-style table
    Dmx = 3,
    /// Apogee sound system table
    Apogee = 4,
    /// Windows 9x driver table
    Win9x = 5,
}

impl VolumeModel {
    /// Map a raw index to a model; unknown values fall back to the
    /// chip-native response
    pub fn from_index(n: u8) -> Self {
        match n {
            0 => Self::Auto,
            1 => Self::Generic,
            3 => Self::Dmx,
            4 => Self::Apogee,
            5 => Self::Win9x,
            _ => Self::NativeOpl3,
        }
    }
}

/// Errors from the underlying synth core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthError {
    /// The core cannot start (typically awaiting a host user gesture)
    #[error("synth unavailable: {0}")]
    Unavailable(String),

    /// The core rejected the MIDI data
    #[error("invalid MIDI data: {0}")]
    InvalidMidi(String),
}

/// A pluggable OPL3 core
///
/// Implementations wrap an actual FM emulator + MIDI sequencer. The
/// driver configures the core once after construction (volume model,
/// deep vibrato/tremolo off) and re-applies that after every `reset`.
pub trait OplSynth {
    fn set_volume_model(&mut self, model: VolumeModel);
    fn set_deep_vibrato(&mut self, enabled: bool);
    fn set_deep_tremolo(&mut self, enabled: bool);

    /// Install an instrument definition for a bank slot
    fn set_instrument(&mut self, bank: u8, slot: u8, patch: &OplPatch);

    /// Hand over a standard MIDI file
    fn load_midi(&mut self, data: &[u8]) -> Result<(), SynthError>;

    fn play(&mut self);
    fn stop(&mut self);
    fn seek(&mut self, seconds: f64);
    fn position(&self) -> f64;
    fn duration(&self) -> f64;
    fn set_loop(&mut self, looping: bool);

    /// Realtime note access, used for test tones
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8);
    fn note_off(&mut self, channel: u8, note: u8);
    fn controller(&mut self, channel: u8, controller: u8, value: u8);

    /// Silence every voice immediately
    fn panic(&mut self);
    /// Return to the post-construction state
    fn reset(&mut self);

    /// Fill an interleaved stereo PCM buffer
    fn render(&mut self, out: &mut [i16]);
}

/// Factory for deferred core construction
///
/// Called lazily so hosts can refuse until an audio context is allowed;
/// a refusal is remembered and retried on the next opportunity.
pub type SynthFactory = Box<dyn FnMut() -> Result<Box<dyn OplSynth>, SynthError>>;

/// Per-channel audio state reported to the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelInfo {
    /// Profile slot / MIDI channel
    pub slot: usize,
    /// Instrument file name, if the slot is populated
    pub instrument: Option<String>,
    /// MIDI program number from the profile
    pub program: u16,
    /// Hardware output channel from the profile
    pub hw_channel: u8,
    /// Effective semitone offset (profile offset plus octave nudges)
    pub note_offset: i16,
    /// Velocity offset from the profile
    pub velocity_offset: i16,
    /// Profile loop flag
    pub looped: bool,
    /// Channel muted via CC7
    pub muted: bool,
}
