//! Synth driver: profile loading and channel control over a pluggable core

use tracing::{debug, warn};

use poly_adlib::{InsData, OplPatch, parse_ins, parse_prf};

use crate::assets::AssetSource;
use crate::error::PlayerError;
use crate::synth::{
    ChannelInfo, MIDI_CC_VOLUME, MIDI_CHANNELS, OplSynth, SynthFactory, VolumeModel,
};

/// Book-keeping for one profile slot / MIDI channel
#[derive(Debug, Clone, Default)]
struct ChannelState {
    name: Option<String>,
    program: u16,
    hw_channel: u8,
    base_note: i16,
    velocity: i16,
    octave_delta: i8,
    looped: bool,
    muted: bool,
    /// Parsed patch kept for re-injection on octave nudges
    ins: Option<InsData>,
}

impl ChannelState {
    fn note_offset(&self) -> i16 {
        self.base_note + 12 * self.octave_delta as i16
    }
}

/// Owns the OPL3 core and everything cutscene-audio above it
pub struct SynthDriver {
    factory: SynthFactory,
    synth: Option<Box<dyn OplSynth>>,
    /// Profile to retry once the core becomes available
    pending_prf: Option<String>,
    channels: [ChannelState; MIDI_CHANNELS],
    volume_model: VolumeModel,
    looping: bool,
    playing: bool,
}

impl SynthDriver {
    pub fn new(factory: SynthFactory) -> Self {
        Self {
            factory,
            synth: None,
            pending_prf: None,
            channels: Default::default(),
            volume_model: VolumeModel::NativeOpl3,
            looping: false,
            playing: false,
        }
    }

    /// Construct and configure the core if it does not exist yet
    pub fn ensure_initialized(&mut self) -> Result<(), PlayerError> {
        if self.synth.is_some() {
            return Ok(());
        }
        let mut synth =
            (self.factory)().map_err(|e| PlayerError::AudioUnavailable(e.to_string()))?;
        configure(synth.as_mut(), self.volume_model);
        self.synth = Some(synth);
        Ok(())
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.synth.is_some()
    }

    /// Profile remembered from a failed load, if any
    #[inline]
    pub fn pending_profile(&self) -> Option<&str> {
        self.pending_prf.as_deref()
    }

    /// Stop playback and return the core to a clean state
    pub fn stop_and_reset(&mut self) {
        self.playing = false;
        if let Some(synth) = self.synth.as_mut() {
            synth.stop();
            synth.panic();
            synth.reset();
            configure(synth.as_mut(), self.volume_model);
        }
        self.channels = Default::default();
    }

    /// Load the audio side of a cutscene: profile, instruments, MIDI
    ///
    /// Hard failures (no core, missing/bad profile or MIDI) return an
    /// error; a bad or missing instrument only silences its slot, and
    /// every such slot is reported in the returned list so the host can
    /// surface it.
    pub fn load_for_cutscene(
        &mut self,
        prf_name: &str,
        assets: &dyn AssetSource,
    ) -> Result<Vec<PlayerError>, PlayerError> {
        if let Err(e) = self.ensure_initialized() {
            self.pending_prf = Some(prf_name.to_string());
            return Err(e);
        }
        self.pending_prf = None;
        self.stop_and_reset();

        let prf_file = format!("{}.PRF", prf_name.to_ascii_uppercase());
        let prf = parse_prf(&assets.load(&prf_file)?)?;

        let mut slot_errors = Vec::new();
        for slot in 0..MIDI_CHANNELS {
            let Some(name) = prf.instruments[slot].as_deref() else {
                continue;
            };
            match load_ins(name, assets) {
                Ok(ins) => {
                    let state = &mut self.channels[slot];
                    state.name = Some(name.to_string());
                    state.program = prf.adlib_programs[slot];
                    state.hw_channel = prf.hw_channel_num[slot];
                    state.base_note = prf.adlib_notes[slot];
                    state.velocity = prf.adlib_velocities[slot];
                    state.looped = prf.loop_flag[slot] != 0;
                    state.ins = Some(ins);
                    self.inject(slot);
                }
                Err(e) => {
                    warn!("slot {slot}: instrument {name} skipped: {e}");
                    slot_errors.push(PlayerError::InstrumentLoadFailed {
                        slot,
                        name: name.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let midi_file = prf.midi_filename.to_ascii_uppercase();
        let midi = assets.load(&midi_file)?;
        let Some(synth) = self.synth.as_mut() else {
            return Ok(slot_errors);
        };
        synth
            .load_midi(&midi)
            .map_err(|e| PlayerError::AudioUnavailable(e.to_string()))?;
        synth.set_loop(self.looping);
        debug!(
            "loaded profile {prf_name}: {} instruments, midi {midi_file}",
            prf.instrument_count()
        );
        Ok(slot_errors)
    }

    /// Retry the profile remembered from a failed load
    pub fn retry_pending(
        &mut self,
        assets: &dyn AssetSource,
    ) -> Result<Vec<PlayerError>, PlayerError> {
        match self.pending_prf.take() {
            Some(prf) => self.load_for_cutscene(&prf, assets),
            None => Ok(Vec::new()),
        }
    }

    /// Translate and push one channel's patch into the core
    fn inject(&mut self, slot: usize) {
        let state = &self.channels[slot];
        let (Some(ins), Some(synth)) = (state.ins.as_ref(), self.synth.as_mut()) else {
            return;
        };
        let patch = OplPatch::from_ins(ins, state.note_offset(), state.velocity);
        synth.set_instrument(0, slot as u8, &patch);
    }

    pub fn play(&mut self) {
        self.playing = true;
        if let Some(synth) = self.synth.as_mut() {
            synth.play();
        }
    }

    pub fn stop(&mut self) {
        self.playing = false;
        if let Some(synth) = self.synth.as_mut() {
            synth.stop();
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn seek(&mut self, seconds: f64) {
        if let Some(synth) = self.synth.as_mut() {
            synth.seek(seconds);
        }
    }

    pub fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
        if let Some(synth) = self.synth.as_mut() {
            synth.set_loop(looping);
        }
    }

    pub fn set_volume_model(&mut self, model: VolumeModel) {
        self.volume_model = model;
        if let Some(synth) = self.synth.as_mut() {
            synth.set_volume_model(model);
        }
    }

    /// Silence a channel with CC7 = 0
    pub fn mute_channel(&mut self, channel: usize) {
        if channel >= MIDI_CHANNELS {
            return;
        }
        self.channels[channel].muted = true;
        if let Some(synth) = self.synth.as_mut() {
            synth.controller(channel as u8, MIDI_CC_VOLUME, 0);
        }
    }

    /// Restore a channel with CC7 = 127
    pub fn unmute_channel(&mut self, channel: usize) {
        if channel >= MIDI_CHANNELS {
            return;
        }
        self.channels[channel].muted = false;
        if let Some(synth) = self.synth.as_mut() {
            synth.controller(channel as u8, MIDI_CC_VOLUME, 127);
        }
    }

    /// Hot-swap one channel's instrument; a failed load leaves the
    /// previous instrument in place
    pub fn set_channel_instrument(
        &mut self,
        channel: usize,
        name: &str,
        assets: &dyn AssetSource,
    ) -> Result<(), PlayerError> {
        if channel >= MIDI_CHANNELS {
            return Ok(());
        }
        let ins = load_ins(name, assets).map_err(|e| PlayerError::InstrumentLoadFailed {
            slot: channel,
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        let state = &mut self.channels[channel];
        state.name = Some(name.to_string());
        state.ins = Some(ins);
        self.inject(channel);
        Ok(())
    }

    /// Nudge a channel by whole octaves and re-inject its patch
    pub fn set_channel_octave_offset(&mut self, channel: usize, delta: i8) {
        if channel >= MIDI_CHANNELS {
            return;
        }
        self.channels[channel].octave_delta = delta;
        self.inject(channel);
    }

    /// Test-tone pass-through
    pub fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        if let Some(synth) = self.synth.as_mut() {
            synth.note_on(channel, note, velocity);
        }
    }

    pub fn note_off(&mut self, channel: u8, note: u8) {
        if let Some(synth) = self.synth.as_mut() {
            synth.note_off(channel, note);
        }
    }

    /// Fill an interleaved stereo buffer; silence without a core
    pub fn render_samples(&mut self, out: &mut [i16]) {
        match self.synth.as_mut() {
            Some(synth) if self.playing => synth.render(out),
            _ => out.fill(0),
        }
    }

    /// Snapshot of all sixteen channels
    pub fn channels(&self) -> [ChannelInfo; MIDI_CHANNELS] {
        std::array::from_fn(|slot| {
            let state = &self.channels[slot];
            ChannelInfo {
                slot,
                instrument: state.name.clone(),
                program: state.program,
                hw_channel: state.hw_channel,
                note_offset: state.note_offset(),
                velocity_offset: state.velocity,
                looped: state.looped,
                muted: state.muted,
            }
        })
    }
}

/// Apply the cutscene-standard core configuration
fn configure(synth: &mut dyn OplSynth, model: VolumeModel) {
    synth.set_volume_model(model);
    synth.set_deep_vibrato(false);
    synth.set_deep_tremolo(false);
}

/// Fetch and parse an instrument, trying the trailing-letter fallback
///
/// Some profiles name variant patches with a trailing "a" that is not
/// present on disk; stripping it recovers the base instrument.
fn load_ins(name: &str, assets: &dyn AssetSource) -> Result<InsData, PlayerError> {
    let upper = name.to_ascii_uppercase();
    let bytes = match assets.load(&format!("{upper}.INS")) {
        Ok(bytes) => bytes,
        Err(crate::assets::AssetError::NotFound(_)) if upper.ends_with('A') && upper.len() > 1 => {
            assets.load(&format!("{}.INS", &upper[..upper.len() - 1]))?
        }
        Err(e) => return Err(e.into()),
    };
    Ok(parse_ins(&bytes)?)
}
