//! Player: the orchestrator the host embeds
//!
//! Owns the VM/renderer pair and the synth driver, exposes transport
//! and frame stepping, and reports changes through owned callbacks. The
//! host drives the cadence (historically a 60 Hz clock divided by a
//! per-cutscene delay, ~12 Hz by default) — the player itself never
//! sleeps or waits.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::assets::{AssetSource, prf_name_for};
use crate::cutscene::Cutscene;
use crate::error::PlayerError;
use crate::renderer::FRAMEBUFFER_BYTES;
use crate::synth::{ChannelInfo, MIDI_CHANNELS, SynthDriver, SynthFactory, VolumeModel};
use crate::vm::Vm;

/// Visual playback state reported to `on_state_change`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerState {
    /// Loaded cutscene name, empty before the first load
    pub cutscene: String,
    pub current_frame: u32,
    pub total_frames: u32,
    pub playing: bool,
}

/// Audio state reported to `on_midi_state_change`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MidiState {
    pub playing: bool,
    /// Most recent audio problem, if any (visuals keep going)
    pub error: Option<String>,
}

type StateCallback = Box<dyn FnMut(&PlayerState)>;
type MidiCallback = Box<dyn FnMut(&MidiState)>;
type ChannelCallback = Box<dyn FnMut(&[ChannelInfo; MIDI_CHANNELS])>;

/// The cutscene player
pub struct Player {
    assets: Box<dyn AssetSource>,
    vm: Option<Vm>,
    cutscene: Option<Arc<Cutscene>>,
    driver: SynthDriver,
    playing: bool,
    audio_enabled: bool,
    on_state_change: Option<StateCallback>,
    on_midi_state_change: Option<MidiCallback>,
    on_channel_change: Option<ChannelCallback>,
}

impl Player {
    /// Build a player over an asset source and a synth factory
    ///
    /// The factory runs lazily, on the first audio use; a refusal only
    /// postpones sound.
    pub fn new(assets: Box<dyn AssetSource>, synth_factory: SynthFactory) -> Self {
        Self {
            assets,
            vm: None,
            cutscene: None,
            driver: SynthDriver::new(synth_factory),
            playing: false,
            audio_enabled: true,
            on_state_change: None,
            on_midi_state_change: None,
            on_channel_change: None,
        }
    }

    // -------------------------------------------------------------------------
    // Callbacks
    // -------------------------------------------------------------------------

    pub fn on_state_change(&mut self, cb: impl FnMut(&PlayerState) + 'static) {
        self.on_state_change = Some(Box::new(cb));
    }

    pub fn on_midi_state_change(&mut self, cb: impl FnMut(&MidiState) + 'static) {
        self.on_midi_state_change = Some(Box::new(cb));
    }

    pub fn on_channel_change(&mut self, cb: impl FnMut(&[ChannelInfo; MIDI_CHANNELS]) + 'static) {
        self.on_channel_change = Some(Box::new(cb));
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// Load a cutscene by name: `NAME.CMD` + `NAME.POL`, then its audio
    ///
    /// Visual errors fail the load and leave the previous cutscene
    /// untouched. Audio errors never fail the load; they surface through
    /// the MIDI-state callback.
    pub fn load(&mut self, name: &str) -> Result<(), PlayerError> {
        let upper = name.to_ascii_uppercase();
        let cmd = self.assets.load(&format!("{upper}.CMD"))?;
        let pol = self.assets.load(&format!("{upper}.POL"))?;
        let cutscene = Arc::new(Cutscene::from_bytes(&upper, &cmd, &pol)?);

        // Cancellation: silence and clear before the switch; commands of
        // an abandoned frame are simply dropped.
        self.driver.stop_and_reset();
        self.playing = false;

        let mut vm = Vm::new(cutscene.clone());
        vm.reset();
        self.vm = Some(vm);
        self.cutscene = Some(cutscene);

        if self.audio_enabled {
            self.load_audio(&upper);
        }

        self.emit_state();
        self.emit_channels();
        Ok(())
    }

    fn load_audio(&mut self, cutscene_name: &str) {
        let prf = prf_name_for(cutscene_name).to_string();
        match self.driver.load_for_cutscene(&prf, self.assets.as_ref()) {
            Ok(slot_errors) => {
                for e in &slot_errors {
                    warn!("audio: {e}");
                }
                let error = slot_errors.first().map(ToString::to_string);
                self.emit_midi(MidiState {
                    playing: self.driver.is_playing(),
                    error,
                });
            }
            Err(e) => {
                debug!("audio load failed, playing silent: {e}");
                self.emit_midi(MidiState {
                    playing: false,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    // -------------------------------------------------------------------------
    // Transport
    // -------------------------------------------------------------------------

    pub fn play(&mut self) {
        self.playing = true;
        if self.audio_enabled {
            if self.driver.pending_profile().is_some() {
                // The core may have become available since the last try
                if let Err(e) = self.driver.retry_pending(self.assets.as_ref()) {
                    self.emit_midi(MidiState {
                        playing: false,
                        error: Some(e.to_string()),
                    });
                }
            }
            self.driver.play();
        }
        self.emit_state();
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.driver.stop();
        self.emit_state();
    }

    /// Returns the new playing state
    pub fn toggle_play(&mut self) -> bool {
        if self.playing {
            self.stop();
        } else {
            self.play();
        }
        self.playing
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    // -------------------------------------------------------------------------
    // Frame stepping
    // -------------------------------------------------------------------------

    /// Advance one frame; returns false at the end
    pub fn next_frame(&mut self) -> bool {
        let Some(vm) = self.vm.as_mut() else {
            return false;
        };
        let advanced = vm.next_frame();
        if advanced {
            self.emit_state();
        }
        advanced
    }

    /// Step back one frame (reset-and-replay)
    pub fn prev_frame(&mut self) -> bool {
        let Some(vm) = self.vm.as_mut() else {
            return false;
        };
        let moved = vm.prev_frame();
        if moved {
            self.emit_state();
        }
        moved
    }

    /// Jump to an absolute frame (reset-and-replay)
    pub fn go_to_frame(&mut self, index: u32) {
        if let Some(vm) = self.vm.as_mut() {
            vm.go_to_frame(index);
            self.emit_state();
        }
    }

    /// Back to frame 0
    pub fn reset(&mut self) {
        if let Some(vm) = self.vm.as_mut() {
            vm.reset();
            self.emit_state();
        }
    }

    #[inline]
    pub fn current_frame(&self) -> u32 {
        self.vm.as_ref().map_or(0, Vm::current_frame)
    }

    #[inline]
    pub fn frame_count(&self) -> u32 {
        self.vm.as_ref().map_or(0, Vm::total_frames)
    }

    /// The 256x224 RGBA framebuffer of the current frame
    pub fn framebuffer(&self) -> &[u8] {
        static BLACK: [u8; FRAMEBUFFER_BYTES] = [0; FRAMEBUFFER_BYTES];
        self.vm
            .as_ref()
            .map_or(&BLACK[..], |vm| vm.renderer().framebuffer())
    }

    // -------------------------------------------------------------------------
    // Audio surface
    // -------------------------------------------------------------------------

    /// Enable or disable audio; enabling retries any pending profile
    pub fn set_audio_enabled(&mut self, enabled: bool) {
        self.audio_enabled = enabled;
        if !enabled {
            self.driver.stop_and_reset();
            return;
        }
        if let Some(name) = self.cutscene.as_ref().map(|c| c.name.clone()) {
            self.load_audio(&name);
            if self.playing {
                self.driver.play();
            }
        }
    }

    pub fn set_loop(&mut self, looping: bool) {
        self.driver.set_loop(looping);
    }

    pub fn set_volume_model(&mut self, n: u8) {
        self.driver.set_volume_model(VolumeModel::from_index(n));
    }

    pub fn get_channels(&self) -> [ChannelInfo; MIDI_CHANNELS] {
        self.driver.channels()
    }

    pub fn mute_channel(&mut self, channel: usize) {
        self.driver.mute_channel(channel);
        self.emit_channels();
    }

    pub fn unmute_channel(&mut self, channel: usize) {
        self.driver.unmute_channel(channel);
        self.emit_channels();
    }

    /// Hot-swap an instrument; a failure keeps the previous one and is
    /// reported on the MIDI-state callback
    pub fn set_channel_instrument(&mut self, channel: usize, name: &str) {
        let result = self
            .driver
            .set_channel_instrument(channel, name, self.assets.as_ref());
        match result {
            Ok(()) => self.emit_channels(),
            Err(e) => {
                warn!("instrument swap failed: {e}");
                self.emit_midi(MidiState {
                    playing: self.driver.is_playing(),
                    error: Some(e.to_string()),
                });
            }
        }
    }

    /// Nudge a channel's pitch by whole octaves
    pub fn set_channel_octave_offset(&mut self, channel: usize, delta: i8) {
        self.driver.set_channel_octave_offset(channel, delta);
        self.emit_channels();
    }

    /// Seek the music to an absolute time
    pub fn seek_audio(&mut self, seconds: f64) {
        self.driver.seek(seconds);
    }

    /// Fill an interleaved stereo PCM buffer from the synth
    pub fn render_samples(&mut self, out: &mut [i16]) {
        self.driver.render_samples(out);
    }

    /// Play a bare note for instrument auditioning
    pub fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        self.driver.note_on(channel, note, velocity);
    }

    pub fn note_off(&mut self, channel: u8, note: u8) {
        self.driver.note_off(channel, note);
    }

    // -------------------------------------------------------------------------
    // Notifications
    // -------------------------------------------------------------------------

    fn emit_state(&mut self) {
        if let Some(cb) = self.on_state_change.as_mut() {
            let state = PlayerState {
                cutscene: self
                    .cutscene
                    .as_ref()
                    .map(|c| c.name.clone())
                    .unwrap_or_default(),
                current_frame: self.vm.as_ref().map_or(0, Vm::current_frame),
                total_frames: self.vm.as_ref().map_or(0, Vm::total_frames),
                playing: self.playing,
            };
            cb(&state);
        }
    }

    fn emit_midi(&mut self, state: MidiState) {
        if let Some(cb) = self.on_midi_state_change.as_mut() {
            cb(&state);
        }
    }

    fn emit_channels(&mut self) {
        if let Some(cb) = self.on_channel_change.as_mut() {
            cb(&self.driver.channels());
        }
    }
}
