//! OPL3 patch model and AdLib translation
//!
//! An [`OplPatch`] is what the pluggable OPL3 core is fed with: two
//! operators in the YMF262 register model, connection/feedback, the
//! per-slot note and velocity offsets from the profile, and a rhythm
//! voice for percussion patches. [`OplPatch::from_ins`] performs the
//! legacy-patch translation.

use crate::ins::{InsData, InsOperator};

/// One operator in the YMF262 register model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OplOperator {
    /// Amplitude modulation (tremolo)
    pub am: bool,
    /// Frequency vibrato
    pub vibrato: bool,
    /// Sustaining envelope (EG-TYP)
    pub sustaining: bool,
    /// Envelope key scaling
    pub ksr: bool,
    /// Frequency multiplier (0-15)
    pub freq_mult: u8,
    /// Key scale level (0-3)
    pub key_scale_level: u8,
    /// Total level attenuation (0-63)
    pub total_level: u8,
    /// Attack rate (0-15)
    pub attack: u8,
    /// Decay rate (0-15)
    pub decay: u8,
    /// Sustain level (0-15)
    pub sustain: u8,
    /// Release rate (0-15)
    pub release: u8,
    /// Wave select (0-7)
    pub waveform: u8,
}

impl OplOperator {
    /// Translate an AdLib operator; the wave select travels separately
    /// in the INS file
    pub fn from_ins(op: &InsOperator, waveform: u8) -> Self {
        Self {
            am: op.am,
            vibrato: op.vibrato,
            sustaining: op.sustain_sound,
            ksr: op.ksr,
            freq_mult: op.freq_mult & 0x0F,
            key_scale_level: op.key_scaling & 0x03,
            total_level: op.output_level & 0x3F,
            attack: op.attack & 0x0F,
            decay: op.decay & 0x0F,
            sustain: op.sustain_level & 0x0F,
            release: op.release & 0x0F,
            waveform: waveform & 0x07,
        }
    }

    /// AM/VIB/EG/KSR/MULT register byte (0x20 family)
    pub fn reg20(&self) -> u8 {
        (self.am as u8) << 7
            | (self.vibrato as u8) << 6
            | (self.sustaining as u8) << 5
            | (self.ksr as u8) << 4
            | self.freq_mult
    }

    /// KSL/TL register byte (0x40 family)
    pub fn reg40(&self) -> u8 {
        self.key_scale_level << 6 | self.total_level
    }

    /// AR/DR register byte (0x60 family)
    pub fn reg60(&self) -> u8 {
        self.attack << 4 | self.decay
    }

    /// SL/RR register byte (0x80 family)
    pub fn reg80(&self) -> u8 {
        self.sustain << 4 | self.release
    }

    /// Wave-select register byte (0xE0 family)
    pub fn reg_e0(&self) -> u8 {
        self.waveform
    }
}

/// A complete two-operator OPL3 instrument
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OplPatch {
    pub modulator: OplOperator,
    pub carrier: OplOperator,
    /// Modulator feedback strength (0-7)
    pub feedback: u8,
    /// false = FM (modulator drives carrier), true = additive
    pub additive: bool,
    /// Semitone offset applied to every note
    pub note_offset: i16,
    /// Velocity offset applied to every note
    pub velocity_offset: i16,
    /// 0 melodic; 1-5 selects the OPL rhythm voice
    pub rhythm_mode: u8,
}

impl OplPatch {
    /// Translate a parsed INS patch with its profile slot offsets
    ///
    /// The note offset is folded (see [`fold_note_offset`]) so a
    /// conformant OPL3 core is never asked for a block the original
    /// hardware's 3-bit register would have wrapped.
    pub fn from_ins(ins: &InsData, note_offset: i16, velocity_offset: i16) -> Self {
        Self {
            modulator: OplOperator::from_ins(&ins.modulator, ins.mod_wave),
            carrier: OplOperator::from_ins(&ins.carrier, ins.car_wave),
            feedback: ins.modulator.feedback & 0x07,
            additive: ins.modulator.connection,
            note_offset: fold_note_offset(note_offset),
            velocity_offset,
            rhythm_mode: if ins.is_percussion() {
                // OPL rhythm voices occupy channels 6-10
                (ins.channel.saturating_sub(5)).clamp(1, 5)
            } else {
                0
            },
        }
    }

    /// FB/CNT register byte (0xC0 family, pan bits left to the core)
    pub fn reg_c0(&self) -> u8 {
        self.feedback << 1 | self.additive as u8
    }
}

/// Fold a semitone offset below the OPL block-register limit
///
/// The block (octave) field of the YMF262 is three bits wide; the
/// original hardware wrapped octaves >= 8 back around silently, and the
/// original profiles rely on that. A modern core clamps instead, so the
/// offset is reduced by a full 8 octaves (96 semitones) for each wrap a
/// reference A-4 note would incur.
pub fn fold_note_offset(offset: i16) -> i16 {
    const REFERENCE_NOTE: i16 = 57; // A-4
    let octave = (REFERENCE_NOTE + offset) / 12 - 1;
    if octave >= 8 {
        offset - 96 * (octave / 8)
    } else {
        offset
    }
}
