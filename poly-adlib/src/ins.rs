//! INS instrument patch parser
//!
//! The 80-byte AdLib patch layout:
//!
//! ```text
//! 0x00: mode (0 melodic, 1 percussion)
//! 0x01: voice/channel
//! 0x02: modulator operator, 13 x u16 LE
//! 0x1C: carrier operator, 13 x u16 LE
//! 0x36: padding
//! 0x4A: modulator wave select (low 3 bits)
//! 0x4C: carrier wave select (low 3 bits)
//! ```
//!
//! The wave selects live in the trailing bytes, not in the operator
//! words — reading them from the operator region yields a silently
//! wrong timbre.

use poly_common::ByteReader;

use crate::INS_SIZE;
use crate::error::AdlibError;

/// One FM operator of an AdLib patch
///
/// Field order matches the on-disk word order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsOperator {
    /// Key scaling level (0-3)
    pub key_scaling: u8,
    /// Frequency multiplier (0-15)
    pub freq_mult: u8,
    /// Feedback strength (0-7); only the modulator's value is used
    pub feedback: u8,
    /// Attack rate (0-15)
    pub attack: u8,
    /// Sustain level (0-15)
    pub sustain_level: u8,
    /// Hold the sustain level until key-off
    pub sustain_sound: bool,
    /// Decay rate (0-15)
    pub decay: u8,
    /// Release rate (0-15)
    pub release: u8,
    /// Output attenuation (0-63)
    pub output_level: u8,
    /// Amplitude modulation (tremolo)
    pub am: bool,
    /// Frequency vibrato
    pub vibrato: bool,
    /// Key scaling of envelope rates
    pub ksr: bool,
    /// Connection (false = FM, true = additive); only the modulator's
    /// value is used
    pub connection: bool,
}

impl InsOperator {
    fn parse(r: &mut ByteReader<'_>) -> Result<Self, AdlibError> {
        Ok(Self {
            key_scaling: (r.le_u16()? & 0x03) as u8,
            freq_mult: (r.le_u16()? & 0x0F) as u8,
            feedback: (r.le_u16()? & 0x07) as u8,
            attack: (r.le_u16()? & 0x0F) as u8,
            sustain_level: (r.le_u16()? & 0x0F) as u8,
            sustain_sound: r.le_u16()? & 1 != 0,
            decay: (r.le_u16()? & 0x0F) as u8,
            release: (r.le_u16()? & 0x0F) as u8,
            output_level: (r.le_u16()? & 0x3F) as u8,
            am: r.le_u16()? & 1 != 0,
            vibrato: r.le_u16()? & 1 != 0,
            ksr: r.le_u16()? & 1 != 0,
            connection: r.le_u16()? & 1 != 0,
        })
    }
}

/// A parsed instrument patch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsData {
    /// 0 melodic, 1 percussion
    pub mode: u8,
    /// Output voice; for percussion this selects the rhythm voice
    pub channel: u8,
    /// Modulator wave select (0-7)
    pub mod_wave: u8,
    /// Carrier wave select (0-7)
    pub car_wave: u8,
    pub modulator: InsOperator,
    pub carrier: InsOperator,
}

impl InsData {
    #[inline]
    pub fn is_percussion(&self) -> bool {
        self.mode == 1
    }
}

/// Parse an 80-byte INS instrument patch
///
/// # Returns
/// * `Ok(InsData)` - Parsed patch, fields masked to their widths
/// * `Err(AdlibError)` - Short file or invalid mode byte
pub fn parse_ins(data: &[u8]) -> Result<InsData, AdlibError> {
    if data.len() < INS_SIZE {
        return Err(AdlibError::InsTooSmall(data.len()));
    }
    let mut r = ByteReader::new(data);

    let mode = r.u8()?;
    if mode > 1 {
        return Err(AdlibError::BadMode(mode));
    }
    let channel = r.u8()?;
    let modulator = InsOperator::parse(&mut r)?;
    let carrier = InsOperator::parse(&mut r)?;

    Ok(InsData {
        mode,
        channel,
        mod_wave: r.u8_at(74)? & 0x07,
        car_wave: r.u8_at(76)? & 0x07,
        modulator,
        carrier,
    })
}
