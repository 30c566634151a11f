//! PRF audio profile parser
//!
//! Fixed little-endian layout:
//!
//! ```text
//! 0x000: 16 x 30  instrument name strings (NUL-terminated)
//! 0x1E0: 16 x i16 note offsets (semitones)
//! 0x200: 16 x i16 velocity offsets
//! 0x220: u32     timer ticks
//! 0x224: u16     timer modulo
//! 0x226: 20      MIDI filename
//! 0x23A: u16     note-lookup flag
//! 0x23C: 16 x u16 MIDI program numbers
//! 0x2BC: 16 x u8  hardware channel numbers
//! 0x2DC: 16 x u8  loop flags
//! 0x2EC: u32     total duration in ticks
//! ```

use poly_common::{ByteReader, cstr};

use crate::error::AdlibError;
use crate::{PRF_MIN_SIZE, PRF_NAME_LEN, PRF_SLOTS};

/// A parsed audio profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrfData {
    /// Instrument file name per slot (`None` for empty slots)
    pub instruments: [Option<String>; PRF_SLOTS],
    /// Semitone offset per slot
    pub adlib_notes: [i16; PRF_SLOTS],
    /// Velocity offset per slot
    pub adlib_velocities: [i16; PRF_SLOTS],
    /// Timer rate in ticks
    pub timer_ticks: u32,
    /// Timer modulo
    pub timer_mod: u16,
    /// Name of the MIDI file this profile plays
    pub midi_filename: String,
    /// Note-lookup flag carried through from the file
    pub do_notes_lookup: u16,
    /// MIDI program number per slot
    pub adlib_programs: [u16; PRF_SLOTS],
    /// Output hardware channel per slot
    pub hw_channel_num: [u8; PRF_SLOTS],
    /// Loop flag per slot
    pub loop_flag: [u8; PRF_SLOTS],
    /// Total track duration in ticks
    pub total_duration_ticks: u32,
}

impl PrfData {
    /// Number of slots with an instrument assigned
    pub fn instrument_count(&self) -> usize {
        self.instruments.iter().filter(|i| i.is_some()).count()
    }
}

/// Parse a PRF audio profile
pub fn parse_prf(data: &[u8]) -> Result<PrfData, AdlibError> {
    if data.len() < PRF_MIN_SIZE {
        return Err(AdlibError::PrfTooSmall(data.len()));
    }
    let mut r = ByteReader::new(data);

    let mut instruments: [Option<String>; PRF_SLOTS] = Default::default();
    for slot in instruments.iter_mut() {
        let name = cstr(r.bytes(PRF_NAME_LEN)?);
        *slot = (!name.is_empty()).then_some(name);
    }

    let mut adlib_notes = [0i16; PRF_SLOTS];
    for v in adlib_notes.iter_mut() {
        *v = r.le_i16()?;
    }
    let mut adlib_velocities = [0i16; PRF_SLOTS];
    for v in adlib_velocities.iter_mut() {
        *v = r.le_i16()?;
    }

    let timer_ticks = r.le_u32()?;
    let timer_mod = r.le_u16()?;
    let midi_filename = cstr(r.bytes(20)?);
    let do_notes_lookup = r.le_u16()?;

    let mut adlib_programs = [0u16; PRF_SLOTS];
    for v in adlib_programs.iter_mut() {
        *v = r.le_u16()?;
    }

    r.seek(0x2BC)?;
    let mut hw_channel_num = [0u8; PRF_SLOTS];
    hw_channel_num.copy_from_slice(r.bytes(PRF_SLOTS)?);

    r.seek(0x2DC)?;
    let mut loop_flag = [0u8; PRF_SLOTS];
    loop_flag.copy_from_slice(r.bytes(PRF_SLOTS)?);

    r.seek(0x2EC)?;
    let total_duration_ticks = r.le_u32()?;

    Ok(PrfData {
        instruments,
        adlib_notes,
        adlib_velocities,
        timer_ticks,
        timer_mod,
        midi_filename,
        do_notes_lookup,
        adlib_programs,
        hw_channel_num,
        loop_flag,
        total_duration_ticks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a profile with two live slots
    pub(crate) fn build_prf() -> Vec<u8> {
        let mut d = vec![0u8; PRF_MIN_SIZE + 1];
        d[..5].copy_from_slice(b"PIANO");
        d[30..38].copy_from_slice(b"HARTBEAT");
        // slot 2 name left empty
        d[480..482].copy_from_slice(&(-12i16).to_le_bytes());
        d[482..484].copy_from_slice(&24i16.to_le_bytes());
        d[512..514].copy_from_slice(&(-10i16).to_le_bytes());
        d[544..548].copy_from_slice(&1193180u32.to_le_bytes());
        d[548..550].copy_from_slice(&19886u16.to_le_bytes());
        d[550..561].copy_from_slice(b"INTROL3.MID");
        d[570..572].copy_from_slice(&1u16.to_le_bytes());
        d[572..574].copy_from_slice(&42u16.to_le_bytes());
        d[574..576].copy_from_slice(&7u16.to_le_bytes());
        d[700] = 3;
        d[701] = 9;
        d[732] = 1;
        d[748..752].copy_from_slice(&123456u32.to_le_bytes());
        d
    }

    #[test]
    fn test_parse_slots() {
        let prf = parse_prf(&build_prf()).unwrap();
        assert_eq!(prf.instruments[0].as_deref(), Some("PIANO"));
        assert_eq!(prf.instruments[1].as_deref(), Some("HARTBEAT"));
        assert_eq!(prf.instruments[2], None);
        assert_eq!(prf.instrument_count(), 2);
    }

    #[test]
    fn test_parse_offsets_and_timers() {
        let prf = parse_prf(&build_prf()).unwrap();
        assert_eq!(prf.adlib_notes[0], -12);
        assert_eq!(prf.adlib_notes[1], 24);
        assert_eq!(prf.adlib_velocities[0], -10);
        assert_eq!(prf.timer_ticks, 1193180);
        assert_eq!(prf.timer_mod, 19886);
        assert_eq!(prf.midi_filename, "INTROL3.MID");
        assert_eq!(prf.do_notes_lookup, 1);
        assert_eq!(prf.adlib_programs[0], 42);
        assert_eq!(prf.adlib_programs[1], 7);
        assert_eq!(prf.hw_channel_num[0], 3);
        assert_eq!(prf.hw_channel_num[1], 9);
        assert_eq!(prf.loop_flag[0], 1);
        assert_eq!(prf.loop_flag[1], 0);
        assert_eq!(prf.total_duration_ticks, 123456);
    }

    #[test]
    fn test_too_small() {
        assert_eq!(
            parse_prf(&[0u8; 100]),
            Err(AdlibError::PrfTooSmall(100))
        );
    }
}
