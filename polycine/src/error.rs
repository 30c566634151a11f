//! Player error taxonomy

use poly_adlib::AdlibError;
use poly_cmd::CmdError;
use poly_pol::PolError;
use thiserror::Error;

use crate::assets::AssetError;

/// Errors surfaced by the player
///
/// Format errors are recovered at the parser boundary: no partial
/// cutscene is ever installed. Audio errors never fail a visual load —
/// they travel through the MIDI-state callback instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    /// A requested asset does not exist
    #[error("asset not found: {0}")]
    AssetNotFound(String),

    /// The asset loader failed for a reason other than absence
    #[error("asset io error: {0}")]
    AssetIo(String),

    /// Malformed polygon data
    #[error("invalid POL data: {0}")]
    Pol(#[from] PolError),

    /// Malformed bytecode
    #[error("invalid CMD data: {0}")]
    Cmd(#[from] CmdError),

    /// Malformed audio profile or instrument patch
    #[error("invalid audio data: {0}")]
    Adlib(#[from] AdlibError),

    /// The OPL3 core refused to initialise (typically a host-side
    /// user-gesture requirement); the profile is remembered and retried
    #[error("audio unavailable: {0}")]
    AudioUnavailable(String),

    /// One instrument slot failed to load; music continues with that
    /// channel silent
    #[error("instrument load failed for slot {slot} ({name}): {reason}")]
    InstrumentLoadFailed {
        slot: usize,
        name: String,
        reason: String,
    },
}

impl From<AssetError> for PlayerError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::NotFound(name) => PlayerError::AssetNotFound(name),
            AssetError::Io(reason) => PlayerError::AssetIo(reason),
        }
    }
}
