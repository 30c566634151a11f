//! Command data structures

use std::fmt;

/// One `handleKeys` branch: a key mask and the frame offset it jumps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyHandler {
    pub key_mask: u8,
    pub target: i16,
}

/// Placement of a `drawTextAtPos` string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPos {
    /// String resource id (12 bits)
    pub string_id: u16,
    /// Colour index (4 bits)
    pub color: u8,
    /// Screen x in pixels (stored as x/8 in the file)
    pub x: i16,
    /// Screen y in pixels (stored as y/8 in the file)
    pub y: i16,
}

/// A single decoded cutscene command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Frame boundary: present the accumulated frame, then clear per the
    /// clear-screen rule
    MarkCurPos,
    /// Set the clear-screen mode for subsequent draws
    RefreshScreen { clear_mode: u8 },
    /// Hold the presented frame for `frames` display frames
    WaitForSync { frames: u8 },
    /// Draw a shape; position is (0, 0) when the file carried none
    DrawShape { shape_id: u16, x: i16, y: i16 },
    /// Copy palette `palette_num` into one half of the runtime palette
    SetPalette { palette_num: u8, buffer_num: u8 },
    /// Draw subtitle text (stubbed; text rendering is external)
    DrawCaptionText { string_id: u16 },
    /// No operation
    Nop,
    /// Three bytes skipped by the original interpreter; preserved for
    /// byte-exact re-encoding
    Skip3 { skipped: [u8; 3] },
    /// Refresh and poll input (stubbed)
    RefreshAll,
    /// Draw a shape scaled about an origin; `zoom` is signed
    DrawShapeScale {
        shape_id: u16,
        x: i16,
        y: i16,
        zoom: i16,
        origin_x: u8,
        origin_y: u8,
    },
    /// Draw a shape scaled and rotated about an origin; only `rot_a` is
    /// applied, the other two angles are carried at their defaults
    DrawShapeScaleRotate {
        shape_id: u16,
        x: i16,
        y: i16,
        zoom: i16,
        origin_x: u8,
        origin_y: u8,
        rot_a: u16,
        rot_b: u16,
        rot_c: u16,
    },
    /// Copy between the original's screen buffers (stubbed)
    CopyScreen,
    /// Draw text at a position; `None` when the file carried the 0xFFFF
    /// "no text" marker
    DrawTextAtPos { text: Option<TextPos> },
    /// Input-driven branching (stubbed; playback auto-continues)
    HandleKeys { handlers: Vec<KeyHandler> },
}

impl Command {
    /// True for the frame-boundary command
    #[inline]
    pub fn is_frame_boundary(&self) -> bool {
        matches!(self, Command::MarkCurPos)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::MarkCurPos => write!(f, "markCurPos"),
            Command::RefreshScreen { clear_mode } => {
                write!(f, "refreshScreen clearMode={clear_mode}")
            }
            Command::WaitForSync { frames } => write!(f, "waitForSync frames={frames}"),
            Command::DrawShape { shape_id, x, y } => {
                write!(f, "drawShape id={shape_id} x={x} y={y}")
            }
            Command::SetPalette {
                palette_num,
                buffer_num,
            } => write!(f, "setPalette pal={palette_num} buf={buffer_num}"),
            Command::DrawCaptionText { string_id } => {
                write!(f, "drawCaptionText stringId={string_id}")
            }
            Command::Nop => write!(f, "nop"),
            Command::Skip3 { .. } => write!(f, "skip3"),
            Command::RefreshAll => write!(f, "refreshAll"),
            Command::DrawShapeScale {
                shape_id,
                x,
                y,
                zoom,
                origin_x,
                origin_y,
            } => write!(
                f,
                "drawShapeScale id={shape_id} x={x} y={y} zoom={zoom} origin=({origin_x},{origin_y})"
            ),
            Command::DrawShapeScaleRotate {
                shape_id,
                x,
                y,
                zoom,
                origin_x,
                origin_y,
                rot_a,
                rot_b,
                rot_c,
            } => write!(
                f,
                "drawShapeScaleRotate id={shape_id} x={x} y={y} zoom={zoom} \
                 origin=({origin_x},{origin_y}) rot=({rot_a},{rot_b},{rot_c})"
            ),
            Command::CopyScreen => write!(f, "copyScreen"),
            Command::DrawTextAtPos { text: None } => write!(f, "drawTextAtPos (none)"),
            Command::DrawTextAtPos { text: Some(t) } => write!(
                f,
                "drawTextAtPos stringId={} color={} x={} y={}",
                t.string_id, t.color, t.x, t.y
            ),
            Command::HandleKeys { handlers } => {
                write!(f, "handleKeys branches={}", handlers.len())
            }
        }
    }
}
