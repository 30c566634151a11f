//! CMD file parser

use poly_common::ByteReader;

use crate::command::{Command, KeyHandler, TextPos};
use crate::error::CmdError;
use crate::{
    DEFAULT_ROT_B, DEFAULT_ROT_C, KEY_LIST_END, SHAPE_HAS_POS, SHAPE_HAS_ROT_B, SHAPE_HAS_ROT_C,
    SHAPE_HAS_ZOOM, SHAPE_ID_MASK, opcode,
};

/// One frame: the commands executed for a single observable image
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub commands: Vec<Command>,
}

/// A contiguous range of frames within the script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscene {
    pub id: u16,
    /// Start of the subscene's bytecode, relative to the script base
    pub offset: u16,
    pub frames: Vec<Frame>,
}

impl Subscene {
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// A fully parsed CMD script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    /// File offset at which subscene bytecode begins
    pub base_offset: usize,
    /// Whether the file carried an explicit subscene offset table
    pub has_offset_table: bool,
    pub subscenes: Vec<Subscene>,
}

impl Script {
    /// Total number of frames across all subscenes
    pub fn frame_count(&self) -> usize {
        self.subscenes.iter().map(Subscene::frame_count).sum()
    }

    /// Iterate all frames in playback order (subscenes in order)
    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.subscenes.iter().flat_map(|s| s.frames.iter())
    }
}

/// Parse a CMD file into subscenes, frames and commands
///
/// # Arguments
/// * `data` - Raw CMD file bytes
///
/// # Returns
/// * `Ok(Script)` - Parsed script
/// * `Err(CmdError)` - Bad opcode, unsupported rotation, or truncation
pub fn parse_cmd(data: &[u8]) -> Result<Script, CmdError> {
    let mut r = ByteReader::new(data);

    let sub_count = r.be_u16()?;
    let (offsets, base_offset, has_offset_table) = if sub_count == 0 {
        // One implicit subscene right after the count word
        (vec![0u16], 2usize, false)
    } else {
        let mut offsets = Vec::with_capacity(sub_count as usize);
        for _ in 0..sub_count {
            offsets.push(r.be_u16()?);
        }
        (offsets, (sub_count as usize + 1) * 2, true)
    };

    let mut subscenes = Vec::with_capacity(offsets.len());
    for (id, &offset) in offsets.iter().enumerate() {
        let frames = parse_subscene(&r, base_offset + offset as usize)?;
        subscenes.push(Subscene {
            id: id as u16,
            offset,
            frames,
        });
    }

    Ok(Script {
        base_offset,
        has_offset_table,
        subscenes,
    })
}

/// Parse one subscene's bytecode into frames
///
/// Commands accumulate into a frame until a `markCurPos`, which closes
/// the frame as its terminal command. The stream ends at a high-bit byte
/// or at end of file; a non-empty tail forms the final frame.
fn parse_subscene(r: &ByteReader<'_>, start: usize) -> Result<Vec<Frame>, CmdError> {
    let mut r = r.clone();
    r.seek(start)?;

    let mut frames = Vec::new();
    let mut current = Frame::default();

    while r.remaining() > 0 {
        let Some(cmd) = parse_command(&mut r)? else {
            break;
        };
        let boundary = cmd.is_frame_boundary();
        current.commands.push(cmd);
        if boundary {
            frames.push(std::mem::take(&mut current));
        }
    }
    if !current.commands.is_empty() {
        frames.push(current);
    }

    Ok(frames)
}

/// Parse one command; `None` signals the end-of-subscene marker
fn parse_command(r: &mut ByteReader<'_>) -> Result<Option<Command>, CmdError> {
    let start = r.pos();
    let byte = r.u8()?;
    if byte & 0x80 != 0 {
        return Ok(None);
    }

    let op = byte >> 2;
    let cmd = match op {
        opcode::MARK_CUR_POS | opcode::MARK_CUR_POS_2 => Command::MarkCurPos,
        opcode::REFRESH_SCREEN => Command::RefreshScreen {
            clear_mode: r.u8()?,
        },
        opcode::WAIT_FOR_SYNC => Command::WaitForSync { frames: r.u8()? },
        opcode::DRAW_SHAPE => {
            let (shape_id, x, y) = parse_shape_word(r)?;
            Command::DrawShape { shape_id, x, y }
        }
        opcode::SET_PALETTE => Command::SetPalette {
            palette_num: r.u8()?,
            buffer_num: r.u8()?,
        },
        opcode::DRAW_CAPTION_TEXT => Command::DrawCaptionText {
            string_id: r.be_u16()?,
        },
        opcode::NOP => Command::Nop,
        opcode::SKIP_3 => {
            let b = r.bytes(3)?;
            Command::Skip3 {
                skipped: [b[0], b[1], b[2]],
            }
        }
        opcode::REFRESH_ALL => Command::RefreshAll,
        opcode::DRAW_SHAPE_SCALE => {
            let (shape_id, x, y) = parse_shape_word(r)?;
            Command::DrawShapeScale {
                shape_id,
                x,
                y,
                // Signed: negative zoom shrinks. The original tooling read
                // this as unsigned, which explodes the scale factor.
                zoom: r.be_i16()?,
                origin_x: r.u8()?,
                origin_y: r.u8()?,
            }
        }
        opcode::DRAW_SHAPE_SCALE_ROT => parse_draw_shape_scale_rotate(r, start)?,
        opcode::COPY_SCREEN => Command::CopyScreen,
        opcode::DRAW_TEXT_AT_POS => {
            let word = r.be_u16()?;
            let text = if word == 0xFFFF {
                None
            } else {
                Some(TextPos {
                    string_id: word & 0x0FFF,
                    color: ((word >> 12) & 0xF) as u8,
                    x: r.i8()? as i16 * 8,
                    y: r.i8()? as i16 * 8,
                })
            };
            Command::DrawTextAtPos { text }
        }
        opcode::HANDLE_KEYS => {
            let mut handlers = Vec::new();
            loop {
                let key_mask = r.u8()?;
                if key_mask == KEY_LIST_END {
                    break;
                }
                handlers.push(KeyHandler {
                    key_mask,
                    target: r.be_i16()?,
                });
            }
            Command::HandleKeys { handlers }
        }
        _ => {
            return Err(CmdError::BadOpcode {
                opcode: op,
                offset: start,
            });
        }
    };
    Ok(Some(cmd))
}

/// Decode the shared shape word: low 11 bits id, 0x8000 means an
/// explicit position follows
fn parse_shape_word(r: &mut ByteReader<'_>) -> Result<(u16, i16, i16), CmdError> {
    let word = r.be_u16()?;
    let shape_id = word & SHAPE_ID_MASK;
    if word & SHAPE_HAS_POS != 0 {
        Ok((shape_id, r.be_i16()?, r.be_i16()?))
    } else {
        Ok((shape_id, 0, 0))
    }
}

fn parse_draw_shape_scale_rotate(
    r: &mut ByteReader<'_>,
    start: usize,
) -> Result<Command, CmdError> {
    let word = r.be_u16_at(r.pos())?;
    let (shape_id, x, y) = parse_shape_word(r)?;

    // Both secondary angles present selects the original's 3-D rotation
    // path, which no known cutscene exercises; refuse rather than
    // mis-render.
    if word & SHAPE_HAS_ROT_B != 0 && word & SHAPE_HAS_ROT_C != 0 {
        return Err(CmdError::UnsupportedRotation { offset: start });
    }

    let zoom = if word & SHAPE_HAS_ZOOM != 0 {
        r.be_i16()?
    } else {
        0
    };
    let origin_x = r.u8()?;
    let origin_y = r.u8()?;
    let rot_a = r.be_u16()?;
    let rot_b = if word & SHAPE_HAS_ROT_B != 0 {
        r.be_u16()?
    } else {
        DEFAULT_ROT_B
    };
    let rot_c = if word & SHAPE_HAS_ROT_C != 0 {
        r.be_u16()?
    } else {
        DEFAULT_ROT_C
    };

    Ok(Command::DrawShapeScaleRotate {
        shape_id,
        x,
        y,
        zoom,
        origin_x,
        origin_y,
        rot_a,
        rot_b,
        rot_c,
    })
}
