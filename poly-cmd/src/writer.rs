//! CMD re-encoder
//!
//! Re-emits a parsed [`Script`] in the canonical file encoding: opcodes
//! packed as `op << 2` with clear low bits, big-endian arguments, a
//! recomputed subscene offset table, and a `0x80` terminator per
//! subscene. Parsing the output yields the original script; for streams
//! that already use the canonical packing the bytes round-trip
//! identically up to the terminal byte.

use crate::command::Command;
use crate::parser::Script;
use crate::{
    DEFAULT_ROT_B, DEFAULT_ROT_C, KEY_LIST_END, SHAPE_HAS_POS, SHAPE_HAS_ROT_B, SHAPE_HAS_ROT_C,
    SHAPE_HAS_ZOOM, opcode,
};

/// End-of-subscene marker emitted by the writer
const SUBSCENE_END: u8 = 0x80;

/// Encode a whole script, header included
pub fn encode_script(script: &Script) -> Vec<u8> {
    let bodies: Vec<Vec<u8>> = script
        .subscenes
        .iter()
        .map(|sub| {
            let mut body = Vec::new();
            for frame in &sub.frames {
                for cmd in &frame.commands {
                    encode_command(cmd, &mut body);
                }
            }
            body.push(SUBSCENE_END);
            body
        })
        .collect();

    let mut out = Vec::new();
    if script.has_offset_table {
        out.extend_from_slice(&(script.subscenes.len() as u16).to_be_bytes());
        let mut offset = 0u16;
        for body in &bodies {
            out.extend_from_slice(&offset.to_be_bytes());
            offset += body.len() as u16;
        }
    } else {
        out.extend_from_slice(&0u16.to_be_bytes());
    }
    for body in &bodies {
        out.extend_from_slice(body);
    }
    out
}

/// Encode a single command onto `out`
pub fn encode_command(cmd: &Command, out: &mut Vec<u8>) {
    match cmd {
        Command::MarkCurPos => out.push(opcode::MARK_CUR_POS << 2),
        Command::RefreshScreen { clear_mode } => {
            out.push(opcode::REFRESH_SCREEN << 2);
            out.push(*clear_mode);
        }
        Command::WaitForSync { frames } => {
            out.push(opcode::WAIT_FOR_SYNC << 2);
            out.push(*frames);
        }
        Command::DrawShape { shape_id, x, y } => {
            out.push(opcode::DRAW_SHAPE << 2);
            push_shape_word(out, *shape_id, *x, *y, 0);
        }
        Command::SetPalette {
            palette_num,
            buffer_num,
        } => {
            out.push(opcode::SET_PALETTE << 2);
            out.push(*palette_num);
            out.push(*buffer_num);
        }
        Command::DrawCaptionText { string_id } => {
            out.push(opcode::DRAW_CAPTION_TEXT << 2);
            out.extend_from_slice(&string_id.to_be_bytes());
        }
        Command::Nop => out.push(opcode::NOP << 2),
        Command::Skip3 { skipped } => {
            out.push(opcode::SKIP_3 << 2);
            out.extend_from_slice(skipped);
        }
        Command::RefreshAll => out.push(opcode::REFRESH_ALL << 2),
        Command::DrawShapeScale {
            shape_id,
            x,
            y,
            zoom,
            origin_x,
            origin_y,
        } => {
            out.push(opcode::DRAW_SHAPE_SCALE << 2);
            push_shape_word(out, *shape_id, *x, *y, 0);
            out.extend_from_slice(&zoom.to_be_bytes());
            out.push(*origin_x);
            out.push(*origin_y);
        }
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
        } => {
            out.push(opcode::DRAW_SHAPE_SCALE_ROT << 2);
            let mut flags = 0u16;
            if *zoom != 0 {
                flags |= SHAPE_HAS_ZOOM;
            }
            if *rot_b != DEFAULT_ROT_B {
                flags |= SHAPE_HAS_ROT_B;
            }
            if *rot_c != DEFAULT_ROT_C {
                flags |= SHAPE_HAS_ROT_C;
            }
            push_shape_word(out, *shape_id, *x, *y, flags);
            if *zoom != 0 {
                out.extend_from_slice(&zoom.to_be_bytes());
            }
            out.push(*origin_x);
            out.push(*origin_y);
            out.extend_from_slice(&rot_a.to_be_bytes());
            if *rot_b != DEFAULT_ROT_B {
                out.extend_from_slice(&rot_b.to_be_bytes());
            }
            if *rot_c != DEFAULT_ROT_C {
                out.extend_from_slice(&rot_c.to_be_bytes());
            }
        }
        Command::CopyScreen => out.push(opcode::COPY_SCREEN << 2),
        Command::DrawTextAtPos { text } => {
            out.push(opcode::DRAW_TEXT_AT_POS << 2);
            match text {
                None => out.extend_from_slice(&0xFFFFu16.to_be_bytes()),
                Some(t) => {
                    let word = ((t.color as u16) << 12) | (t.string_id & 0x0FFF);
                    out.extend_from_slice(&word.to_be_bytes());
                    out.push((t.x / 8) as i8 as u8);
                    out.push((t.y / 8) as i8 as u8);
                }
            }
        }
        Command::HandleKeys { handlers } => {
            out.push(opcode::HANDLE_KEYS << 2);
            for h in handlers {
                out.push(h.key_mask);
                out.extend_from_slice(&h.target.to_be_bytes());
            }
            out.push(KEY_LIST_END);
        }
    }
}

fn push_shape_word(out: &mut Vec<u8>, shape_id: u16, x: i16, y: i16, extra_flags: u16) {
    if x != 0 || y != 0 {
        out.extend_from_slice(&(shape_id | SHAPE_HAS_POS | extra_flags).to_be_bytes());
        out.extend_from_slice(&x.to_be_bytes());
        out.extend_from_slice(&y.to_be_bytes());
    } else {
        out.extend_from_slice(&(shape_id | extra_flags).to_be_bytes());
    }
}
