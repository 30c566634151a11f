//! Bytecode interpreter
//!
//! Executes the script against the renderer one frame at a time. A
//! frame's terminal `markCurPos` *presents* — rasterizes the accumulated
//! draw list into the framebuffer — and then clears the list per the
//! clear-screen rule, which is the original's accumulate-then-present
//! cadence.
//!
//! Scrubbing never reverse-executes: a frame's output depends on every
//! prior palette write, background draw and clear-screen transition, so
//! `go_to_frame` resets the runtime state and replays from the start.
//! Intermediate frames skip the rasterization (only the last present is
//! observable); the list bookkeeping still runs for every frame.

use std::sync::Arc;

use tracing::{debug, warn};

use poly_cmd::Command;
use poly_pol::Color;

use crate::cutscene::Cutscene;
use crate::renderer::Renderer;

/// Runtime palette size: two 16-colour halves
pub const PALETTE_SLOTS: usize = 32;

/// The cutscene virtual machine
pub struct Vm {
    cutscene: Arc<Cutscene>,
    renderer: Renderer,
    /// Flat frame index: (subscene, frame within subscene)
    frame_index: Vec<(usize, usize)>,
    current_subscene: usize,
    current_frame: u32,
    total_frames: u32,
    palette_buffer: [Color; PALETTE_SLOTS],
    clear_screen: u8,
    /// When false, presents skip the rasterization (scrub replay)
    presenting: bool,
}

impl Vm {
    /// Install a cutscene; the first frame is not executed until
    /// [`reset`](Self::reset) or a step
    pub fn new(cutscene: Arc<Cutscene>) -> Self {
        let mut frame_index = Vec::with_capacity(cutscene.frame_count());
        for (s, sub) in cutscene.script.subscenes.iter().enumerate() {
            for f in 0..sub.frames.len() {
                frame_index.push((s, f));
            }
        }
        let total_frames = frame_index.len() as u32;

        let mut renderer = Renderer::new();
        renderer.load_shapes(cutscene.clone());

        let mut vm = Self {
            cutscene,
            renderer,
            frame_index,
            current_subscene: 0,
            current_frame: 0,
            total_frames,
            palette_buffer: [Color::BLACK; PALETTE_SLOTS],
            clear_screen: 1,
            presenting: true,
        };
        vm.reset_runtime_state();
        vm
    }

    #[inline]
    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    #[inline]
    pub fn current_subscene(&self) -> usize {
        self.current_subscene
    }

    #[inline]
    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    #[inline]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    #[inline]
    pub fn palette_buffer(&self) -> &[Color; PALETTE_SLOTS] {
        &self.palette_buffer
    }

    /// Rebuild to frame 0
    pub fn reset(&mut self) {
        self.go_to_frame(0);
    }

    /// Execute the next frame's commands and advance
    ///
    /// Returns false at the last frame.
    pub fn next_frame(&mut self) -> bool {
        if self.current_frame + 1 >= self.total_frames {
            return false;
        }
        let next = self.current_frame + 1;
        self.exec_frame(next, true);
        self.current_frame = next;
        true
    }

    /// Rebuild to the frame before the current one
    pub fn prev_frame(&mut self) -> bool {
        if self.current_frame == 0 {
            return false;
        }
        self.go_to_frame(self.current_frame - 1);
        true
    }

    /// Reset and replay frames `0..=index`
    ///
    /// An out-of-range index is a programmer error: it trips a debug
    /// assertion and clamps to the last frame in release.
    pub fn go_to_frame(&mut self, index: u32) {
        if self.total_frames == 0 {
            return;
        }
        debug_assert!(index < self.total_frames, "frame {index} out of range");
        let index = index.min(self.total_frames - 1);

        self.reset_runtime_state();
        for i in 0..=index {
            self.exec_frame(i, i == index);
        }
        self.current_frame = index;
    }

    fn reset_runtime_state(&mut self) {
        self.palette_buffer = [Color::BLACK; PALETTE_SLOTS];
        self.clear_screen = 1;
        self.current_subscene = 0;
        self.renderer.set_palette(&self.palette_buffer);
        self.renderer.set_clear_screen(1);
        self.renderer.clear_all_shapes();
    }

    /// Run one frame's commands; presents at the frame boundary, or at
    /// end of frame when the terminator is implicit
    fn exec_frame(&mut self, index: u32, present: bool) {
        self.presenting = present;
        let cutscene = self.cutscene.clone();
        let (s, f) = self.frame_index[index as usize];
        let frame = &cutscene.script.subscenes[s].frames[f];
        self.current_subscene = s;

        let mut presented = false;
        for cmd in &frame.commands {
            presented |= cmd.is_frame_boundary();
            self.execute(cmd);
        }
        if !presented {
            self.present();
        }
        self.presenting = true;
    }

    fn present(&mut self) {
        if self.presenting {
            self.renderer.render();
        }
    }

    /// Execute a single command
    ///
    /// Timing, text and input commands are deliberate no-ops: sync is
    /// the host's job and text/choice rendering is external.
    fn execute(&mut self, cmd: &Command) {
        match cmd {
            Command::MarkCurPos => {
                self.present();
                self.renderer.clear_drawn_shapes();
            }
            Command::RefreshScreen { clear_mode } => {
                self.clear_screen = *clear_mode;
                self.renderer.set_clear_screen(*clear_mode);
                if *clear_mode != 0 {
                    self.renderer.clear_drawn_shapes();
                }
            }
            Command::DrawShape { shape_id, x, y } => {
                self.renderer.draw_shape(*shape_id, *x, *y);
            }
            Command::DrawShapeScale {
                shape_id,
                x,
                y,
                zoom,
                origin_x,
                origin_y,
            } => {
                self.renderer
                    .draw_shape_scale(*shape_id, *x, *y, *zoom, *origin_x, *origin_y);
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
                self.renderer.draw_shape_scale_rotate(
                    *shape_id,
                    *x,
                    *y,
                    *zoom,
                    (*origin_x, *origin_y),
                    *rot_a,
                    *rot_b,
                    *rot_c,
                );
            }
            Command::SetPalette {
                palette_num,
                buffer_num,
            } => self.set_palette(*palette_num, *buffer_num),
            Command::WaitForSync { .. }
            | Command::CopyScreen
            | Command::RefreshAll
            | Command::Nop
            | Command::Skip3 { .. }
            | Command::DrawCaptionText { .. }
            | Command::DrawTextAtPos { .. }
            | Command::HandleKeys { .. } => {
                debug!("no-op command: {cmd}");
            }
        }
    }

    /// Copy a source palette into one half of the runtime palette
    ///
    /// The destination slot is the buffer number XOR 1: buffer 0 writes
    /// the upper half (slots 16-31), buffer 1 the lower (0-15).
    fn set_palette(&mut self, palette_num: u8, buffer_num: u8) {
        let Some(palette) = self.cutscene.palettes.get(palette_num as usize) else {
            warn!("setPalette references missing palette {palette_num}");
            return;
        };
        let dest = ((buffer_num ^ 1) & 1) as usize * 16;
        self.palette_buffer[dest..dest + 16].copy_from_slice(palette.colors());
        self.renderer.set_palette(&self.palette_buffer);
    }
}
