//! Framebuffer renderer
//!
//! Owns the 256x224 RGBA framebuffer, the 32-entry runtime palette, the
//! clear-screen flag and the two draw lists. Shapes are not rasterized
//! when a draw command executes — they are appended to the draw list and
//! the whole list is re-rasterized from scratch on every [`render`].
//!
//! The auxiliary list models the original's background page: draws made
//! while the clear-screen flag is set accumulate there, and a frame
//! clear with the flag unset restores the draw list from it instead of
//! emptying it.
//!
//! [`render`]: Renderer::render

use std::sync::Arc;

use glam::Vec2;
use tracing::warn;

use poly_pol::{Color, PrimitiveKind};

use crate::cutscene::Cutscene;
use crate::raster::{ClipRect, Raster};

/// Framebuffer width in pixels
pub const SCREEN_WIDTH: usize = 256;

/// Framebuffer height in pixels
pub const SCREEN_HEIGHT: usize = 224;

/// Bytes in the RGBA framebuffer
pub const FRAMEBUFFER_BYTES: usize = SCREEN_WIDTH * SCREEN_HEIGHT * 4;

/// Cutscene viewport placement within the framebuffer
pub const VIEWPORT_X: i32 = 8;
pub const VIEWPORT_Y: i32 = 50;
pub const VIEWPORT_W: i32 = 240;
pub const VIEWPORT_H: i32 = 128;

/// Zoom divisor: scale = (zoom + 512) / 512
const ZOOM_UNIT: f32 = 512.0;

/// One recorded draw; a value object, never mutated after push
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawnShape {
    pub shape_id: u16,
    pub x: i16,
    pub y: i16,
    pub scale: f32,
    pub rotation_rad: f32,
    pub origin: (i32, i32),
    /// Clear-screen flag captured at draw time; selects the palette half
    pub clear_flag_at_draw: u8,
}

/// The renderer: framebuffer + palette + draw lists
pub struct Renderer {
    framebuffer: Vec<u8>,
    palette: [Color; 32],
    clear_screen: u8,
    cutscene: Option<Arc<Cutscene>>,
    draw_list: Vec<DrawnShape>,
    aux_list: Vec<DrawnShape>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            framebuffer: vec![0u8; FRAMEBUFFER_BYTES],
            palette: [Color::BLACK; 32],
            clear_screen: 1,
            cutscene: None,
            draw_list: Vec::new(),
            aux_list: Vec::new(),
        }
    }

    /// Replace the current shape set
    pub fn load_shapes(&mut self, cutscene: Arc<Cutscene>) {
        self.cutscene = Some(cutscene);
    }

    /// Adopt a 32-entry palette for subsequent colour lookups
    pub fn set_palette(&mut self, palette: &[Color; 32]) {
        self.palette = *palette;
    }

    pub fn set_clear_screen(&mut self, flag: u8) {
        self.clear_screen = flag;
    }

    #[inline]
    pub fn clear_screen(&self) -> u8 {
        self.clear_screen
    }

    /// The RGBA framebuffer, repainted by [`render`](Self::render)
    #[inline]
    pub fn framebuffer(&self) -> &[u8] {
        &self.framebuffer
    }

    #[inline]
    pub fn drawn_shapes(&self) -> &[DrawnShape] {
        &self.draw_list
    }

    pub fn draw_shape(&mut self, shape_id: u16, x: i16, y: i16) {
        self.push(DrawnShape {
            shape_id,
            x,
            y,
            scale: 1.0,
            rotation_rad: 0.0,
            origin: (0, 0),
            clear_flag_at_draw: self.clear_screen,
        });
    }

    pub fn draw_shape_scale(
        &mut self,
        shape_id: u16,
        x: i16,
        y: i16,
        zoom: i16,
        origin_x: u8,
        origin_y: u8,
    ) {
        self.push(DrawnShape {
            shape_id,
            x,
            y,
            scale: zoom_to_scale(zoom),
            rotation_rad: 0.0,
            origin: (origin_x as i32, origin_y as i32),
            clear_flag_at_draw: self.clear_screen,
        });
    }

    /// Only the first angle rotates; the other two belong to the
    /// original's unused 3-D path and are ignored here.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_shape_scale_rotate(
        &mut self,
        shape_id: u16,
        x: i16,
        y: i16,
        zoom: i16,
        origin: (u8, u8),
        rot_a: u16,
        _rot_b: u16,
        _rot_c: u16,
    ) {
        self.push(DrawnShape {
            shape_id,
            x,
            y,
            scale: zoom_to_scale(zoom),
            rotation_rad: (rot_a as f32).to_radians(),
            origin: (origin.0 as i32, origin.1 as i32),
            clear_flag_at_draw: self.clear_screen,
        });
    }

    fn push(&mut self, shape: DrawnShape) {
        if self.clear_screen != 0 {
            // Background accumulates while the flag is set
            self.aux_list.push(shape);
        }
        self.draw_list.push(shape);
    }

    /// Frame clear: keep the background when the flag is unset,
    /// otherwise drop everything
    pub fn clear_drawn_shapes(&mut self) {
        if self.clear_screen == 0 {
            self.draw_list.clone_from(&self.aux_list);
        } else {
            self.draw_list.clear();
            self.aux_list.clear();
        }
    }

    /// Drop both lists unconditionally (cutscene switch)
    pub fn clear_all_shapes(&mut self) {
        self.draw_list.clear();
        self.aux_list.clear();
    }

    /// Repaint the framebuffer from the draw list
    pub fn render(&mut self) {
        // Opaque black base
        for px in self.framebuffer.chunks_exact_mut(4) {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            px[3] = 0xFF;
        }

        let Some(cutscene) = self.cutscene.clone() else {
            return;
        };

        let clip = ClipRect::new(0, 0, SCREEN_WIDTH as i32, SCREEN_HEIGHT as i32);
        let mut raster = Raster::new(&mut self.framebuffer, SCREEN_WIDTH, SCREEN_HEIGHT, clip);

        for drawn in &self.draw_list {
            let Some(shape) = cutscene.shape(drawn.shape_id) else {
                warn!("draw list references missing shape {}", drawn.shape_id);
                continue;
            };
            for prim in &shape.primitives {
                let color = self.palette[palette_index(prim.color_index, drawn.clear_flag_at_draw)];
                let map = |vx: i16, vy: i16| transform_vertex(drawn, prim.offset, vx, vy);
                match &prim.kind {
                    PrimitiveKind::Point { x, y } => {
                        let (px, py) = map(*x, *y);
                        raster.draw_point(color, px, py);
                    }
                    PrimitiveKind::Ellipse { cx, cy, rx, ry } => {
                        let (px, py) = map(*cx, *cy);
                        let rx = (*rx as f32 * drawn.scale).round() as i32;
                        let ry = (*ry as f32 * drawn.scale).round() as i32;
                        raster.draw_ellipse(color, prim.alpha, px, py, rx, ry);
                    }
                    PrimitiveKind::Polygon { vertices } => {
                        let mapped: Vec<(i32, i32)> =
                            vertices.iter().map(|&(vx, vy)| map(vx, vy)).collect();
                        raster.draw_polygon(color, prim.alpha, &mapped);
                    }
                }
            }
        }

        self.paint_letterbox();
    }

    /// Black out the four bars around the cutscene viewport
    fn paint_letterbox(&mut self) {
        let bars = [
            (0, 0, SCREEN_WIDTH as i32, VIEWPORT_Y),
            (
                0,
                VIEWPORT_Y + VIEWPORT_H,
                SCREEN_WIDTH as i32,
                SCREEN_HEIGHT as i32 - VIEWPORT_Y - VIEWPORT_H,
            ),
            (0, VIEWPORT_Y, VIEWPORT_X, VIEWPORT_H),
            (
                VIEWPORT_X + VIEWPORT_W,
                VIEWPORT_Y,
                SCREEN_WIDTH as i32 - VIEWPORT_X - VIEWPORT_W,
                VIEWPORT_H,
            ),
        ];
        for (bx, by, bw, bh) in bars {
            for y in by..by + bh {
                let row = y as usize * SCREEN_WIDTH;
                for x in bx..bx + bw {
                    let i = (row + x as usize) * 4;
                    self.framebuffer[i] = 0;
                    self.framebuffer[i + 1] = 0;
                    self.framebuffer[i + 2] = 0;
                    self.framebuffer[i + 3] = 0xFF;
                }
            }
        }
    }
}

/// Signed zoom to scale factor: 0 is 1x, -256 is 0.5x
#[inline]
fn zoom_to_scale(zoom: i16) -> f32 {
    (zoom as f32 + ZOOM_UNIT) / ZOOM_UNIT
}

/// Palette slot for a primitive: 5-bit colour index plus the upper half
/// when the shape was drawn with the clear flag unset
#[inline]
fn palette_index(color_index: u8, clear_flag: u8) -> usize {
    (((color_index & 0x1F) as usize) + if clear_flag == 0 { 16 } else { 0 }) % 32
}

/// Shape-local vertex to screen: offset, scale about origin, rotate
/// about origin, then translate into the viewport
fn transform_vertex(drawn: &DrawnShape, offset: (i16, i16), vx: i16, vy: i16) -> (i32, i32) {
    let origin = Vec2::new(drawn.origin.0 as f32, drawn.origin.1 as f32);
    let local = Vec2::new(
        (vx as i32 + offset.0 as i32) as f32,
        (vy as i32 + offset.1 as i32) as f32,
    );
    let scaled = origin + (local - origin) * drawn.scale;
    let rotated = if drawn.rotation_rad != 0.0 {
        origin + Vec2::from_angle(drawn.rotation_rad).rotate(scaled - origin)
    } else {
        scaled
    };
    let screen = rotated
        + Vec2::new(
            (drawn.x as i32 + VIEWPORT_X) as f32,
            (drawn.y as i32 + VIEWPORT_Y) as f32,
        );
    (screen.x.round() as i32, screen.y.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata;

    fn renderer_with_cutscene() -> Renderer {
        let cs = Cutscene::from_bytes(
            "test",
            &testdata::cmd_two_frames(),
            &testdata::pol_basic(),
        )
        .unwrap();
        let mut r = Renderer::new();
        r.load_shapes(Arc::new(cs));
        r
    }

    #[test]
    fn test_zoom_to_scale_sign() {
        assert_eq!(zoom_to_scale(0), 1.0);
        assert_eq!(zoom_to_scale(-256), 0.5);
        assert_eq!(zoom_to_scale(512), 2.0);
        // A small negative zoom shrinks slightly; an unsigned misread
        // would explode it to ~128x
        let s = zoom_to_scale(-40);
        assert!((s - 0.921875).abs() < 1e-6);
        assert!(s < 1.5);
    }

    #[test]
    fn test_palette_index_halves() {
        assert_eq!(palette_index(5, 1), 5);
        assert_eq!(palette_index(5, 0), 21);
        // 5-bit mask, then wrap
        assert_eq!(palette_index(0x25, 1), 5);
        assert_eq!(palette_index(0x1F, 0), (31 + 16) % 32);
    }

    #[test]
    fn test_identity_transform_hits_viewport() {
        let drawn = DrawnShape {
            shape_id: 0,
            x: 10,
            y: 20,
            scale: 1.0,
            rotation_rad: 0.0,
            origin: (0, 0),
            clear_flag_at_draw: 1,
        };
        assert_eq!(
            transform_vertex(&drawn, (0, 0), 3, 4),
            (3 + 10 + VIEWPORT_X, 4 + 20 + VIEWPORT_Y)
        );
        assert_eq!(
            transform_vertex(&drawn, (1, -1), 3, 4),
            (4 + 10 + VIEWPORT_X, 3 + 20 + VIEWPORT_Y)
        );
    }

    #[test]
    fn test_scale_about_origin() {
        let drawn = DrawnShape {
            shape_id: 0,
            x: 0,
            y: 0,
            scale: 2.0,
            rotation_rad: 0.0,
            origin: (10, 10),
            clear_flag_at_draw: 1,
        };
        // The origin itself is fixed under scaling
        assert_eq!(
            transform_vertex(&drawn, (0, 0), 10, 10),
            (10 + VIEWPORT_X, 10 + VIEWPORT_Y)
        );
        assert_eq!(
            transform_vertex(&drawn, (0, 0), 14, 10),
            (18 + VIEWPORT_X, 10 + VIEWPORT_Y)
        );
    }

    #[test]
    fn test_rotation_about_origin() {
        let drawn = DrawnShape {
            shape_id: 0,
            x: 0,
            y: 0,
            scale: 1.0,
            rotation_rad: std::f32::consts::FRAC_PI_2,
            origin: (0, 0),
            clear_flag_at_draw: 1,
        };
        // 90 degrees: (10, 0) -> (0, 10)
        assert_eq!(
            transform_vertex(&drawn, (0, 0), 10, 0),
            (VIEWPORT_X, 10 + VIEWPORT_Y)
        );
    }

    #[test]
    fn test_draw_lists_and_background() {
        let mut r = renderer_with_cutscene();
        r.set_clear_screen(1);
        r.draw_shape(0, 0, 0); // background draw
        assert_eq!(r.drawn_shapes().len(), 1);

        r.set_clear_screen(0);
        r.draw_shape(1, 5, 5); // foreground draw
        assert_eq!(r.drawn_shapes().len(), 2);

        // Clear with flag unset keeps the background only
        r.clear_drawn_shapes();
        assert_eq!(r.drawn_shapes().len(), 1);
        assert_eq!(r.drawn_shapes()[0].shape_id, 0);

        // Clear with flag set drops everything
        r.set_clear_screen(1);
        r.clear_drawn_shapes();
        assert!(r.drawn_shapes().is_empty());
    }

    #[test]
    fn test_clear_all_shapes() {
        let mut r = renderer_with_cutscene();
        r.draw_shape(0, 0, 0);
        r.set_clear_screen(0);
        r.draw_shape(1, 0, 0);
        r.clear_all_shapes();
        assert!(r.drawn_shapes().is_empty());
        r.clear_drawn_shapes();
        assert!(r.drawn_shapes().is_empty());
    }

    #[test]
    fn test_render_paints_letterbox_black() {
        let mut r = renderer_with_cutscene();
        r.draw_shape(0, 0, 0);
        r.render();
        let fb = r.framebuffer();
        // Sample the four bars
        for (x, y) in [(128usize, 10usize), (128, 200), (2, 100), (252, 100)] {
            let i = (y * SCREEN_WIDTH + x) * 4;
            assert_eq!(&fb[i..i + 4], &[0, 0, 0, 0xFF], "bar pixel ({x},{y})");
        }
    }

    #[test]
    fn test_missing_shape_is_skipped() {
        let mut r = renderer_with_cutscene();
        r.draw_shape(999, 0, 0);
        r.render(); // must not panic
    }
}
