//! Scanline polygon fill
//!
//! Walks a left and a right edge down from the topmost vertex, holding
//! the span ends in 16.16 fixed-point. The per-row step is computed with
//! an intermediate truncation to 16 bits — that truncation, and the
//! left/right asymmetry on overflow, match the original renderer's
//! arithmetic and are required for edge-exact output.

use poly_pol::Color;

use super::Raster;

/// One edge being walked, anchored at its start vertex
struct EdgeWalker {
    /// Vertex the current edge ends at
    idx: usize,
    /// Row at which the current edge ends
    end_y: i32,
    /// Current span end, 16.16 fixed-point
    x: i32,
    /// Per-row increment, 16.16 fixed-point
    step: i32,
    /// Walk direction around the vertex ring (-1 left, +1 right)
    dir: isize,
}

impl EdgeWalker {
    fn start(top: usize, top_y: i32, dir: isize) -> Self {
        Self {
            idx: top,
            end_y: top_y,
            x: 0,
            step: 0,
            dir,
        }
    }

    /// Move onto the next edge of the ring
    fn advance(&mut self, vertices: &[(i32, i32)]) {
        let n = vertices.len();
        let next = (self.idx as isize + self.dir).rem_euclid(n as isize) as usize;
        let (x0, y0) = vertices[self.idx];
        let (x1, y1) = vertices[next];
        self.x = x0.wrapping_shl(16);
        self.step = if y1 > y0 {
            edge_step(x1 - x0, y1 - y0, self.dir < 0)
        } else {
            0
        };
        self.end_y = y1;
        self.idx = next;
    }
}

/// Per-row x increment for an edge of slope dx/dy, 16.16 fixed-point
///
/// The quotient is squeezed through an i16 before rescaling; on the
/// overflow path the left edge masks to 16 bits where the right edge
/// keeps its sign.
fn edge_step(dx: i32, dy: i32, left: bool) -> i32 {
    let a = dx.wrapping_mul(256);
    if (a >> 16).abs() < dy {
        ((a / dy) as i16 as i32) * 256
    } else if left {
        (((a / 256) / dy) & 0xFFFF).wrapping_shl(16)
    } else {
        ((a / 256) / dy).wrapping_shl(16)
    }
}

impl Raster<'_> {
    /// Fill a polygon given in local clip coordinates
    ///
    /// One vertex degenerates to a point, two to a line.
    pub fn draw_polygon(&mut self, color: Color, alpha: bool, vertices: &[(i32, i32)]) {
        match vertices.len() {
            0 => return,
            1 => {
                self.draw_point(color, vertices[0].0, vertices[0].1);
                return;
            }
            2 => {
                let (x1, y1) = vertices[0];
                let (x2, y2) = vertices[1];
                self.draw_line(color, x1, y1, x2, y2);
                return;
            }
            _ => {}
        }

        let ymin = vertices.iter().map(|v| v.1).min().unwrap_or(0);
        let ymax = vertices.iter().map(|v| v.1).max().unwrap_or(0);
        let xmin = vertices.iter().map(|v| v.0).min().unwrap_or(0);
        let xmax = vertices.iter().map(|v| v.0).max().unwrap_or(0);
        if ymax < 0 || ymin >= self.clip.h || xmax < 0 || xmin >= self.clip.w {
            return;
        }

        if ymin == ymax {
            self.fill_span(color, alpha, ymin, xmin, xmax);
            return;
        }

        // Topmost vertex; ties resolve to the first occurrence
        let top = vertices
            .iter()
            .enumerate()
            .min_by_key(|(_, v)| v.1)
            .map(|(i, _)| i)
            .unwrap_or(0);

        let mut left = EdgeWalker::start(top, ymin, -1);
        let mut right = EdgeWalker::start(top, ymin, 1);
        left.advance(vertices);
        right.advance(vertices);

        // Rows clipped off the top still advance the accumulators
        if ymin < 0 {
            left.x = left.x.wrapping_add(left.step.wrapping_mul(-ymin));
            right.x = right.x.wrapping_add(right.step.wrapping_mul(-ymin));
        }

        let y_end = ymax.min(self.clip.h - 1);
        for y in ymin.max(0)..=y_end {
            while y >= left.end_y && left.idx != right.idx {
                left.advance(vertices);
            }
            while y >= right.end_y && left.idx != right.idx {
                right.advance(vertices);
            }

            let mut x1 = left.x.wrapping_add(0x8000) >> 16;
            let mut x2 = right.x.wrapping_add(0x8000) >> 16;
            if x1 > x2 {
                std::mem::swap(&mut x1, &mut x2);
            }
            self.fill_span(color, alpha, y, x1, x2);

            left.x = left.x.wrapping_add(left.step);
            right.x = right.x.wrapping_add(right.step);
        }
    }
}
