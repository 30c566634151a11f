//! Bresenham line drawing

use poly_pol::Color;

use super::Raster;

impl Raster<'_> {
    /// Draw a line between two local points
    ///
    /// Classic integer Bresenham with an `oct` error term seeded at
    /// `2 * delta_min - delta_max`: a non-negative term steps
    /// diagonally, a negative one steps along the major axis. The first
    /// endpoint is drawn even for a zero-length line.
    pub fn draw_line(&mut self, color: Color, x1: i32, y1: i32, x2: i32, y2: i32) {
        let dx = (x2 - x1).abs();
        let sx = if x2 >= x1 { 1 } else { -1 };
        let dy = (y2 - y1).abs();
        let sy = if y2 >= y1 { 1 } else { -1 };

        let x_major = dx >= dy;
        let (delta_max, delta_min) = if x_major { (dx, dy) } else { (dy, dx) };

        let mut oct = 2 * delta_min - delta_max;
        let mut x = x1;
        let mut y = y1;

        for _ in 0..=delta_max {
            self.draw_point(color, x, y);
            if oct >= 0 {
                x += sx;
                y += sy;
                oct += 2 * (delta_min - delta_max);
            } else {
                if x_major {
                    x += sx;
                } else {
                    y += sy;
                }
                oct += 2 * delta_min;
            }
        }
    }

    /// Draw the outline of a polygon as a closed sequence of lines
    pub fn draw_polygon_outline(&mut self, color: Color, vertices: &[(i32, i32)]) {
        if vertices.is_empty() {
            return;
        }
        if vertices.len() == 1 {
            self.draw_point(color, vertices[0].0, vertices[0].1);
            return;
        }
        for i in 0..vertices.len() {
            let (x1, y1) = vertices[i];
            let (x2, y2) = vertices[(i + 1) % vertices.len()];
            self.draw_line(color, x1, y1, x2, y2);
        }
    }
}
