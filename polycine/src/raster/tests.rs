//! Rasterizer property tests

use poly_pol::Color;

use super::{ClipRect, Raster};

const W: usize = 64;
const H: usize = 48;

const RED: Color = Color { r: 255, g: 0, b: 0 };
const GREY: Color = Color {
    r: 102,
    g: 102,
    b: 102,
};

fn buffer() -> Vec<u8> {
    vec![0u8; W * H * 4]
}

fn pixel(buf: &[u8], x: usize, y: usize) -> (u8, u8, u8, u8) {
    let i = (y * W + x) * 4;
    (buf[i], buf[i + 1], buf[i + 2], buf[i + 3])
}

fn is_colored(buf: &[u8], x: usize, y: usize) -> bool {
    let (r, g, b, _) = pixel(buf, x, y);
    (r, g, b) != (0, 0, 0)
}

fn full_clip() -> ClipRect {
    ClipRect::new(0, 0, W as i32, H as i32)
}

#[test]
fn test_point_in_and_out_of_clip() {
    let mut buf = buffer();
    let mut r = Raster::new(&mut buf, W, H, ClipRect::new(4, 4, 8, 8));
    r.draw_point(RED, 0, 0); // lands at screen (4, 4)
    r.draw_point(RED, 8, 3); // outside clip width
    r.draw_point(RED, -1, 2);
    assert!(is_colored(&buf, 4, 4));
    assert_eq!(pixel(&buf, 4, 4).3, 0xFF);
    let lit: usize = (0..H)
        .flat_map(|y| (0..W).map(move |x| (x, y)))
        .filter(|&(x, y)| is_colored(&buf, x, y))
        .count();
    assert_eq!(lit, 1);
}

#[test]
fn test_horizontal_line_property() {
    // drawPolygon on [(x, y), (x+w, y)] paints exactly (x..=x+w, y)
    let mut buf = buffer();
    let mut r = Raster::new(&mut buf, W, H, full_clip());
    r.draw_polygon(RED, false, &[(5, 10), (15, 10)]);
    for x in 0..W {
        for y in 0..H {
            let expect = y == 10 && (5..=15).contains(&x);
            assert_eq!(is_colored(&buf, x, y), expect, "pixel ({x},{y})");
        }
    }
}

#[test]
fn test_single_pixel_line() {
    // The first endpoint is drawn even when delta_max == 0
    let mut buf = buffer();
    let mut r = Raster::new(&mut buf, W, H, full_clip());
    r.draw_line(RED, 7, 7, 7, 7);
    assert!(is_colored(&buf, 7, 7));
}

#[test]
fn test_line_endpoints_and_diagonal() {
    let mut buf = buffer();
    let mut r = Raster::new(&mut buf, W, H, full_clip());
    r.draw_line(RED, 2, 2, 10, 10);
    for i in 2..=10 {
        assert!(is_colored(&buf, i, i), "diagonal pixel {i}");
    }
}

#[test]
fn test_rectangle_fill() {
    let mut buf = buffer();
    let mut r = Raster::new(&mut buf, W, H, full_clip());
    r.draw_polygon(RED, false, &[(10, 5), (20, 5), (20, 15), (10, 15)]);
    // Interior rows are solid between the edges
    for y in 5..=15 {
        for x in 10..=20 {
            assert!(is_colored(&buf, x, y), "pixel ({x},{y})");
        }
    }
    assert!(!is_colored(&buf, 9, 10));
    assert!(!is_colored(&buf, 21, 10));
    assert!(!is_colored(&buf, 15, 4));
    assert!(!is_colored(&buf, 15, 16));
}

#[test]
fn test_degenerate_flat_polygon() {
    let mut buf = buffer();
    let mut r = Raster::new(&mut buf, W, H, full_clip());
    r.draw_polygon(RED, false, &[(3, 7), (9, 7), (6, 7)]);
    for x in 3..=9 {
        assert!(is_colored(&buf, x, 7));
    }
    assert!(!is_colored(&buf, 2, 7));
    assert!(!is_colored(&buf, 10, 7));
}

#[test]
fn test_clipping_never_writes_outside() {
    // Sentinel-fill the whole buffer, then draw wildly out-of-range
    // geometry through a small clip window.
    let mut buf = vec![7u8; W * H * 4];
    let clip = ClipRect::new(10, 10, 16, 12);
    let mut r = Raster::new(&mut buf, W, H, clip);
    r.draw_polygon(RED, false, &[(-50, -50), (200, -20), (90, 100)]);
    r.draw_polygon(RED, false, &[(-5, 0), (30, 2), (12, 40)]);
    r.draw_ellipse(RED, false, 8, 6, 30, 30);
    r.draw_line(RED, -20, -20, 100, 60);
    r.draw_point(RED, 1000, 1000);

    for y in 0..H {
        for x in 0..W {
            let inside = (10..26).contains(&(x as i32)) && (10..22).contains(&(y as i32));
            if !inside {
                let i = (y * W + x) * 4;
                assert_eq!(&buf[i..i + 4], &[7, 7, 7, 7], "clobbered ({x},{y})");
            }
        }
    }
}

#[test]
fn test_alpha_blend_is_average() {
    let mut buf = buffer();
    // Pre-paint a row with a known colour
    {
        let mut r = Raster::new(&mut buf, W, H, full_clip());
        r.draw_polygon(
            Color {
                r: 200,
                g: 100,
                b: 50,
            },
            false,
            &[(0, 0), (63, 0), (63, 47), (0, 47)],
        );
    }
    let mut r = Raster::new(&mut buf, W, H, full_clip());
    r.draw_polygon(Color { r: 0, g: 0, b: 0 }, true, &[(4, 4), (10, 4), (10, 8), (4, 8)]);
    assert_eq!(pixel(&buf, 5, 5), (100, 50, 25, 0xFF));
    assert_eq!(pixel(&buf, 20, 20), (200, 100, 50, 0xFF));
}

#[test]
fn test_alpha_idempotent_on_same_color() {
    // Blending a surface with its own colour must change nothing
    let mut buf = buffer();
    {
        let mut r = Raster::new(&mut buf, W, H, full_clip());
        r.draw_polygon(GREY, false, &[(0, 0), (63, 0), (63, 47), (0, 47)]);
    }
    let before = buf.clone();
    let mut r = Raster::new(&mut buf, W, H, full_clip());
    r.draw_polygon(GREY, true, &[(2, 2), (30, 2), (30, 30), (2, 30)]);
    r.draw_ellipse(GREY, true, 40, 20, 10, 8);
    assert_eq!(buf, before);
}

#[test]
fn test_triangle_spans_inside_hull() {
    let mut buf = buffer();
    let mut r = Raster::new(&mut buf, W, H, full_clip());
    let verts = [(30, 4), (50, 40), (10, 40)];
    r.draw_polygon(RED, false, &verts);
    // Apex and base corners are covered
    assert!(is_colored(&buf, 30, 4));
    assert!(is_colored(&buf, 30, 20));
    for x in 11..50 {
        assert!(is_colored(&buf, x, 39), "base row pixel {x}");
    }
    // Far outside the hull stays black
    assert!(!is_colored(&buf, 5, 10));
    assert!(!is_colored(&buf, 55, 10));
}

#[test]
fn test_polygon_clipped_top_still_aligned() {
    // A triangle whose apex is above the clip: rows at y >= 0 must match
    // the same triangle drawn on a taller surface.
    let tall_h = H + 20;
    let mut tall = vec![0u8; W * tall_h * 4];
    {
        let mut r = Raster::new(&mut tall, W, tall_h, ClipRect::new(0, 0, W as i32, tall_h as i32));
        r.draw_polygon(RED, false, &[(20, 0), (40, 30), (5, 36)]);
    }
    let mut buf = buffer();
    {
        let mut r = Raster::new(&mut buf, W, H, full_clip());
        r.draw_polygon(RED, false, &[(20, -20), (40, 10), (5, 16)]);
    }
    for y in 0..20 {
        for x in 0..W {
            let i_tall = ((y + 20) * W + x) * 4;
            let i = (y * W + x) * 4;
            assert_eq!(
                tall[i_tall] != 0,
                buf[i] != 0,
                "row {y} pixel {x} differs from unclipped reference"
            );
        }
    }
}

#[test]
fn test_ellipse_bounds_and_symmetry() {
    let mut buf = buffer();
    let mut r = Raster::new(&mut buf, W, H, full_clip());
    r.draw_ellipse(RED, false, 32, 24, 12, 8);
    // Extremes are painted
    assert!(is_colored(&buf, 20, 24));
    assert!(is_colored(&buf, 44, 24));
    assert!(is_colored(&buf, 32, 16));
    assert!(is_colored(&buf, 32, 32));
    // Nothing beyond the radii
    assert!(!is_colored(&buf, 19, 24));
    assert!(!is_colored(&buf, 45, 24));
    assert!(!is_colored(&buf, 32, 15));
    assert!(!is_colored(&buf, 32, 33));
    // Vertical symmetry
    for dy in 0..=8i32 {
        for x in 0..W {
            assert_eq!(
                is_colored(&buf, x, (24 - dy) as usize),
                is_colored(&buf, x, (24 + dy) as usize),
                "asymmetry at dy={dy} x={x}"
            );
        }
    }
}

#[test]
fn test_outline_closes_the_ring() {
    let mut buf = buffer();
    let mut r = Raster::new(&mut buf, W, H, full_clip());
    r.draw_polygon_outline(RED, &[(5, 5), (25, 5), (25, 20), (5, 20)]);
    assert!(is_colored(&buf, 15, 5));
    assert!(is_colored(&buf, 25, 12));
    assert!(is_colored(&buf, 15, 20));
    assert!(is_colored(&buf, 5, 12)); // closing segment
    assert!(!is_colored(&buf, 15, 12)); // not filled
}
