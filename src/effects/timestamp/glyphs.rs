//! Seven-segment face, the look of a film camera's date back.
//!
//! Glyphs are built from capsules (line segments with a round stroke) so that
//! coverage can be computed analytically at any size.

/// Segment endpoints on a cell 1 wide and 2 tall, y pointing down
const SEGMENTS: [((f32, f32), (f32, f32)); 7] = [
    ((0.0, 0.0), (1.0, 0.0)), // a: top
    ((1.0, 0.0), (1.0, 1.0)), // b: upper right
    ((1.0, 1.0), (1.0, 2.0)), // c: lower right
    ((0.0, 2.0), (1.0, 2.0)), // d: bottom
    ((0.0, 1.0), (0.0, 2.0)), // e: lower left
    ((0.0, 0.0), (0.0, 1.0)), // f: upper left
    ((0.0, 1.0), (1.0, 1.0)), // g: middle
];

const A: u8 = 1 << 0;
const B: u8 = 1 << 1;
const C: u8 = 1 << 2;
const D: u8 = 1 << 3;
const E: u8 = 1 << 4;
const F: u8 = 1 << 5;
const G: u8 = 1 << 6;

fn digit_segments(digit: u32) -> u8 {
    match digit {
        0 => A | B | C | D | E | F,
        1 => B | C,
        2 => A | B | G | E | D,
        3 => A | B | G | C | D,
        4 => F | G | B | C,
        5 => A | F | G | C | D,
        6 => A | F | G | E | D | C,
        7 => A | B | C,
        8 => A | B | C | D | E | F | G,
        9 => A | B | C | D | F | G,
        _ => 0,
    }
}

/// A stroked line segment; `a == b` gives a dot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    pub a: (f32, f32),
    pub b: (f32, f32),
    pub radius: f32,
}

impl Capsule {
    /// Signed distance from `p` to the capsule outline (negative inside)
    pub fn distance(&self, p: (f32, f32)) -> f32 {
        let (dx, dy) = (self.b.0 - self.a.0, self.b.1 - self.a.1);
        let (px, py) = (p.0 - self.a.0, p.1 - self.a.1);
        let len_sq = dx * dx + dy * dy;
        let t = if len_sq > 0.0 {
            ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let (ex, ey) = (px - dx * t, py - dy * t);
        (ex * ex + ey * ey).sqrt() - self.radius
    }
}

/// Glyph dimensions derived from a font size in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub digit_height: f32,
    pub digit_width: f32,
    pub stroke_radius: f32,
    pub dot_radius: f32,
    pub gap: f32,
}

impl Metrics {
    pub fn for_size(font_size: f32) -> Self {
        let digit_height = font_size * 0.7;
        let stroke_radius = font_size * 0.055;
        Self {
            digit_height,
            digit_width: digit_height * 0.5,
            stroke_radius,
            dot_radius: stroke_radius * 1.3,
            gap: font_size * 0.15,
        }
    }

    fn advance(&self, ch: char) -> f32 {
        match ch {
            '.' => self.dot_radius * 2.0 + self.gap,
            _ => self.digit_width + self.gap,
        }
    }

    /// Width of the inked run of `text`, without trailing gap
    pub fn text_width(&self, text: &str) -> f32 {
        let total: f32 = text.chars().map(|ch| self.advance(ch)).sum();
        (total - self.gap).max(0.0)
    }
}

/// Lay out `text` with its left edge at `x` and baseline at `baseline`
///
/// Only digits and '.' produce ink; other characters advance like a digit.
pub fn layout(text: &str, metrics: &Metrics, x: f32, baseline: f32) -> Vec<Capsule> {
    let mut capsules = Vec::new();
    let mut pen = x;
    let r = metrics.stroke_radius;
    let top = baseline - metrics.digit_height;

    for ch in text.chars() {
        match ch {
            '.' => capsules.push(Capsule {
                a: (pen + metrics.dot_radius, baseline - metrics.dot_radius),
                b: (pen + metrics.dot_radius, baseline - metrics.dot_radius),
                radius: metrics.dot_radius,
            }),
            _ => {
                let mask = ch.to_digit(10).map(digit_segments).unwrap_or(0);
                let inner_w = metrics.digit_width - 2.0 * r;
                let half_h = (metrics.digit_height - 2.0 * r) / 2.0;
                let to_px = |(u, v): (f32, f32)| (pen + r + u * inner_w, top + r + v * half_h);

                for (i, &(a, b)) in SEGMENTS.iter().enumerate() {
                    if mask & (1 << i) != 0 {
                        capsules.push(Capsule { a: to_px(a), b: to_px(b), radius: r });
                    }
                }
            }
        }
        pen += metrics.advance(ch);
    }

    capsules
}
