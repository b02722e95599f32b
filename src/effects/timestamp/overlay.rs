use crate::{
    effects::{Stage, StageContext},
    error::{EffectError, Result},
    frame::Frame,
};

use super::{
    glyphs::{layout, Capsule, Metrics},
    DATE_FORMAT,
};

/// Prints the capture date in the bottom-right corner, right-aligned, in white
pub struct DateImprint {
    font_size: f32,
    margin: u32,
    metrics: Metrics,
}

impl DateImprint {
    pub fn new(font_size: f32, margin: u32) -> Result<Self> {
        if !(font_size >= 4.0 && font_size.is_finite()) {
            return Err(EffectError::InvalidStage {
                stage: "timestamp".to_string(),
                reason: format!("font size {} is too small", font_size),
            }.into());
        }

        Ok(Self {
            font_size,
            margin,
            metrics: Metrics::for_size(font_size),
        })
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Draw `text` right-aligned at the configured inset
    pub fn draw_text(&self, frame: &Frame, text: &str) -> Frame {
        let mut out = frame.clone();
        let (width, height) = frame.dimensions();

        let right = width as f32 - self.margin as f32;
        let baseline = height as f32 - self.margin as f32;
        let left = right - self.metrics.text_width(text);
        let capsules = layout(text, &self.metrics, left, baseline);

        // Only pixels that can receive ink are visited
        let pad = self.metrics.stroke_radius.max(self.metrics.dot_radius) + 1.0;
        let x0 = (left - pad).floor().max(0.0) as u32;
        let x1 = ((right + pad).ceil().max(0.0) as u32).min(width);
        let y0 = (baseline - self.metrics.digit_height - pad).floor().max(0.0) as u32;
        let y1 = ((baseline + pad).ceil().max(0.0) as u32).min(height);

        for y in y0..y1 {
            for x in x0..x1 {
                let coverage = coverage_at(&capsules, (x as f32 + 0.5, y as f32 + 0.5));
                if coverage == 0 {
                    continue;
                }

                let mut pixel = out.get_pixel(x, y);
                // White over: each channel moves toward 255 by the coverage
                for channel in pixel.iter_mut() {
                    let c = *channel as u32;
                    *channel = (c + ((255 - c) * coverage + 127) / 255) as u8;
                }
                out.set_pixel(x, y, pixel);
            }
        }

        out
    }
}

/// Coverage of a pixel center in 0..=255, one-pixel anti-aliasing ramp
fn coverage_at(capsules: &[Capsule], p: (f32, f32)) -> u32 {
    let distance = capsules
        .iter()
        .map(|c| c.distance(p))
        .fold(f32::INFINITY, f32::min);

    let alpha = (0.5 - distance).clamp(0.0, 1.0);
    (alpha * 255.0).round() as u32
}

impl Stage for DateImprint {
    fn name(&self) -> &str {
        "timestamp"
    }

    fn description(&self) -> &str {
        "Anti-aliased YYYY.MM.DD date imprint in the bottom-right corner"
    }

    fn apply(&self, frame: &Frame, ctx: &mut StageContext<'_>) -> Frame {
        let text = ctx.date.format(DATE_FORMAT).to_string();
        self.draw_text(frame, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::{rngs::SmallRng, SeedableRng};

    fn imprint(frame: &Frame) -> Frame {
        let stage = DateImprint::new(40.0, 20).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        stage.apply(frame, &mut StageContext::new(&mut rng, date))
    }

    #[test]
    fn test_ink_only_in_bottom_right_box() {
        let frame = Frame::new_filled(400, 200, [0, 0, 0, 255]);
        let out = imprint(&frame);

        let mut touched = 0;
        for y in 0..200 {
            for x in 0..400 {
                if out.get_pixel(x, y) != frame.get_pixel(x, y) {
                    touched += 1;
                    assert!((190..385).contains(&x), "ink at x={}", x);
                    assert!((145..185).contains(&y), "ink at y={}", y);
                }
            }
        }
        assert!(touched > 0);
    }

    #[test]
    fn test_text_is_white_and_anti_aliased() {
        let frame = Frame::new_filled(400, 200, [0, 0, 0, 255]);
        let out = imprint(&frame);

        let reds: Vec<u8> = out.as_raw().chunks_exact(4).map(|p| p[0]).collect();
        assert!(reds.iter().any(|&r| r == 255));
        assert!(reds.iter().any(|&r| r > 0 && r < 255));

        for pixel in out.as_raw().chunks_exact(4) {
            // white ink over black keeps the pixel gray
            assert_eq!(pixel[0], pixel[1]);
            assert_eq!(pixel[1], pixel[2]);
        }
    }

    #[test]
    fn test_text_is_right_aligned() {
        let frame = Frame::new_filled(400, 200, [0, 0, 0, 255]);
        let out = imprint(&frame);

        let rightmost = (0..400)
            .rev()
            .find(|&x| (0..200).any(|y| out.get_pixel(x, y)[0] > 0))
            .unwrap();
        // right edge of the text sits on the 20px margin
        assert!((377..=380).contains(&rightmost), "rightmost ink at {}", rightmost);
    }

    #[test]
    fn test_tiny_frame_is_clipped_not_panicking() {
        let frame = Frame::new_filled(10, 10, [5, 5, 5, 255]);
        let out = imprint(&frame);
        assert_eq!(out.dimensions(), (10, 10));
    }

    #[test]
    fn test_input_untouched() {
        let frame = Frame::new_filled(300, 120, [10, 10, 10, 255]);
        let copy = frame.clone();
        let _ = imprint(&frame);
        assert_eq!(frame, copy);
    }
}
