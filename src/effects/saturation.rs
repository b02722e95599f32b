use crate::{
    effects::{map_pixels, Stage, StageContext, FIXED_HALF, FIXED_ONE, FIXED_SHIFT},
    error::{EffectError, Result},
    frame::Frame,
};

/// Luma weights of the saturation matrix (R, G, B)
pub const LUMA_WEIGHTS: [f32; 3] = [0.213, 0.715, 0.072];

/// Luma-preserving saturation boost
///
/// Uses the standard saturation color matrix: each output channel is
/// `luma * (1 - s) + channel * s`, with the matrix rows quantized to 12-bit
/// fixed point so that each row sums to exactly one and grays stay gray.
pub struct SaturationBoost {
    factor: f32,
    matrix: [[i32; 3]; 3],
}

impl SaturationBoost {
    pub fn new(factor: f32) -> Result<Self> {
        if !(factor > 1.0 && factor.is_finite()) {
            return Err(EffectError::InvalidStage {
                stage: "saturation".to_string(),
                reason: format!("factor {} does not boost saturation", factor),
            }.into());
        }

        Ok(Self {
            factor,
            matrix: Self::build_matrix(factor),
        })
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    fn build_matrix(factor: f32) -> [[i32; 3]; 3] {
        let inverse = 1.0 - factor;
        let luma = LUMA_WEIGHTS.map(|w| (w * inverse * FIXED_ONE as f32).round() as i32);
        let diagonal = FIXED_ONE - luma.iter().sum::<i32>();

        let mut matrix = [luma; 3];
        for (i, row) in matrix.iter_mut().enumerate() {
            row[i] += diagonal;
        }
        matrix
    }

    fn transform(&self, pixel: &mut [u8]) {
        let rgb = [pixel[0] as i32, pixel[1] as i32, pixel[2] as i32];

        for (channel, row) in pixel.iter_mut().zip(self.matrix.iter()) {
            let sum = row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2];
            *channel = ((sum + FIXED_HALF) >> FIXED_SHIFT).clamp(0, 255) as u8;
        }
    }
}

impl Stage for SaturationBoost {
    fn name(&self) -> &str {
        "saturation"
    }

    fn description(&self) -> &str {
        "Luma-preserving saturation boost through a color matrix"
    }

    fn apply(&self, frame: &Frame, _ctx: &mut StageContext<'_>) -> Frame {
        map_pixels(frame, |pixel| self.transform(pixel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::tests::context;

    #[test]
    fn test_rows_sum_to_one() {
        let stage = SaturationBoost::new(1.2).unwrap();
        for row in stage.matrix {
            assert_eq!(row.iter().sum::<i32>(), FIXED_ONE);
        }
    }

    #[test]
    fn test_gray_is_unchanged() {
        let stage = SaturationBoost::new(1.2).unwrap();
        for value in [0u8, 1, 77, 128, 254, 255] {
            let frame = Frame::new_filled(3, 3, [value, value, value, 200]);
            let (mut rng, date) = context();
            let out = stage.apply(&frame, &mut StageContext::new(&mut rng, date));
            assert_eq!(out, frame);
        }
    }

    #[test]
    fn test_colored_pixels_move_away_from_luma() {
        let stage = SaturationBoost::new(1.2).unwrap();
        let frame = Frame::new_filled(2, 2, [200, 100, 50, 77]);
        let (mut rng, date) = context();
        let out = stage.apply(&frame, &mut StageContext::new(&mut rng, date));

        // luma = 0.213*200 + 0.715*100 + 0.072*50 = 117.7
        assert_eq!(out.get_pixel(0, 0), [216, 96, 36, 77]);
        assert_ne!(out, frame);
        // input untouched
        assert_eq!(frame.get_pixel(0, 0), [200, 100, 50, 77]);
    }

    #[test]
    fn test_alpha_preserved_for_every_pixel() {
        let stage = SaturationBoost::new(1.8).unwrap();
        let mut frame = Frame::new_filled(8, 4, [0, 0, 0, 0]);
        for x in 0..8 {
            for y in 0..4 {
                frame.set_pixel(x, y, [(x * 30) as u8, 255 - (y * 60) as u8, 17, (x * y * 9) as u8]);
            }
        }
        let (mut rng, date) = context();
        let out = stage.apply(&frame, &mut StageContext::new(&mut rng, date));

        for (src, dst) in frame.as_raw().chunks_exact(4).zip(out.as_raw().chunks_exact(4)) {
            assert_eq!(src[3], dst[3]);
        }
    }

    #[test]
    fn test_rejects_non_boosting_factor() {
        assert!(SaturationBoost::new(1.0).is_err());
        assert!(SaturationBoost::new(0.5).is_err());
        assert!(SaturationBoost::new(f32::NAN).is_err());
    }
}
