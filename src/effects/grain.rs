use rand::Rng;

use crate::{
    effects::{Stage, StageContext},
    error::{EffectError, Result},
    frame::Frame,
};

/// Additive monochrome film grain
///
/// Every pixel gets one uniform offset in `[0, noise_max)` added to R, G and B,
/// saturating at 255. Grain only ever brightens. Alpha is left alone.
pub struct FilmGrain {
    noise_max: u8,
}

impl FilmGrain {
    pub fn new(noise_max: u8) -> Result<Self> {
        if noise_max == 0 {
            return Err(EffectError::InvalidStage {
                stage: "grain".to_string(),
                reason: "noise_max must be at least 1".to_string(),
            }.into());
        }

        Ok(Self { noise_max })
    }

    pub fn noise_max(&self) -> u8 {
        self.noise_max
    }
}

impl Stage for FilmGrain {
    fn name(&self) -> &str {
        "grain"
    }

    fn description(&self) -> &str {
        "Uniform additive grain, one offset per pixel"
    }

    fn apply(&self, frame: &Frame, ctx: &mut StageContext<'_>) -> Frame {
        let mut out = frame.clone();

        // Sequential on purpose: a seeded source must give the same image every run
        for pixel in out.as_image_mut().chunks_exact_mut(4) {
            let noise = ctx.rng.gen_range(0..self.noise_max as u16);
            for channel in &mut pixel[..3] {
                *channel = (*channel as u16 + noise).min(255) as u8;
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::tests::{context, gradient_frame};
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn test_grain_is_additive_and_clamped() {
        let stage = FilmGrain::new(40).unwrap();
        let frame = gradient_frame(64, 32);
        let (mut rng, date) = context();
        let out = stage.apply(&frame, &mut StageContext::new(&mut rng, date));

        for (src, dst) in frame.as_raw().chunks_exact(4).zip(out.as_raw().chunks_exact(4)) {
            for c in 0..3 {
                assert!(dst[c] >= src[c], "grain subtracted: {} -> {}", src[c], dst[c]);
                assert!(dst[c] as u16 <= (src[c] as u16 + 39).min(255));
            }
            assert_eq!(dst[3], src[3]);
        }
    }

    #[test]
    fn test_grain_is_monochrome() {
        let stage = FilmGrain::new(40).unwrap();
        let frame = Frame::new_filled(16, 16, [10, 20, 30, 255]);
        let (mut rng, date) = context();
        let out = stage.apply(&frame, &mut StageContext::new(&mut rng, date));

        for pixel in out.as_raw().chunks_exact(4) {
            assert_eq!(pixel[1] - 10, pixel[0]);
            assert_eq!(pixel[2] - 20, pixel[0]);
        }
    }

    #[test]
    fn test_white_stays_white() {
        let stage = FilmGrain::new(255).unwrap();
        let frame = Frame::new_filled(8, 8, [255, 255, 255, 128]);
        let (mut rng, date) = context();
        let out = stage.apply(&frame, &mut StageContext::new(&mut rng, date));
        assert_eq!(out, frame);
    }

    #[test]
    fn test_seeded_grain_is_reproducible() {
        let stage = FilmGrain::new(40).unwrap();
        let frame = gradient_frame(32, 32);
        let date = context().1;

        let mut first_rng = SmallRng::seed_from_u64(99);
        let mut second_rng = SmallRng::seed_from_u64(99);
        let first = stage.apply(&frame, &mut StageContext::new(&mut first_rng, date));
        let second = stage.apply(&frame, &mut StageContext::new(&mut second_rng, date));
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_noise_rejected() {
        assert!(FilmGrain::new(0).is_err());
    }
}
