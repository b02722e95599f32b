use crate::{
    effects::{map_pixels, Stage, StageContext, FIXED_HALF, FIXED_ONE, FIXED_SHIFT},
    error::{EffectError, Result},
    frame::Frame,
};

/// Warm color cast: blue is scaled down, everything else passes through
pub struct WarmCast {
    blue_scale: f32,
    blue_fixed: i32,
}

impl WarmCast {
    pub fn new(blue_scale: f32) -> Result<Self> {
        if !(blue_scale > 0.0 && blue_scale < 1.0) {
            return Err(EffectError::InvalidStage {
                stage: "temperature".to_string(),
                reason: format!("blue scale {} is not in (0, 1)", blue_scale),
            }.into());
        }

        Ok(Self {
            blue_scale,
            blue_fixed: (blue_scale * FIXED_ONE as f32).round() as i32,
        })
    }

    pub fn blue_scale(&self) -> f32 {
        self.blue_scale
    }
}

impl Stage for WarmCast {
    fn name(&self) -> &str {
        "temperature"
    }

    fn description(&self) -> &str {
        "Warm/yellow cast by attenuating the blue channel"
    }

    fn apply(&self, frame: &Frame, _ctx: &mut StageContext<'_>) -> Frame {
        map_pixels(frame, |pixel| {
            let blue = (pixel[2] as i32 * self.blue_fixed + FIXED_HALF) >> FIXED_SHIFT;
            pixel[2] = blue.clamp(0, 255) as u8;
        })
    }
}
