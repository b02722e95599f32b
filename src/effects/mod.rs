//! # Retro Effect
//!
//! The fixed film look applied to every photo before it is stored. Four
//! stages run in order, each reading the previous stage's output:
//!
//! 1. **Saturation**: luma-preserving color matrix boost
//! 2. **Grain**: additive per-pixel noise
//! 3. **Temperature**: blue attenuation for a warm cast
//! 4. **Timestamp**: date imprint in the bottom-right corner
//!
//! ## Usage
//!
//! ```rust,no_run
//! use retro_camera::{config::EffectConfig, effects::RetroPipeline, frame::Frame};
//!
//! let pipeline = RetroPipeline::from_config(&EffectConfig::default()).unwrap();
//! let photo = Frame::open("shot.png").unwrap();
//! let retro = pipeline.apply(&photo);
//! ```

pub mod grain;
pub mod pipeline;
pub mod saturation;
pub mod temperature;
pub mod timestamp;
pub mod traits;

use rayon::prelude::*;

use crate::frame::Frame;

pub use grain::FilmGrain;
pub use pipeline::RetroPipeline;
pub use saturation::SaturationBoost;
pub use temperature::WarmCast;
pub use timestamp::DateImprint;
pub use traits::{Stage, StageContext};

// 12-bit fixed point shared by the color math
pub(crate) const FIXED_SHIFT: u32 = 12;
pub(crate) const FIXED_ONE: i32 = 1 << FIXED_SHIFT;
pub(crate) const FIXED_HALF: i32 = FIXED_ONE / 2;

/// Copy `frame` and run `f` over every RGBA pixel of the copy, rows in parallel
pub(crate) fn map_pixels<F>(frame: &Frame, f: F) -> Frame
where
    F: Fn(&mut [u8]) + Sync,
{
    let mut out = frame.clone();
    let row_len = frame.width() as usize * 4;
    if row_len == 0 || frame.height() == 0 {
        return out;
    }

    out.as_image_mut()
        .par_chunks_mut(row_len)
        .for_each(|row| row.chunks_exact_mut(4).for_each(&f));
    out
}
