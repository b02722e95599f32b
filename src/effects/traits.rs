use chrono::NaiveDate;
use rand::RngCore;

use crate::frame::Frame;

/// One step of the retro effect
///
/// A stage never modifies the frame it is given: it returns a new frame built
/// from a copy. That keeps stages independently testable and reorderable.
pub trait Stage: Send + Sync {
    /// Returns the unique name of this stage
    fn name(&self) -> &str;

    /// Returns a human-readable description of this stage
    fn description(&self) -> &str;

    /// Produce the transformed frame
    ///
    /// # Arguments
    ///
    /// * `frame` - The input frame, left untouched
    /// * `ctx` - Per-run inputs (random source, imprint date)
    fn apply(&self, frame: &Frame, ctx: &mut StageContext<'_>) -> Frame;
}

/// Inputs that change between runs of the same pipeline
pub struct StageContext<'a> {
    /// Random source for stochastic stages
    pub rng: &'a mut dyn RngCore,

    /// Date imprinted on the photo
    pub date: NaiveDate,
}

impl<'a> StageContext<'a> {
    pub fn new(rng: &'a mut dyn RngCore, date: NaiveDate) -> Self {
        Self { rng, date }
    }
}
