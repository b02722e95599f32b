use chrono::{Local, NaiveDate};
use rand::RngCore;
use tracing::debug;

use crate::{
    config::EffectConfig,
    effects::{DateImprint, FilmGrain, SaturationBoost, Stage, StageContext, WarmCast},
    error::Result,
    frame::Frame,
};

/// Ordered chain of effect stages
///
/// The pipeline holds no mutable state; one instance can serve any number of
/// callers on independent frames.
pub struct RetroPipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl RetroPipeline {
    /// Build the standard four-stage retro look from configuration
    pub fn from_config(config: &EffectConfig) -> Result<Self> {
        let mut stages: Vec<Box<dyn Stage>> = vec![
            Box::new(SaturationBoost::new(config.saturation)?),
            Box::new(FilmGrain::new(config.noise_max)?),
            Box::new(WarmCast::new(config.blue_scale)?),
        ];

        if config.timestamp.enabled {
            stages.push(Box::new(DateImprint::new(
                config.timestamp.font_size,
                config.timestamp.margin,
            )?));
        }

        Ok(Self::with_stages(stages))
    }

    /// Build a pipeline from an explicit stage list
    pub fn with_stages(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Names of the stages in run order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Apply with an unseeded thread-local random source and today's local date
    pub fn apply(&self, frame: &Frame) -> Frame {
        let mut rng = rand::thread_rng();
        self.apply_with(frame, &mut rng, Local::now().date_naive())
    }

    /// Apply with an explicit random source and imprint date
    pub fn apply_with(&self, frame: &Frame, rng: &mut dyn RngCore, date: NaiveDate) -> Frame {
        let mut ctx = StageContext::new(rng, date);
        let mut current = frame.clone();

        for stage in &self.stages {
            debug!("Applying {} stage to {}x{} frame", stage.name(), current.width(), current.height());
            current = stage.apply(&current, &mut ctx);
        }

        current
    }
}
