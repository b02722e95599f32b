//! # Retro-Camera
//!
//! A simulated roll-film camera: every roll holds a fixed number of exposures,
//! and every photo is run through a retro film look before it is stored.
//!
//! The library tracks rolls and their remaining exposures, binds each roll to
//! its own storage directory, keeps a registry of all rolls, and applies the
//! retro effect pipeline (saturation boost, film grain, warm cast, date imprint).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use retro_camera::{capture::CaptureCoordinator, config::Config, frame::Frame};
//!
//! # fn main() -> retro_camera::Result<()> {
//! let mut camera = CaptureCoordinator::open(Config::default())?;
//! camera.reset_film()?;
//!
//! let photo = Frame::open("snapshot.png")?;
//! let stored = camera.on_image_captured(&photo)?;
//! println!("Saved to {:?}, status: {:?}", stored, camera.status());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - [`film`] - Roll lifecycle and exposure counting
//! - [`storage`] - Per-roll photo directories and the roll registry
//! - [`effects`] - Retro effect stages and the pipeline
//! - [`capture`] - Capture orchestration and the background worker
//! - [`config`] - Configuration management
//!
//! ## Custom Stages
//!
//! Pipelines can be assembled from your own stages by implementing the
//! [`Stage`](effects::Stage) trait:
//!
//! ```rust,no_run
//! use retro_camera::effects::{RetroPipeline, SaturationBoost, Stage, StageContext};
//! use retro_camera::frame::Frame;
//!
//! struct Invert;
//!
//! impl Stage for Invert {
//!     fn name(&self) -> &str {
//!         "invert"
//!     }
//!
//!     fn description(&self) -> &str {
//!         "Photographic negative"
//!     }
//!
//!     fn apply(&self, frame: &Frame, _ctx: &mut StageContext<'_>) -> Frame {
//!         let mut out = frame.clone();
//!         for px in out.as_image_mut().pixels_mut() {
//!             for c in &mut px.0[..3] {
//!                 *c = 255 - *c;
//!             }
//!         }
//!         out
//!     }
//! }
//!
//! # fn main() -> retro_camera::Result<()> {
//! let pipeline = RetroPipeline::with_stages(vec![
//!     Box::new(SaturationBoost::new(1.5)?),
//!     Box::new(Invert),
//! ]);
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod clock;
pub mod config;
pub mod effects;
pub mod error;
pub mod film;
pub mod frame;
pub mod storage;

// Re-export commonly used types for convenience
pub use crate::{
    capture::{CaptureCoordinator, CaptureHandle, CaptureWorker},
    config::Config,
    effects::{RetroPipeline, Stage},
    error::{CaptureError, Result},
    film::{FilmRollMachine, FilmState, Roll, RollId, ROLL_CAPACITY},
    frame::Frame,
    storage::{DirectoryStore, PhotoStore, RollRegistry},
};
