//! # Capture Orchestration
//!
//! [`CaptureCoordinator`] wires the film machine, photo store, roll registry
//! and retro pipeline into one camera session. [`CaptureWorker`] moves a
//! session onto a background thread so captures from any task are handled
//! strictly one after another.

pub mod coordinator;
pub mod worker;

pub use coordinator::CaptureCoordinator;
pub use worker::{CaptureHandle, CaptureWorker};
