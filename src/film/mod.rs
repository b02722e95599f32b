//! # Film Roll Lifecycle
//!
//! A roll holds [`ROLL_CAPACITY`] exposures. Loading a new roll allocates its
//! storage unit and registers it; each stored photo consumes one exposure;
//! an empty roll refuses further captures until the film is changed.

pub mod machine;
pub mod roll;

pub use machine::{FilmRollMachine, FilmState};
pub use roll::{Roll, RollId, ROLL_CAPACITY, ROLL_PREFIX};
