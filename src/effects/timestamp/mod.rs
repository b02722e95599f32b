//! # Date Imprint
//!
//! Burns the capture date into the photo the way a film camera's date back
//! does: small seven-segment digits near the bottom-right corner.

mod glyphs;
mod overlay;

pub use overlay::DateImprint;

/// chrono format of the imprinted date
pub const DATE_FORMAT: &str = "%Y.%m.%d";

pub const DEFAULT_FONT_SIZE: f32 = 40.0;
pub const DEFAULT_MARGIN: u32 = 20;
