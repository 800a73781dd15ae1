//! Shared building blocks for the weekly-shorts workspace

mod clock;
mod error;
mod fs;
mod secret;

pub use clock::epoch_seconds;
pub use error::{Error, Result};
pub use fs::{read_json, write_json_atomic};
pub use secret::Secret;
