//! Utility modules

pub mod duration;
pub mod error;

pub use duration::{duration_to_millis, signed_millis_to_duration, MAX_DURATION_MILLIS};
pub use error::{ConstructionError, FormatError, GlideConfigError, Result, ValidationError};
