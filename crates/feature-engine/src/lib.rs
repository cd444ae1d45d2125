//! Feature Engineering Engine
//!
//! Holds the fixed 16-feature schema consumed by the sales model and the
//! recurrence that regenerates lag and rolling features one month ahead.

mod error;
mod features;
mod recurrence;
mod statistics;

pub use error::FeatureError;
pub use features::{
    FeatureRecord, FeatureVector, ACTIONABLE_FEATURES, FEATURE_DIMENSION, FEATURE_NAMES,
};
pub use recurrence::{month_encoding, next_period, RATIO_EPSILON};
pub use statistics::{round2, WindowStats};
