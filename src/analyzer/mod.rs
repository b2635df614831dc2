//! Analysis engine: which changes matter, and how much they weigh

pub mod changes;
pub mod magnitude;
pub mod triviality;

pub use changes::{ChangeDetector, ChangeReport, ClassifiedFile};
pub use magnitude::MagnitudeEstimator;
pub use triviality::TrivialityClassifier;
