//! Tabular inputs: named feature frames for the model layer and the
//! [`Dataset`] container the boosting engine trains on.

pub mod dataset;
pub mod frame;

pub use dataset::Dataset;
pub use frame::FeatureFrame;
