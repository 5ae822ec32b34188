//! Gradient boosting engine.
//!
//! - [`gbdt`]: the boosting loop and the trained [`Booster`]
//! - [`objective`]: squared-error and pseudo-Huber gradients
//! - [`early_stopping`]: validation-metric patience tracking

pub mod early_stopping;
pub mod gbdt;
pub mod objective;

pub use early_stopping::{EarlyStopping, EarlyStoppingConfig};
pub use gbdt::{train, Booster, GBDT};
pub use objective::{create_objective_function, ObjectiveFunction};
