//! Logic Module - Business Logic
//!
//! - `features/` - feature schema (layout, vector)
//! - `dataset/` - append-only CSV training data store
//! - `model/` - labeling, random forest, metrics, artifact, trainer, predictor

pub mod dataset;
pub mod features;
pub mod model;
