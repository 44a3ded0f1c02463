//! GridGuard Core
//!
//! Electricity-theft detection: sensor data store, random-forest training
//! and inference shared by the trainer CLI and the HTTP services.

pub mod constants;
pub mod logic;

pub use logic::dataset::{CsvStore, SensorRecord, StoreError};
pub use logic::features::FeatureVector;
pub use logic::model::{
    LabelPolicy, Prediction, Predictor, Trainer, TrainingConfig, TrainingOutcome,
};
