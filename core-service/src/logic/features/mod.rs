//! Features Module - sensor feature schema
//!
//! - `layout` - ordered feature names, version and layout hash
//! - `vector` - the single-row input passed to the classifier

pub mod layout;
pub mod vector;

pub use layout::{Feature, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
pub use vector::FeatureVector;
