//! HTTP handlers

pub mod health;
pub mod analyse;
pub mod detect;
pub mod ingest;
