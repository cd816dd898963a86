//! Services for callqa-audit

pub mod aggregator;
pub mod analysis;
pub mod normalizer;
pub mod pipeline;
pub mod scoring;
pub mod transcription;
