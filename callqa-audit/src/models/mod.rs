//! Data models for callqa-audit

pub mod aggregate;
pub mod analysis;
pub mod call_record;
pub mod scores;

pub use aggregate::{
    AgentPerformance, AggregateSnapshot, CategoryAverage, DailyBucket, HistogramBucket, LabelCount,
};
pub use analysis::{NormalizationFlag, NormalizedAnalysis, NormalizedItem, RawAnalysis, RawItemScore};
pub use call_record::{CallFilter, CallRecord};
pub use scores::{CallScores, CategoryScore, ComplianceFlag};
