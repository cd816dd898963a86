//! # CallQA Common Library
//!
//! Shared code for the CallQA services including:
//! - Error types
//! - Configuration loading
//! - The static scoring rubric
//! - Core enums (sentiment, urgency, call status)

pub mod config;
pub mod error;
pub mod rubric;
pub mod types;

pub use error::{Error, Result};
