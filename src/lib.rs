//! Evidence assembly for incident reports.
//!
//! Raw incident text goes through [`extraction::IncidentExtractor`] to become
//! an [`models::IncidentRecord`]; [`aggregation::ContextGatherer`] then ranks
//! log lines, historical cases and knowledge-base passages against it and
//! returns a [`models::ContextBundle`] for the generative step.

pub mod aggregation;
pub mod config;
pub mod corpus;
pub mod error;
pub mod extraction;
pub mod metrics;
pub mod models;
pub mod render;
pub mod search;

pub use error::{AppError, Result};
