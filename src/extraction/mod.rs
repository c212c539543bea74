//! Entity extraction and incident classification
//!
//! Structural patterns pull typed entities out of the text; weighted keyword
//! tables (plain data in [`keywords`]) pick the module, incident type and
//! severity.

pub mod extractor;
pub mod keywords;
pub mod patterns;

pub use extractor::IncidentExtractor;
pub use keywords::ClassificationTables;
pub use patterns::extract_entities;
