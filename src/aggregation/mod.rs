//! Fan-out/fan-in assembly of the evidence bundle
//!
//! The gatherer runs the log, case and knowledge-base searches (in parallel
//! or one after another), each bounded by its own timeout. A source that is
//! missing or too slow degrades to an empty list plus a [`SourceWarning`];
//! only startup without any corpus is fatal.
//!
//! [`SourceWarning`]: crate::models::SourceWarning

pub mod analysis;
pub mod contacts;
pub mod gatherer;

pub use analysis::analyze_logs;
pub use contacts::{route_contacts, ContactRouting};
pub use gatherer::ContextGatherer;
