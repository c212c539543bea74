//! Ranked retrieval over the three evidence corpora
//!
//! Each searcher scores every item of its corpus against an
//! [`IncidentRecord`](crate::models::IncidentRecord), drops zero scores, and
//! returns at most `limit` results in non-increasing score order with a
//! deterministic tie-break:
//!
//! - [`LogSearcher`]: weighted entity / keyword / token hits per log line,
//!   merged across services before truncation
//! - [`CaseMatcher`]: token overlap plus entity and module bonuses
//! - [`KbRetriever`]: matched-term count plus a heading bonus

pub mod cases;
pub mod knowledge;
pub mod logs;
pub mod ranking;
pub mod text;

pub use cases::CaseMatcher;
pub use knowledge::KbRetriever;
pub use logs::LogSearcher;

use crate::models::{EvidenceSource, IncidentRecord, MatchResult};
use std::sync::Arc;

/// A ranking strategy over one kind of corpus item.
///
/// The corpus arrives as shared segments (one per log service, a single one
/// for cases and passages) so nothing is copied before scoring.
pub trait Searcher: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    /// Which bundle slot the results fill
    fn source(&self) -> EvidenceSource;

    /// Rank `segments` against `record`, keeping at most `limit` results
    fn search(
        &self,
        record: &IncidentRecord,
        segments: &[Arc<[Self::Item]>],
        limit: usize,
    ) -> Vec<MatchResult<Self::Item>>;
}
