use crate::config::RetrievalConfig;
use crate::models::{EvidenceSource, IncidentRecord, LogEntry, MatchResult};
use crate::search::ranking::{clamp_score, rank_by};
use crate::search::text::{contains_keyword, contains_term, normalize, tokenize};
use crate::search::Searcher;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Ranks log lines by weighted term hits
#[derive(Debug, Clone)]
pub struct LogSearcher {
    w_entity: f64,
    w_keyword: f64,
    w_token: f64,
}

/// Per-request view of the incident, prepared once and shared by all lines
struct LogQuery {
    entity_values: Vec<String>,
    keywords: Vec<String>,
    tokens: BTreeSet<String>,
    max_weight: f64,
}

impl LogSearcher {
    pub fn new(config: &RetrievalConfig) -> Self {
        Self {
            w_entity: config.w_entity,
            w_keyword: config.w_keyword,
            w_token: config.w_token,
        }
    }

    fn prepare(&self, record: &IncidentRecord) -> LogQuery {
        let entity_values: Vec<String> = record.entities.values().map(|v| v.to_lowercase()).collect();
        let keywords = record.keywords.clone();
        let tokens = tokenize(&record.raw_text);

        // Only components the incident can actually hit count towards the maximum
        let mut max_weight = 0.0;
        if !entity_values.is_empty() {
            max_weight += self.w_entity;
        }
        if !keywords.is_empty() {
            max_weight += self.w_keyword;
        }
        if !tokens.is_empty() {
            max_weight += self.w_token;
        }

        LogQuery {
            entity_values,
            keywords,
            tokens,
            max_weight,
        }
    }

    fn score_line(&self, entry: &LogEntry, query: &LogQuery) -> f64 {
        if query.max_weight <= 0.0 {
            return 0.0;
        }

        let line = normalize(&entry.raw_line);
        let mut score = 0.0;

        if query.entity_values.iter().any(|v| contains_term(&line, v)) {
            score += self.w_entity;
        }

        if query.keywords.iter().any(|k| contains_keyword(&line, k)) {
            score += self.w_keyword;
        }

        if !query.tokens.is_empty() {
            let line_tokens = tokenize(&line);
            let shared = line_tokens.intersection(&query.tokens).count();
            score += self.w_token * shared as f64 / query.tokens.len() as f64;
        }

        clamp_score(score / query.max_weight)
    }
}

impl Searcher for LogSearcher {
    type Item = LogEntry;

    fn source(&self) -> EvidenceSource {
        EvidenceSource::Logs
    }

    fn search(
        &self,
        record: &IncidentRecord,
        segments: &[Arc<[LogEntry]>],
        limit: usize,
    ) -> Vec<MatchResult<LogEntry>> {
        let query = self.prepare(record);
        let entries: Vec<&LogEntry> = segments.iter().flat_map(|s| s.iter()).collect();

        let scored: Vec<MatchResult<LogEntry>> = entries
            .par_iter()
            .filter_map(|entry| {
                let score = self.score_line(entry, &query);
                (score > 0.0).then(|| MatchResult::new((*entry).clone(), score))
            })
            .collect();

        debug!(
            "Log search scored {} of {} lines across {} services",
            scored.len(),
            entries.len(),
            segments.len()
        );

        rank_by(scored, limit, newest_first)
    }
}

/// Newer lines first, untimestamped lines last, then by position
fn newest_first(a: &LogEntry, b: &LogEntry) -> Ordering {
    let by_time = match (&a.timestamp, &b.timestamp) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    by_time
        .then_with(|| a.service_name.cmp(&b.service_name))
        .then_with(|| a.line_number.cmp(&b.line_number))
}
