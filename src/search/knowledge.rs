use crate::config::RetrievalConfig;
use crate::models::{EvidenceSource, IncidentRecord, KbPassage, MatchResult};
use crate::search::ranking::{clamp_score, rank_by};
use crate::search::text::{contains_keyword, contains_term, normalize};
use crate::search::Searcher;
use std::sync::Arc;
use tracing::debug;

/// Ranks knowledge-base passages by matched terms and heading relevance
#[derive(Debug, Clone)]
pub struct KbRetriever {
    term_weight: f64,
    heading_bonus: f64,
    max_raw_score: f64,
}

struct KbQuery {
    keywords: Vec<String>,
    entity_values: Vec<String>,
    heading_terms: Vec<&'static str>,
}

impl KbRetriever {
    pub fn new(config: &RetrievalConfig) -> Self {
        Self {
            term_weight: config.kb_term_weight,
            heading_bonus: config.kb_heading_bonus,
            max_raw_score: config.kb_max_raw_score,
        }
    }

    fn prepare(record: &IncidentRecord) -> KbQuery {
        let mut heading_terms: Vec<&'static str> = record.module.heading_terms().to_vec();
        heading_terms.extend_from_slice(record.incident_type.heading_terms());

        KbQuery {
            keywords: record.keywords.clone(),
            entity_values: record.entities.values().map(|v| v.to_lowercase()).collect(),
            heading_terms,
        }
    }

    fn score_passage(&self, passage: &KbPassage, query: &KbQuery) -> f64 {
        let text = normalize(&passage.text);

        let matched_terms = query
            .keywords
            .iter()
            .filter(|k| contains_keyword(&text, k))
            .count()
            + query
                .entity_values
                .iter()
                .filter(|v| contains_term(&text, v))
                .count();

        let mut raw = matched_terms as f64 * self.term_weight;

        let heading_hit = passage.heading_path.iter().any(|heading| {
            let heading = normalize(heading);
            query
                .heading_terms
                .iter()
                .any(|term| contains_keyword(&heading, term))
        });
        if heading_hit {
            raw += self.heading_bonus;
        }

        clamp_score(raw.min(self.max_raw_score) / self.max_raw_score)
    }
}

impl Searcher for KbRetriever {
    type Item = KbPassage;

    fn source(&self) -> EvidenceSource {
        EvidenceSource::KnowledgeBase
    }

    fn search(
        &self,
        record: &IncidentRecord,
        segments: &[Arc<[KbPassage]>],
        limit: usize,
    ) -> Vec<MatchResult<KbPassage>> {
        let query = Self::prepare(record);

        let scored: Vec<MatchResult<KbPassage>> = segments
            .iter()
            .flat_map(|s| s.iter())
            .filter_map(|passage| {
                let score = self.score_passage(passage, &query);
                (score > 0.0).then(|| MatchResult::new(passage.clone(), score))
            })
            .collect();

        debug!("KB retriever scored {} passages", scored.len());

        rank_by(scored, limit, |a, b| a.passage_index.cmp(&b.passage_index))
    }
}
