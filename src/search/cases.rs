use crate::config::RetrievalConfig;
use crate::models::{CaseRecord, EvidenceSource, IncidentRecord, MatchResult, Module};
use crate::search::ranking::{clamp_score, rank_by};
use crate::search::text::{contains_term, jaccard, normalize, tokenize};
use crate::search::Searcher;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Ranks historical cases by similarity to the incident.
///
/// `score = (α·overlap + β·entity + γ·module) / (α + β·[has entities] + γ·[module known])`
///
/// `entity` is the fraction of the incident's entity values that appear in the
/// case description as whole values.
///
/// The denominator only counts bonuses the incident can earn, so a case whose
/// description is the incident text scores exactly 1.0.
#[derive(Debug, Clone)]
pub struct CaseMatcher {
    alpha: f64,
    beta: f64,
    gamma: f64,
}

struct CaseQuery {
    tokens: BTreeSet<String>,
    entity_values: Vec<String>,
    module: Module,
    max_weight: f64,
}

impl CaseMatcher {
    pub fn new(config: &RetrievalConfig) -> Self {
        Self {
            alpha: config.alpha,
            beta: config.beta,
            gamma: config.gamma,
        }
    }

    fn prepare(&self, record: &IncidentRecord) -> CaseQuery {
        let mut tokens = tokenize(&record.raw_text);
        for value in record.entities.values() {
            tokens.extend(tokenize(value));
        }

        let entity_values: Vec<String> =
            record.entities.values().map(|v| v.to_lowercase()).collect();

        let mut max_weight = self.alpha;
        if !entity_values.is_empty() {
            max_weight += self.beta;
        }
        if record.module != Module::Other {
            max_weight += self.gamma;
        }

        CaseQuery {
            tokens,
            entity_values,
            module: record.module,
            max_weight,
        }
    }

    fn score_case(&self, case: &CaseRecord, query: &CaseQuery) -> f64 {
        let overlap = jaccard(&query.tokens, &case.keywords);

        let mut score = self.alpha * overlap;

        if !query.entity_values.is_empty() {
            let description = normalize(&case.description);
            let found = query
                .entity_values
                .iter()
                .filter(|v| contains_term(&description, v))
                .count();
            score += self.beta * found as f64 / query.entity_values.len() as f64;
        }

        let module_hit = query.module != Module::Other && query.module == case.module;
        if module_hit {
            score += self.gamma;
        }

        clamp_score(score / query.max_weight)
    }
}

impl Searcher for CaseMatcher {
    type Item = CaseRecord;

    fn source(&self) -> EvidenceSource {
        EvidenceSource::Cases
    }

    fn search(
        &self,
        record: &IncidentRecord,
        segments: &[Arc<[CaseRecord]>],
        limit: usize,
    ) -> Vec<MatchResult<CaseRecord>> {
        let query = self.prepare(record);

        // First occurrence of a case_id wins
        let mut seen = HashSet::new();
        let scored: Vec<MatchResult<CaseRecord>> = segments
            .iter()
            .flat_map(|s| s.iter())
            .filter(|case| seen.insert(case.case_id.clone()))
            .filter_map(|case| {
                let score = self.score_case(case, &query);
                (score > 0.0).then(|| MatchResult::new(case.clone(), score))
            })
            .collect();

        debug!("Case matcher scored {} candidate cases", scored.len());

        rank_by(scored, limit, |a, b| a.case_id.cmp(&b.case_id))
    }
}
