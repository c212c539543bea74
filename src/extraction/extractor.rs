use crate::error::{AppError, Result};
use crate::extraction::keywords::{
    module_baseline, ClassificationTables, WeightedKeyword, ENTITY_MODULE_WEIGHT,
    ERROR_CODE_TYPE_WEIGHT,
};
use crate::extraction::patterns::{error_code_prefix, extract_entities};
use crate::metrics::EXTRACTIONS_TOTAL;
use crate::models::{IncidentEntities, IncidentRecord, IncidentType, Module, Severity};
use crate::search::text::{collapse_whitespace, contains_keyword};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Confidence never exceeds this when module or type fell back to `Other`
const FALLBACK_CONFIDENCE_CAP: f64 = 0.2;

/// Entity count at which the entity share of confidence saturates
const ENTITY_SATURATION: usize = 3;

const ENTITY_SHARE: f64 = 0.4;
const MODULE_MARGIN_SHARE: f64 = 0.3;
const TYPE_MARGIN_SHARE: f64 = 0.3;

/// Accumulated weight per category, in table (priority) order
struct CategoryScores<C> {
    scores: Vec<(C, f64)>,
    hits: Vec<Vec<&'static str>>,
}

impl<C: Copy + PartialEq> CategoryScores<C> {
    fn score(text: &str, table: &[(C, &'static [WeightedKeyword])]) -> Self {
        let mut scores = Vec::with_capacity(table.len());
        let mut hits = Vec::with_capacity(table.len());

        for (category, keywords) in table {
            let mut total = 0.0;
            let mut matched = Vec::new();
            for (keyword, weight) in keywords.iter() {
                if contains_keyword(text, keyword) {
                    total += weight;
                    matched.push(*keyword);
                }
            }
            scores.push((*category, total));
            hits.push(matched);
        }

        Self { scores, hits }
    }

    fn add(&mut self, category: C, weight: f64) {
        if let Some((_, total)) = self.scores.iter_mut().find(|(c, _)| *c == category) {
            *total += weight;
        }
    }

    /// Highest total wins; earlier entries win ties. `None` when nothing scored.
    fn winner(&self) -> Option<(usize, C)> {
        let mut best: Option<(usize, C, f64)> = None;
        for (idx, (category, total)) in self.scores.iter().enumerate() {
            if *total <= 0.0 {
                continue;
            }
            match best {
                Some((_, _, top)) if *total <= top => {}
                _ => best = Some((idx, *category, *total)),
            }
        }
        best.map(|(idx, category, _)| (idx, category))
    }

    /// (top - second) / top, or 0 when nothing scored
    fn margin(&self) -> f64 {
        let mut totals: Vec<f64> = self.scores.iter().map(|(_, t)| *t).collect();
        totals.sort_by(|a, b| b.total_cmp(a));

        let top = totals.first().copied().unwrap_or(0.0);
        let second = totals.get(1).copied().unwrap_or(0.0);
        if top <= 0.0 {
            0.0
        } else {
            (top - second) / top
        }
    }
}

/// Turns raw incident text into an [`IncidentRecord`].
///
/// Pure: the same text always yields the same record.
#[derive(Debug, Clone, Default)]
pub struct IncidentExtractor {
    tables: ClassificationTables,
}

impl IncidentExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extractor over custom keyword tables
    pub fn with_tables(tables: ClassificationTables) -> Self {
        Self { tables }
    }

    /// Extract entities and classify the incident.
    ///
    /// Empty or whitespace-only text is rejected with `InvalidInput`.
    pub fn extract(&self, raw_text: &str) -> Result<IncidentRecord> {
        if raw_text.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "incident text is empty".to_string(),
            ));
        }

        let collapsed = collapse_whitespace(raw_text);
        let normalized = collapsed.to_lowercase();

        let entities = extract_entities(&collapsed);

        let mut modules = CategoryScores::score(&normalized, self.tables.modules);
        self.apply_entity_signals(&entities, &mut modules);

        let mut types = CategoryScores::score(&normalized, self.tables.incident_types);
        if !entities.error_codes.is_empty() {
            types.add(
                IncidentType::ErrorStatus,
                ERROR_CODE_TYPE_WEIGHT * entities.error_codes.len() as f64,
            );
        }

        let module_winner = modules.winner();
        let type_winner = types.winner();

        let module = module_winner.map(|(_, m)| m).unwrap_or(Module::Other);
        let incident_type = type_winner.map(|(_, t)| t).unwrap_or(IncidentType::Other);

        let mut keywords = BTreeSet::new();
        if let Some((idx, _)) = module_winner {
            keywords.extend(modules.hits[idx].iter().map(|k| k.to_string()));
        }
        if let Some((idx, _)) = type_winner {
            keywords.extend(types.hits[idx].iter().map(|k| k.to_string()));
        }

        let severity = self.severity(&normalized, module);

        let mut confidence = ENTITY_SHARE
            * entities.distinct_count().min(ENTITY_SATURATION) as f64
            / ENTITY_SATURATION as f64
            + MODULE_MARGIN_SHARE * modules.margin()
            + TYPE_MARGIN_SHARE * types.margin();
        if module == Module::Other || incident_type == IncidentType::Other {
            confidence = confidence.min(FALLBACK_CONFIDENCE_CAP);
        }
        let confidence = confidence.clamp(0.0, 1.0);

        debug!(
            "Classification scores: modules={:?} types={:?}",
            modules.scores, types.scores
        );

        let record = IncidentRecord {
            raw_text: raw_text.to_string(),
            entities,
            incident_type,
            module,
            severity,
            confidence,
            keywords: keywords.into_iter().collect(),
        };

        let module_label = module.to_string();
        let type_label = incident_type.to_string();
        EXTRACTIONS_TOTAL
            .with_label_values(&[module_label.as_str(), type_label.as_str()])
            .inc();

        info!(
            module = %record.module,
            incident_type = %record.incident_type,
            severity = %record.severity,
            confidence = record.confidence,
            entities = record.entities.distinct_count(),
            "Incident extracted"
        );

        Ok(record)
    }

    /// Structural entities that imply a module
    fn apply_entity_signals(&self, entities: &IncidentEntities, modules: &mut CategoryScores<Module>) {
        if !entities.container_ids.is_empty() {
            modules.add(Module::Container, ENTITY_MODULE_WEIGHT);
        }
        if !entities.vessel_names.is_empty() {
            modules.add(Module::Vessel, ENTITY_MODULE_WEIGHT);
        }
        for code in &entities.error_codes {
            let prefix = error_code_prefix(code);
            if let Some((_, module)) = self
                .tables
                .error_prefixes
                .iter()
                .find(|(p, _)| *p == prefix)
            {
                modules.add(*module, ENTITY_MODULE_WEIGHT);
            }
        }
    }

    /// Module baseline raised by the most severe cue present
    fn severity(&self, normalized: &str, module: Module) -> Severity {
        let cue = self
            .tables
            .severity_cues
            .iter()
            .filter(|(_, cues)| cues.iter().any(|c| contains_keyword(normalized, c)))
            .map(|(tier, _)| *tier)
            .max();

        let baseline = module_baseline(module);
        cue.map_or(baseline, |tier| tier.max(baseline))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConfidenceLevel;

    #[test]
    fn test_empty_input_rejected() {
        let extractor = IncidentExtractor::new();
        assert!(matches!(
            extractor.extract(""),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            extractor.extract("   \n\t "),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_edi_stuck_message() {
        let record = IncidentExtractor::new()
            .extract("EDI message REF-IFT-0007 stuck in ERROR status, ack_at is NULL")
            .unwrap();

        assert!(record.entities.reference_ids.contains("REF-IFT-0007"));
        assert_eq!(record.module, Module::Edi);
        assert_eq!(record.incident_type, IncidentType::StuckProcess);
        assert!(record.keywords.contains(&"stuck".to_string()));
        assert!(record.keywords.contains(&"edi".to_string()));
    }

    #[test]
    fn test_lowercase_container_id_extracted() {
        let record = IncidentExtractor::new()
            .extract("customer seeing duplicate containers for cmau0000020")
            .unwrap();

        assert!(record.entities.container_ids.contains("cmau0000020"));
        assert_eq!(record.module, Module::Container);
        assert_eq!(record.incident_type, IncidentType::DuplicateEntry);
    }

    #[test]
    fn test_contradictory_cues_resolved_by_weight() {
        // "container" (3) + container id (2) outweighs a single "vessel" (3)
        let record = IncidentExtractor::new()
            .extract("vessel loading shows duplicate container CMAU0000020")
            .unwrap();
        assert_eq!(record.module, Module::Container);

        // Equal weights fall back to priority order
        let record = IncidentExtractor::new()
            .extract("container and vessel both duplicate")
            .unwrap();
        assert_eq!(record.module, Module::Vessel);
    }

    #[test]
    fn test_no_signal_is_other_with_low_confidence() {
        let record = IncidentExtractor::new()
            .extract("Zebra quokka xylophone")
            .unwrap();
        assert_eq!(record.module, Module::Other);
        assert_eq!(record.incident_type, IncidentType::Other);
        assert_eq!(record.confidence_level(), ConfidenceLevel::Low);
        assert!(record.keywords.is_empty());
        assert_eq!(record.severity, Severity::Low);
    }

    #[test]
    fn test_severity_cues_raise_baseline() {
        let extractor = IncidentExtractor::new();

        let record = extractor.extract("EDI message stuck").unwrap();
        assert_eq!(record.severity, Severity::Medium);

        let record = extractor
            .extract("EDI message stuck, production down for all customers")
            .unwrap();
        assert_eq!(record.severity, Severity::Critical);

        let record = extractor.extract("minor vessel berth display glitch").unwrap();
        assert_eq!(record.severity, Severity::High);
    }

    #[test]
    fn test_more_entities_more_confidence() {
        let extractor = IncidentExtractor::new();
        let bare = extractor.extract("duplicate container").unwrap();
        let rich = extractor
            .extract("duplicate container CMAU0000020 CNTR_ERR_2 REF-GATE-11")
            .unwrap();
        assert!(rich.confidence > bare.confidence);
        assert!(rich.confidence <= 1.0);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let extractor = IncidentExtractor::new();
        let text = "Cannot create vessel advice for MV Lion City 07 - VESSEL_ERR_4";
        assert_eq!(extractor.extract(text).unwrap(), extractor.extract(text).unwrap());
    }
}
