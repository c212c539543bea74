use crate::aggregation::analysis::analyze_logs;
use crate::aggregation::contacts::route_contacts;
use crate::config::{AggregationConfig, Config, RetrievalConfig};
use crate::corpus::CorpusSource;
use crate::error::{AppError, Result};
use crate::metrics::{BUNDLE_CACHE_TOTAL, DEGRADED_SOURCES_TOTAL, SEARCH_DURATION_SECONDS};
use crate::models::{
    CaseRecord, ContextBundle, EvidenceSource, IncidentRecord, KbPassage, LogEntry, MatchResult,
    SourceWarning,
};
use crate::search::{CaseMatcher, KbRetriever, LogSearcher, Searcher};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Corpus segments handed to a searcher, plus what could not be fetched
struct Fetched<T> {
    segments: Vec<Arc<[T]>>,
    warnings: Vec<SourceWarning>,
}

type SearchOutcome<T> = (Vec<MatchResult<T>>, Vec<SourceWarning>);

/// Fans an incident out to the three searchers and assembles the bundle.
///
/// Built once over an immutable corpus handle; `gather` can be called
/// concurrently and repeatedly.
pub struct ContextGatherer {
    corpus: Arc<dyn CorpusSource>,
    log_searcher: Arc<LogSearcher>,
    case_matcher: Arc<CaseMatcher>,
    kb_retriever: Arc<KbRetriever>,
    retrieval: RetrievalConfig,
    config: AggregationConfig,

    /// Complete bundles by incident fingerprint
    cache: Arc<DashMap<String, (ContextBundle, Instant)>>,
}

impl ContextGatherer {
    /// Build a gatherer, refusing to start when no corpus at all is reachable
    pub fn new(corpus: Arc<dyn CorpusSource>, config: &Config) -> Result<Self> {
        config.validate()?;

        let services = corpus.service_names();
        let live_services = services
            .iter()
            .filter(|s| corpus.log_lines(s).is_ok())
            .count();
        let has_cases = corpus.cases().is_ok();
        let has_kb = corpus.kb_passages().is_ok();

        if live_services == 0 && !has_cases && !has_kb {
            return Err(AppError::CorpusUnavailable(
                "no log service, case corpus or knowledge base could be loaded".to_string(),
            ));
        }

        info!(
            "Context gatherer ready: {}/{} log services, cases: {}, knowledge base: {}",
            live_services,
            services.len(),
            has_cases,
            has_kb
        );

        Ok(Self {
            corpus,
            log_searcher: Arc::new(LogSearcher::new(&config.retrieval)),
            case_matcher: Arc::new(CaseMatcher::new(&config.retrieval)),
            kb_retriever: Arc::new(KbRetriever::new(&config.retrieval)),
            retrieval: config.retrieval.clone(),
            config: config.aggregation.clone(),
            cache: Arc::new(DashMap::new()),
        })
    }

    /// Assemble the evidence bundle for `record`.
    ///
    /// Never fails: a source that is missing, times out or crashes contributes
    /// an empty match list and a warning.
    pub async fn gather(&self, record: &IncidentRecord) -> ContextBundle {
        let span = info_span!(
            "gather",
            request_id = %Uuid::new_v4(),
            module = %record.module,
            incident_type = %record.incident_type
        );

        async {
            let fingerprint = record.fingerprint();
            if let Some(bundle) = self.get_cached_bundle(&fingerprint) {
                debug!("Using cached bundle");
                return bundle;
            }

            let start = Instant::now();
            let bundle = self.assemble(record).await;

            info!(
                "Gathered {} logs, {} cases, {} passages in {}ms ({} warnings)",
                bundle.log_matches.len(),
                bundle.case_matches.len(),
                bundle.kb_matches.len(),
                start.elapsed().as_millis(),
                bundle.warnings.len()
            );

            if bundle.is_complete() {
                self.cache_bundle(fingerprint, bundle.clone());
            }
            bundle
        }
        .instrument(span)
        .await
    }

    async fn assemble(&self, record: &IncidentRecord) -> ContextBundle {
        let shared = Arc::new(record.clone());

        let logs = self.run_search(
            Arc::clone(&self.log_searcher),
            Arc::clone(&shared),
            self.retrieval.log_top_k,
            fetch_logs,
        );
        let cases = self.run_search(
            Arc::clone(&self.case_matcher),
            Arc::clone(&shared),
            self.retrieval.case_top_n,
            fetch_cases,
        );
        let kb = self.run_search(
            Arc::clone(&self.kb_retriever),
            Arc::clone(&shared),
            self.retrieval.kb_top_m,
            fetch_kb,
        );

        let ((log_matches, log_warnings), (case_matches, case_warnings), (kb_matches, kb_warnings)) =
            if self.config.parallel {
                tokio::join!(logs, cases, kb)
            } else {
                (logs.await, cases.await, kb.await)
            };

        let mut warnings = Vec::new();
        warnings.extend(log_warnings);
        warnings.extend(case_warnings);
        warnings.extend(kb_warnings);

        let routing = match route_contacts(self.corpus.as_ref(), record, self.config.escalate_management) {
            Ok(routing) => routing,
            Err(e) => {
                warn!("Contacts unavailable: {}", e);
                warnings.push(SourceWarning::from_error(EvidenceSource::Contacts, &e));
                Default::default()
            }
        };

        for warning in &warnings {
            let source = warning.source.to_string();
            let reason = warning.kind.to_string();
            DEGRADED_SOURCES_TOTAL
                .with_label_values(&[source.as_str(), reason.as_str()])
                .inc();
        }

        let log_analysis = analyze_logs(&log_matches);

        ContextBundle {
            search_terms: record.search_terms(),
            log_matches,
            case_matches,
            kb_matches,
            contacts: routing.contacts,
            escalation_contacts: routing.escalation_contacts,
            log_analysis,
            warnings,
        }
    }

    /// Fetch and search one source on the blocking pool, bounded by the budget
    async fn run_search<S, F>(
        &self,
        searcher: Arc<S>,
        record: Arc<IncidentRecord>,
        limit: usize,
        fetch: F,
    ) -> SearchOutcome<S::Item>
    where
        S: Searcher,
        F: FnOnce(&dyn CorpusSource) -> Fetched<S::Item> + Send + 'static,
    {
        let source = searcher.source();
        let source_label = source.to_string();
        let corpus = Arc::clone(&self.corpus);
        let budget_ms = self.config.search_timeout_ms;
        let started = Instant::now();

        let task = tokio::task::spawn_blocking(move || {
            let fetched = fetch(corpus.as_ref());
            let matches = searcher.search(&record, &fetched.segments, limit);
            (matches, fetched.warnings)
        });

        let outcome = match timeout(Duration::from_millis(budget_ms), task).await {
            Ok(Ok((matches, warnings))) => {
                debug!("{} search returned {} matches", source, matches.len());
                (matches, warnings)
            }
            Ok(Err(join_error)) => {
                let err = AppError::Internal(format!("{} search task failed: {}", source, join_error));
                error!("{}", err);
                (Vec::new(), vec![SourceWarning::from_error(source, &err)])
            }
            Err(_) => {
                let err = AppError::SearchTimeout {
                    source_name: source.to_string(),
                    timeout_ms: budget_ms,
                };
                error!("{}", err);
                (Vec::new(), vec![SourceWarning::from_error(source, &err)])
            }
        };

        SEARCH_DURATION_SECONDS
            .with_label_values(&[source_label.as_str()])
            .observe(started.elapsed().as_secs_f64());

        outcome
    }

    fn get_cached_bundle(&self, fingerprint: &str) -> Option<ContextBundle> {
        if self.config.cache_ttl_secs == 0 {
            return None;
        }

        if let Some(entry) = self.cache.get(fingerprint) {
            let (bundle, cached_at) = entry.value();

            if cached_at.elapsed().as_secs() < self.config.cache_ttl_secs {
                BUNDLE_CACHE_TOTAL.with_label_values(&["hit"]).inc();
                return Some(bundle.clone());
            } else {
                // Remove expired entry
                drop(entry);
                self.cache.remove(fingerprint);
            }
        }

        BUNDLE_CACHE_TOTAL.with_label_values(&["miss"]).inc();
        None
    }

    fn cache_bundle(&self, fingerprint: String, bundle: ContextBundle) {
        if self.config.cache_ttl_secs > 0 {
            self.clear_expired_cache();
            self.cache.insert(fingerprint, (bundle, Instant::now()));
        }
    }

    /// Clear cache
    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("Bundle cache cleared");
    }

    /// Drop entries older than the TTL
    pub fn clear_expired_cache(&self) {
        let ttl = self.config.cache_ttl_secs;
        self.cache
            .retain(|_, (_, cached_at)| cached_at.elapsed().as_secs() < ttl);
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

fn fetch_logs(corpus: &dyn CorpusSource) -> Fetched<LogEntry> {
    let mut segments = Vec::new();
    let mut warnings = Vec::new();

    for service in corpus.service_names() {
        match corpus.log_lines(&service) {
            Ok(lines) => segments.push(lines),
            Err(e) => {
                warn!("Log corpus for {} unavailable: {}", service, e);
                warnings.push(SourceWarning::from_error(EvidenceSource::Logs, &e));
            }
        }
    }

    Fetched { segments, warnings }
}

fn fetch_cases(corpus: &dyn CorpusSource) -> Fetched<CaseRecord> {
    single_segment(EvidenceSource::Cases, corpus.cases())
}

fn fetch_kb(corpus: &dyn CorpusSource) -> Fetched<KbPassage> {
    single_segment(EvidenceSource::KnowledgeBase, corpus.kb_passages())
}

fn single_segment<T>(source: EvidenceSource, fetched: Result<Arc<[T]>>) -> Fetched<T> {
    match fetched {
        Ok(items) => Fetched {
            segments: vec![items],
            warnings: Vec::new(),
        },
        Err(e) => {
            warn!("{} corpus unavailable: {}", source, e);
            Fetched {
                segments: Vec::new(),
                warnings: vec![SourceWarning::from_error(source, &e)],
            }
        }
    }
}
