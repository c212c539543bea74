use crate::corpus::CorpusSource;
use crate::error::{AppError, Result};
use crate::models::{CaseRecord, Contact, ContactRole, KbPassage, LogEntry, Module};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Corpus handle built once at startup and shared by reference.
///
/// A `None` slot marks a source that failed to load; asking for it yields
/// `MissingCorpus` while the other sources keep working.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCorpus {
    logs: BTreeMap<String, Option<Arc<[LogEntry]>>>,
    cases: Option<Arc<[CaseRecord]>>,
    kb_passages: Option<Arc<[KbPassage]>>,
    contacts: Option<Arc<[Contact]>>,
}

impl InMemoryCorpus {
    pub fn builder() -> InMemoryCorpusBuilder {
        InMemoryCorpusBuilder::default()
    }

    /// Services whose log corpus is actually present
    pub fn available_services(&self) -> usize {
        self.logs.values().filter(|l| l.is_some()).count()
    }

    pub fn has_cases(&self) -> bool {
        self.cases.is_some()
    }

    pub fn has_kb(&self) -> bool {
        self.kb_passages.is_some()
    }

    fn all_contacts(&self) -> Result<&Arc<[Contact]>> {
        self.contacts
            .as_ref()
            .ok_or_else(|| AppError::missing_corpus("contacts", "contact directory not loaded"))
    }
}

impl CorpusSource for InMemoryCorpus {
    fn service_names(&self) -> Vec<String> {
        self.logs.keys().cloned().collect()
    }

    fn log_lines(&self, service_name: &str) -> Result<Arc<[LogEntry]>> {
        match self.logs.get(service_name) {
            Some(Some(lines)) => Ok(Arc::clone(lines)),
            Some(None) => Err(AppError::missing_corpus(
                format!("logs/{}", service_name),
                "log file could not be loaded",
            )),
            None => Err(AppError::missing_corpus(
                format!("logs/{}", service_name),
                "unknown service",
            )),
        }
    }

    fn cases(&self) -> Result<Arc<[CaseRecord]>> {
        self.cases
            .clone()
            .ok_or_else(|| AppError::missing_corpus("cases", "case log not loaded"))
    }

    fn kb_passages(&self) -> Result<Arc<[KbPassage]>> {
        self.kb_passages
            .clone()
            .ok_or_else(|| AppError::missing_corpus("knowledge_base", "knowledge base not loaded"))
    }

    fn contacts(&self, module: Module) -> Result<Vec<Contact>> {
        Ok(self
            .all_contacts()?
            .iter()
            .filter(|c| c.module == module)
            .cloned()
            .collect())
    }

    fn management_contacts(&self, module: Module) -> Result<Vec<Contact>> {
        Ok(self
            .all_contacts()?
            .iter()
            .filter(|c| c.role == ContactRole::Management)
            .filter(|c| c.module == module || c.module == Module::Other)
            .cloned()
            .collect())
    }
}

/// Builder for [`InMemoryCorpus`]
#[derive(Debug, Default)]
pub struct InMemoryCorpusBuilder {
    corpus: InMemoryCorpus,
}

impl InMemoryCorpusBuilder {
    /// Log lines for a service
    pub fn service_logs(mut self, service_name: impl Into<String>, lines: Vec<LogEntry>) -> Self {
        self.corpus.logs.insert(service_name.into(), Some(lines.into()));
        self
    }

    /// Parse raw log text for a service
    pub fn service_log_text(self, service_name: impl Into<String>, text: &str) -> Self {
        let service_name = service_name.into();
        let lines = text
            .lines()
            .enumerate()
            .filter_map(|(idx, line)| LogEntry::parse_line(&service_name, idx + 1, line))
            .collect();
        self.service_logs(service_name, lines)
    }

    /// A known service whose logs could not be supplied
    pub fn unavailable_service(mut self, service_name: impl Into<String>) -> Self {
        self.corpus.logs.insert(service_name.into(), None);
        self
    }

    pub fn cases(mut self, cases: Vec<CaseRecord>) -> Self {
        self.corpus.cases = Some(cases.into());
        self
    }

    pub fn kb_passages(mut self, passages: Vec<KbPassage>) -> Self {
        self.corpus.kb_passages = Some(passages.into());
        self
    }

    pub fn contacts(mut self, contacts: Vec<Contact>) -> Self {
        self.corpus.contacts = Some(contacts.into());
        self
    }

    pub fn build(self) -> InMemoryCorpus {
        self.corpus
    }
}
