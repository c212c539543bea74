pub mod loader;
pub mod memory;

pub use loader::load_corpus;
pub use memory::{InMemoryCorpus, InMemoryCorpusBuilder};

use crate::error::Result;
use crate::models::{CaseRecord, Contact, KbPassage, LogEntry, Module};
use std::sync::Arc;

/// Read-only access to the evidence corpora.
///
/// Implementations hand out already-materialized, immutable data. An accessor
/// returns `AppError::MissingCorpus` when its source cannot be supplied; the
/// gatherer turns that into a warning on the bundle.
pub trait CorpusSource: Send + Sync + 'static {
    /// Services that have (or should have) a log corpus
    fn service_names(&self) -> Vec<String>;

    /// Log lines of one service
    fn log_lines(&self, service_name: &str) -> Result<Arc<[LogEntry]>>;

    /// Historical cases
    fn cases(&self) -> Result<Arc<[CaseRecord]>>;

    /// Knowledge-base passages
    fn kb_passages(&self) -> Result<Arc<[KbPassage]>>;

    /// Every contact owning a module, whatever their role
    fn contacts(&self, module: Module) -> Result<Vec<Contact>>;

    /// Management pulled in for an urgent incident in `module`: the module's
    /// own managers plus the cross-module management group (`Module::Other`)
    fn management_contacts(&self, _module: Module) -> Result<Vec<Contact>> {
        Ok(Vec::new())
    }
}
