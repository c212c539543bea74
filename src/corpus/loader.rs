use crate::config::CorpusConfig;
use crate::corpus::{InMemoryCorpus, InMemoryCorpusBuilder};
use crate::error::{AppError, Result};
use crate::metrics::CORPUS_ITEMS;
use crate::models::{CaseRecord, Contact, KbPassage};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Knowledge-base export row; the index defaults to the row position
#[derive(Debug, Deserialize)]
struct RawKbPassage {
    #[serde(default)]
    heading_path: Vec<String>,
    text: String,
    #[serde(default)]
    passage_index: Option<usize>,
}

/// Load every configured corpus from disk.
///
/// A source that is not configured or fails to load is left unavailable and
/// logged; the gatherer decides later whether enough is present to run.
pub fn load_corpus(config: &CorpusConfig) -> InMemoryCorpus {
    let mut builder = InMemoryCorpus::builder();

    if let Some(dir) = &config.logs_dir {
        builder = load_logs(builder, dir);
    } else {
        warn!("No logs directory configured");
    }

    match config.cases_path.as_deref().map(load_records::<CaseRecord>) {
        Some(Ok(cases)) => {
            info!("Loaded {} historical cases", cases.len());
            CORPUS_ITEMS.with_label_values(&["cases"]).set(cases.len() as f64);
            builder = builder.cases(cases);
        }
        Some(Err(e)) => warn!("Case corpus unavailable: {}", e),
        None => warn!("No case corpus configured"),
    }

    match config.kb_path.as_deref().map(load_kb) {
        Some(Ok(passages)) => {
            info!("Loaded {} knowledge-base passages", passages.len());
            CORPUS_ITEMS
                .with_label_values(&["knowledge_base"])
                .set(passages.len() as f64);
            builder = builder.kb_passages(passages);
        }
        Some(Err(e)) => warn!("Knowledge base unavailable: {}", e),
        None => warn!("No knowledge base configured"),
    }

    match config.contacts_path.as_deref().map(load_records::<Contact>) {
        Some(Ok(contacts)) => {
            info!("Loaded {} escalation contacts", contacts.len());
            builder = builder.contacts(contacts);
        }
        Some(Err(e)) => warn!("Contact directory unavailable: {}", e),
        None => warn!("No contact directory configured"),
    }

    builder.build()
}

/// One `<service>.log` file per service
fn load_logs(mut builder: InMemoryCorpusBuilder, dir: &Path) -> InMemoryCorpusBuilder {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot read logs directory {}: {}", dir.display(), e);
            return builder;
        }
    };

    let mut files: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .collect();
    files.sort();

    let mut total = 0usize;
    for path in files {
        let Some(service) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };

        match fs::read_to_string(&path) {
            Ok(text) => {
                let lines = text.lines().filter(|l| !l.trim().is_empty()).count();
                total += lines;
                builder = builder.service_log_text(service, &text);
            }
            Err(e) => {
                warn!("Log file {} unavailable: {}", path.display(), e);
                builder = builder.unavailable_service(service);
            }
        }
    }

    info!("Loaded {} log lines from {}", total, dir.display());
    CORPUS_ITEMS.with_label_values(&["logs"]).set(total as f64);
    builder
}

fn load_kb(path: &Path) -> Result<Vec<KbPassage>> {
    let rows: Vec<RawKbPassage> = load_records(path)?;
    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(position, row)| {
            KbPassage::new(
                row.heading_path,
                row.text,
                row.passage_index.unwrap_or(position),
            )
        })
        .collect())
}

/// Parse a JSON or YAML export, chosen by file extension
fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let text = fs::read_to_string(path)?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&text)?),
        Some("json") => Ok(serde_json::from_str(&text)?),
        other => Err(AppError::Configuration(format!(
            "unsupported corpus format {:?} for {}",
            other.unwrap_or(""),
            path.display()
        ))),
    }
}
