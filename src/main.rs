use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use llm_incident_context::{
    aggregation::ContextGatherer,
    config::Config,
    corpus::load_corpus,
    extraction::IncidentExtractor,
    render::{format_context_for_prompt, format_incident_summary},
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "llm-incident-context")]
#[command(about = "Assemble ranked evidence for an incident report", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract entities and classification from incident text
    Extract {
        /// Incident report text
        #[arg(short, long)]
        text: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Extract, then gather logs, cases and knowledge-base passages
    Analyze {
        /// Incident report text
        #[arg(short, long)]
        text: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Directory of `<service>.log` files (overrides configuration)
        #[arg(long, env = "INCIDENT_CTX_LOGS_DIR")]
        logs_dir: Option<PathBuf>,

        /// Case export, JSON or YAML (overrides configuration)
        #[arg(long)]
        cases: Option<PathBuf>,

        /// Knowledge-base export, JSON or YAML (overrides configuration)
        #[arg(long)]
        kb: Option<PathBuf>,

        /// Contact directory, JSON or YAML (overrides configuration)
        #[arg(long)]
        contacts: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Markdown,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize tracing (stderr, stdout carries the result)
    let json_logs = config.observability.json_logs;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("llm_incident_context={}", config.observability.log_level).into()
            }),
        )
        .with(json_logs.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    tracing::info!(
        "Starting {} v{}",
        config.observability.service_name,
        env!("CARGO_PKG_VERSION")
    );

    // Initialize Prometheus metrics
    if config.observability.prometheus_enabled {
        if let Err(e) = llm_incident_context::metrics::init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
        }
    }

    let extractor = IncidentExtractor::new();

    match cli.command {
        Commands::Extract { text, format } => {
            let record = extractor.extract(&text)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
                OutputFormat::Markdown => println!("{}", format_incident_summary(&record)),
            }
        }

        Commands::Analyze {
            text,
            format,
            logs_dir,
            cases,
            kb,
            contacts,
        } => {
            let record = extractor.extract(&text)?;

            let corpus_config = &mut config.corpus;
            corpus_config.logs_dir = logs_dir.or(corpus_config.logs_dir.take());
            corpus_config.cases_path = cases.or(corpus_config.cases_path.take());
            corpus_config.kb_path = kb.or(corpus_config.kb_path.take());
            corpus_config.contacts_path = contacts.or(corpus_config.contacts_path.take());

            let corpus = Arc::new(load_corpus(&config.corpus));
            let gatherer = ContextGatherer::new(corpus, &config)
                .context("cannot start evidence gathering")?;

            let bundle = gatherer.gather(&record).await;

            match format {
                OutputFormat::Json => {
                    let output = serde_json::json!({
                        "incident": record,
                        "context": bundle,
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Markdown => {
                    println!("{}", format_incident_summary(&record));
                    println!("{}", format_context_for_prompt(&bundle));
                }
            }
        }
    }

    Ok(())
}
