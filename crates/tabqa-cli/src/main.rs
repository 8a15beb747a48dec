//! tabqa CLI — Q&A over mixed document/tabular knowledge bases.
//!
//! Commands: add, ask, schema, exec, drop. Knowledge bases live as
//! subdirectories of the data directory; each owns one SQLite store file
//! under `<data>/databases`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use serde::Deserialize;

use tabqa_chat::{ChatEngine, InMemoryDirectory, PlainTextExtractor};
use tabqa_core::ident::sanitize;
use tabqa_core::{FileRecord, KnowledgeBase};
use tabqa_llm::LlmConfig;
use tabqa_store::StoreManager;

#[derive(Parser)]
#[command(name = "tabqa")]
#[command(version)]
#[command(about = "Q&A over mixed document/tabular knowledge bases")]
struct Cli {
    /// Data directory holding knowledge-base files and stores.
    #[arg(long, default_value = ".tabqa")]
    data_dir: PathBuf,

    /// Provider configuration file (TOML with an [llm] section).
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Copy a file into a knowledge base, ingesting tabular formats
    Add { kb_id: String, file: PathBuf },
    /// Ask a natural-language question
    #[command(alias = "q")]
    Ask {
        kb_id: String,
        question: String,
        /// Continue an existing conversation
        #[arg(long)]
        conversation: Option<String>,
    },
    /// Show table metadata for a knowledge base
    Schema { kb_id: String },
    /// Execute a raw SQL statement (debugging)
    Exec { kb_id: String, sql: String },
    /// Remove a knowledge base's store
    Drop { kb_id: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CliConfig {
    llm: LlmConfig,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = StoreManager::new(cli.data_dir.join("databases"));

    match cli.command {
        Commands::Add { kb_id, file } => add(&cli.data_dir, &store, &kb_id, &file),
        Commands::Ask { kb_id, question, conversation } => {
            ask(&cli.data_dir, store, cli.config.as_deref(), &kb_id, &question, conversation.as_deref())
        }
        Commands::Schema { kb_id } => {
            let tables = store.schema(&kb_id)?;
            println!("{}", serde_json::to_string_pretty(&tables)?);
            Ok(())
        }
        Commands::Exec { kb_id, sql } => {
            let result = store.execute(&kb_id, &sql)?;
            println!("{}", tabqa_chat::formatter::format_result(&result));
            Ok(())
        }
        Commands::Drop { kb_id } => {
            store.drop_store(&kb_id)?;
            println!("dropped store for {kb_id}");
            Ok(())
        }
    }
}

/// Copy the file into the knowledge base directory; tabular files are also
/// ingested into the store. A failed ingestion removes the copied artifact
/// so no orphaned file survives.
fn add(data_dir: &Path, store: &StoreManager, kb_id: &str, file: &Path) -> anyhow::Result<()> {
    let Some(name) = file.file_name().and_then(|n| n.to_str()) else {
        bail!("{} has no usable file name", file.display());
    };
    let kb_dir = kb_dir(data_dir, kb_id);
    std::fs::create_dir_all(&kb_dir)?;
    let dest = kb_dir.join(name);
    std::fs::copy(file, &dest)
        .with_context(|| format!("cannot copy {} into knowledge base", file.display()))?;

    let file_id = file_id_for(name);
    let record = record_for(&dest)?;
    if record.is_tabular() {
        match store.ingest_tabular(kb_id, &file_id, &dest) {
            Ok(tables) => println!("{}", serde_json::to_string_pretty(&tables)?),
            Err(e) => {
                std::fs::remove_file(&dest).ok();
                return Err(e).context("ingestion failed; removed the copied file");
            }
        }
    } else {
        println!("added {name}");
    }
    Ok(())
}

fn ask(
    data_dir: &Path,
    store: StoreManager,
    config: Option<&Path>,
    kb_id: &str,
    question: &str,
    conversation: Option<&str>,
) -> anyhow::Result<()> {
    let llm_config = load_config(config)?;
    let api_key = std::env::var("TABQA_API_KEY").ok();
    let provider = tabqa_llm::build(&llm_config, api_key)?;

    let directory = Arc::new(scan_directory(data_dir)?);
    let engine = ChatEngine::new(
        directory,
        store,
        Arc::from(provider),
        Arc::new(PlainTextExtractor),
    );

    let response = engine.answer(kb_id, question, conversation, None);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<LlmConfig> {
    let Some(path) = path else {
        return Ok(LlmConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config {}", path.display()))?;
    let config: CliConfig = toml::from_str(&text).context("invalid config file")?;
    Ok(config.llm)
}

fn kb_dir(data_dir: &Path, kb_id: &str) -> PathBuf {
    data_dir.join("kbs").join(sanitize(kb_id))
}

fn file_id_for(name: &str) -> String {
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    sanitize(stem)
}

fn record_for(path: &Path) -> anyhow::Result<FileRecord> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .context("file name is not valid unicode")?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    let metadata = std::fs::metadata(path).ok();
    let size = metadata.as_ref().map(|m| m.len()).unwrap_or(0);
    let uploaded_at = metadata
        .and_then(|m| m.modified().ok())
        .map(chrono::DateTime::from);
    Ok(FileRecord {
        id: file_id_for(&name),
        name,
        path: path.to_string_lossy().into_owned(),
        file_type: ext,
        size,
        uploaded_at,
        tables: None,
    })
}

/// Build the knowledge-base directory by scanning `<data>/kbs/*`.
fn scan_directory(data_dir: &Path) -> anyhow::Result<InMemoryDirectory> {
    let directory = InMemoryDirectory::new();
    let kbs_root = data_dir.join("kbs");
    if !kbs_root.exists() {
        return Ok(directory);
    }

    for entry in std::fs::read_dir(&kbs_root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let kb_id = entry.file_name().to_string_lossy().into_owned();

        let mut files = Vec::new();
        let mut paths: Vec<PathBuf> = std::fs::read_dir(entry.path())?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect();
        paths.sort();
        for path in paths {
            files.push(record_for(&path)?);
        }

        directory.insert(KnowledgeBase {
            id: kb_id.clone(),
            name: kb_id,
            files,
        });
    }
    Ok(directory)
}
