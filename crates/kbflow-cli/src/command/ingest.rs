//! `kbflow ingest`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use kbflow_core::retrieval::{Record, RetrievalService};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::TRACING_TARGET_COMMAND;
use crate::config::{Cli, Providers};

/// Arguments for `kbflow ingest`.
#[derive(Debug, Clone, Serialize, Deserialize, Args)]
pub struct IngestArgs {
    /// Collection to add the chunks to.
    #[arg(long, short, default_value = "knowledge_base")]
    pub collection: String,

    /// Path to a JSON array of document chunks.
    #[arg(long)]
    pub chunks: PathBuf,

    /// Identifier used as the record id prefix. Random when omitted.
    #[arg(long)]
    pub file_id: Option<String>,

    /// Value of the `source` metadata field. Defaults to the chunks file name.
    #[arg(long)]
    pub source: Option<String>,

    /// Skip the Ollama and Chroma reachability check before ingesting.
    #[arg(long)]
    #[serde(default)]
    pub skip_health_check: bool,
}

impl IngestArgs {
    fn file_id(&self) -> String {
        self.file_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }

    fn source(&self) -> String {
        self.source.clone().unwrap_or_else(|| {
            self.chunks
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.chunks.display().to_string())
        })
    }
}

pub(super) async fn execute(cli: &Cli, args: &IngestArgs) -> anyhow::Result<()> {
    let chunks = read_chunks(&args.chunks).await?;
    let providers = Providers::new(&cli.ollama, &cli.chroma)?;
    if !args.skip_health_check {
        providers.check().await?;
    }
    let retrieval = providers.into_retrieval_service();

    let count = ingest(&retrieval, &args.collection, &args.file_id(), &args.source(), chunks)
        .await?;

    println!("Added {count} chunks to '{}'", args.collection);
    Ok(())
}

async fn read_chunks(path: &Path) -> anyhow::Result<Vec<String>> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read chunks '{}'", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("'{}' is not a JSON array of strings", path.display()))
}

/// Builds one record per chunk, numbered in input order.
fn records(file_id: &str, source: &str, chunks: Vec<String>) -> Vec<Record> {
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            Record::new(format!("{file_id}_{i}"), chunk)
                .with_field("source", source)
                .with_field("chunk_index", i)
        })
        .collect()
}

async fn ingest(
    retrieval: &RetrievalService,
    collection: &str,
    file_id: &str,
    source: &str,
    chunks: Vec<String>,
) -> anyhow::Result<usize> {
    let chunks: Vec<String> = chunks
        .into_iter()
        .filter(|chunk| !chunk.trim().is_empty())
        .collect();
    if chunks.is_empty() {
        tracing::warn!(
            target: TRACING_TARGET_COMMAND,
            collection = %collection,
            "No chunks to ingest"
        );
        return Ok(0);
    }

    let records = records(file_id, source, chunks);
    let count = records.len();

    let handle = retrieval
        .collection(collection)
        .await
        .with_context(|| format!("failed to open collection '{collection}'"))?;
    handle
        .add(records)
        .await
        .with_context(|| format!("failed to add chunks to '{collection}'"))?;

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        collection = %collection,
        file_id = %file_id,
        count,
        "Ingested chunks"
    );

    Ok(count)
}
