use std::{env, path::PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use walkdir::WalkDir;

use ragdb_core::chunker::ChunkingConfig;
use ragdb_core::config::Config;
use ragdb_core::types::{IngestMetadata, DEFAULT_NAMESPACE};
use ragdb_engine::RetrievalEngine;
use ragdb_extract::DocumentFormat;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let mut path: Option<PathBuf> = None;
    let mut namespace = DEFAULT_NAMESPACE.to_string();
    let mut session_id: Option<String> = None;
    let mut chunk_size: Option<usize> = None;
    let mut overlap: Option<usize> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--namespace" | "-n" => {
                if i + 1 < args.len() { namespace = args[i + 1].clone(); i += 1; }
                else { eprintln!("Error: --namespace requires a value"); std::process::exit(1); }
            }
            "--session" => {
                if i + 1 < args.len() { session_id = Some(args[i + 1].clone()); i += 1; }
                else { eprintln!("Error: --session requires a value"); std::process::exit(1); }
            }
            "--chunk-size" => {
                if i + 1 < args.len() { chunk_size = args[i + 1].parse().ok(); i += 1; }
                else { eprintln!("Error: --chunk-size requires a number"); std::process::exit(1); }
            }
            "--overlap" => {
                if i + 1 < args.len() { overlap = args[i + 1].parse().ok(); i += 1; }
                else { eprintln!("Error: --overlap requires a number"); std::process::exit(1); }
            }
            _ if !args[i].starts_with('-') => path = Some(PathBuf::from(&args[i])),
            _ => {}
        }
        i += 1;
    }
    let Some(path) = path else {
        eprintln!("Usage: ragdb-ingest <file-or-directory> [--namespace NS] [--session ID] [--chunk-size N] [--overlap N]");
        std::process::exit(1);
    };

    let config = Config::load()?;
    let settings = config.engine_settings()?;
    let chunking = ChunkingConfig {
        chunk_size: chunk_size.unwrap_or(settings.chunk_size),
        overlap: overlap.unwrap_or(settings.overlap),
    };
    let engine = RetrievalEngine::open(settings).await?;

    let files: Vec<PathBuf> = if path.is_dir() {
        let mut found: Vec<PathBuf> = WalkDir::new(&path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path().to_path_buf())
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .and_then(DocumentFormat::from_extension)
                    .is_some()
            })
            .collect();
        found.sort();
        found
    } else {
        vec![path.clone()]
    };
    if files.is_empty() {
        println!("No supported documents found under {}.", path.display());
        return Ok(());
    }

    println!("ragdb-ingest\n============");
    println!("Namespace: {}", namespace);
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?
            .progress_chars("#>-"),
    );

    let mut total_chunks = 0usize;
    for file in &files {
        let filename = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file.display().to_string());
        pb.set_message(filename.clone());
        let metadata = IngestMetadata {
            filename,
            namespace: namespace.clone(),
            session_id: session_id.clone(),
            doc_id: None,
        };
        match engine.ingest_with(file, metadata, &chunking).await {
            Ok(chunks) => {
                total_chunks += chunks.len();
                if let Some(first) = chunks.first() {
                    pb.println(format!(
                        "  {} -> {} chunks (doc_id {})",
                        file.display(),
                        chunks.len(),
                        first.metadata.doc_id
                    ));
                }
            }
            Err(e) => pb.println(format!("  {} skipped: {}", file.display(), e)),
        }
        pb.inc(1);
    }
    pb.finish_with_message("done");
    println!("\n✅ Ingested {} files, {} chunks total", files.len(), total_chunks);
    Ok(())
}
