use std::env;

use ragdb_core::config::Config;
use ragdb_core::types::DEFAULT_NAMESPACE;
use ragdb_engine::RetrievalEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <query> [--namespace NS] [--k N] [--no-cache]", args[0]);
        std::process::exit(1);
    }
    let query_text = &args[1];
    let mut namespace = DEFAULT_NAMESPACE.to_string();
    let mut k: Option<usize> = None;
    let mut use_cache = true;
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--namespace" | "-n" => {
                if i + 1 < args.len() { namespace = args[i + 1].clone(); i += 1; }
                else { eprintln!("Error: --namespace requires a value"); std::process::exit(1); }
            }
            "--k" => {
                if i + 1 < args.len() { k = args[i + 1].parse().ok(); i += 1; }
                else { eprintln!("Error: --k requires a number"); std::process::exit(1); }
            }
            "--no-cache" => use_cache = false,
            _ => {}
        }
        i += 1;
    }

    let config = Config::load()?;
    let settings = config.engine_settings()?;
    let k = k.unwrap_or(settings.default_k);
    let engine = RetrievalEngine::open(settings).await?;

    let results = if use_cache {
        engine.retrieve(&namespace, query_text, k).await
    } else {
        engine.retrieve_uncached(&namespace, query_text, k).await
    };

    println!("🔍 Found {} results for: \"{}\"", results.len(), query_text);
    for (i, result) in results.iter().enumerate() {
        println!(
            "\n  {}. relevance={:.3}  distance={:.4}  {}#{}",
            i + 1,
            result.relevance_score,
            result.distance,
            result.metadata.filename,
            result.metadata.chunk_index
        );
        let preview: String = result.text.chars().take(240).collect();
        println!("     {}", preview);
    }
    Ok(())
}
