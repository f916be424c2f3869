use std::env;

use ragdb_core::config::Config;
use ragdb_core::types::DEFAULT_NAMESPACE;
use ragdb_engine::RetrievalEngine;

const USAGE: &str = "Usage: ragdb-admin <command>
Commands:
  namespaces                      list namespaces with document counts
  delete-doc <ns> <doc_id>        delete one document from a namespace
  delete-namespace <ns>           drop an entire namespace
  cache-stats                     show query cache statistics
  clear-cache                     empty the query cache
  stats                           show engine performance stats";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{USAGE}");
        std::process::exit(1);
    };

    let config = Config::load()?;
    let engine = RetrievalEngine::open(config.engine_settings()?).await?;

    match command.as_str() {
        "namespaces" => {
            for ns in engine.list_namespaces().await? {
                let marker = if ns.is_default { " (default)" } else { "" };
                println!("{}{}  documents={}", ns.name, marker, ns.document_count);
            }
        }
        "delete-doc" => {
            let (Some(ns), Some(doc_id)) = (args.get(1), args.get(2)) else {
                eprintln!("Error: delete-doc requires <ns> <doc_id>");
                std::process::exit(1);
            };
            let removed = engine.delete_document(ns, doc_id).await?;
            println!("Removed {} chunks of {} from {}", removed, doc_id, ns);
        }
        "delete-namespace" => {
            let Some(ns) = args.get(1) else {
                eprintln!("Error: delete-namespace requires <ns>");
                std::process::exit(1);
            };
            if ns == DEFAULT_NAMESPACE {
                eprintln!("Error: the default namespace cannot be deleted");
                std::process::exit(1);
            }
            engine.delete_namespace(ns).await?;
            println!("Namespace {} deleted", ns);
        }
        "cache-stats" => {
            let stats = engine.cache_stats();
            println!(
                "size={} max_size={} enabled={}",
                stats.size, stats.max_size, stats.enabled
            );
        }
        "clear-cache" => {
            engine.clear_cache();
            println!("Query cache cleared");
        }
        "stats" => {
            let stats = engine.performance_stats().await?;
            println!("Embedding model: {}", stats.embedding_model);
            println!(
                "Cache: size={} max_size={} enabled={}",
                stats.cache.size, stats.cache.max_size, stats.cache.enabled
            );
            println!("Namespaces:");
            for ns in &stats.namespaces {
                let marker = if ns.is_default { " (default)" } else { "" };
                println!("  {}{}  documents={}", ns.name, marker, ns.document_count);
            }
        }
        other => {
            eprintln!("Unknown command: {}\n{USAGE}", other);
            std::process::exit(1);
        }
    }
    Ok(())
}
