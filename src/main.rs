use std::sync::Arc;

use civic_search::config::AppConfig;
use civic_search::core::search::{InMemoryEngine, SearchOrchestratorBuilder, SearchQuery};

const USAGE: &str = "usage: civic-search <corpus.json> <query...>";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_path();
    let loaded = AppConfig::load_from(&config_path);
    let config = loaded.as_ref().ok().cloned().unwrap_or_default();

    // stdout carries the response
    let mut logging = config.logging.clone();
    logging.console = false;
    let _log_guard = match civic_search::core::logging::init(&logging) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging disabled: {e}");
            None
        }
    };
    log::info!("{} v{} starting", civic_search::NAME, civic_search::VERSION);
    let (level, message) = AppConfig::describe_load(&config_path, &loaded);
    log::log!(level, "{}", message);

    let mut args = std::env::args().skip(1);
    let Some(corpus) = args.next() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };
    let text = args.collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        eprintln!("{USAGE}");
        std::process::exit(2);
    }

    let engine = InMemoryEngine::from_json_file("memory", &corpus)?;
    log::info!("Loaded {} documents from {}", engine.len(), corpus);

    let orchestrator = SearchOrchestratorBuilder::from_config(&config)
        .add_engine(Arc::new(engine), 1)
        .build()?;

    match orchestrator.search(SearchQuery::new(text)).await {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
