use anyhow::Context;
use chrono::Utc;
use realty_search::client::{HttpBackend, PageRequest, SearchBackend, SearchController};
use realty_search::config::Config;
use realty_search::logging;
use realty_search::render::render_state;
use realty_search::search::{decode, search_path, summarize, FeatureSelection};
use std::sync::Arc;
use tracing::{info, warn};

const USAGE: &str = "usage: realty-search <search URL or query> [page]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    logging::init(&config.log_level)?;

    let mut args = std::env::args().skip(1);
    let query = args.next().context(USAGE)?;
    let page = match args.next() {
        Some(raw) => raw.parse::<u32>().with_context(|| format!("Invalid page '{}'", raw))?,
        None => 1,
    };

    let mut filter = decode(&query);
    let backend = Arc::new(HttpBackend::new(&config)?);

    // Resolve typed features to their indexed spelling
    if !filter.features.is_empty() {
        let known = backend.known_features().await.unwrap_or_else(|err| {
            warn!("Could not load known features: {:#}", err);
            Vec::new()
        });

        let now = Utc::now();
        let mut selection = FeatureSelection::new();
        for typed in std::mem::take(&mut filter.features) {
            selection.add(&typed, &known, now);
        }
        if let Some(warning) = selection.warning(now) {
            warn!("{}", warning);
        }
        filter.features = selection.into_features();
    }

    info!("🏠 Searching {}", config.api_base_url);
    info!("Criteria: {}", summarize(&filter));
    info!("Share: {}", search_path(&filter));

    let controller = SearchController::new(backend);
    let request = PageRequest {
        page: page.saturating_sub(1),
        size: config.page_size,
    };
    controller.run(filter, request).await;

    println!("{}", render_state(&controller.snapshot()));

    Ok(())
}
