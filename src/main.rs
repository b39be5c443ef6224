use std::process::ExitCode;

use canvasboard::adapters::{CanvasDetailsAdapter, PropsSink, TabsAdapter};
use canvasboard::config::Config;
use canvasboard::services::canvas::CanvasStore;
use canvasboard::services::persistence::FileStorage;
use canvasboard::services::project::ProjectStore;
use canvasboard::tools;
use canvasboard::view::CanvasView;
use serde_json::Value;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// Writes outward interactable props to stdout, one JSON line each.
struct StdoutSink;

impl PropsSink for StdoutSink {
    fn update_props(&mut self, interactable_id: &str, props: Value) {
        println!("{}", serde_json::json!({ "interactableId": interactable_id, "props": props }));
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::from_env();
    let storage = match FileStorage::open(config.storage_dir.clone()) {
        Ok(storage) => storage,
        Err(e) => {
            tracing::error!(error = %e, dir = %config.storage_dir.display(), "failed to open storage");
            return ExitCode::FAILURE;
        }
    };

    let mut store = CanvasStore::hydrate(Box::new(storage), &config);
    let view = {
        let mut view = CanvasView::new(&config);
        view.mount(&mut store);
        view
    };

    let mut tabs = TabsAdapter::new("canvas-tabs", None, &store);
    let mut details = CanvasDetailsAdapter::new("canvas-details", None, &store);
    let mut sink = StdoutSink;

    // No agent transport is attached here; registration is immediate.
    let (_ready_tx, mut ready) = watch::channel(true);
    tabs.publish_initial(&store, &mut sink, &mut ready, config.initial_publish_window).await;
    details.publish_initial(&store, &mut sink, &mut ready, config.initial_publish_window).await;

    let snapshot = view.snapshot(&store);
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!(error = %e, "failed to render board");
            return ExitCode::FAILURE;
        }
    }

    let project = ProjectStore::new();
    match tools::execute(tools::GET_PROJECT_STATS, &project) {
        Ok(stats) => tracing::debug!(%stats, "project stats"),
        Err(e) => tracing::warn!(error = %e, "project stats unavailable"),
    }

    tracing::info!(
        canvases = store.canvases().len(),
        active = ?store.active_canvas_id(),
        revision = store.revision(),
        "canvasboard ready"
    );
    ExitCode::SUCCESS
}
