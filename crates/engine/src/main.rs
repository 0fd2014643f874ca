//! Charforge Engine - Main entry point.
//!
//! Imports the configured content bundle into in-memory stores and audits it.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use charforge_engine::infrastructure::config::EngineConfig;
use charforge_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine may be run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "charforge_engine=debug,charforge_domain=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Charforge Engine");

    let config = EngineConfig::from_env();
    tracing::debug!(?config, "Configuration loaded");
    let app = App::in_memory(config);

    let items = match app.config.content_bundle.clone() {
        Some(path) => {
            let summary = app.use_cases.import.import_file(&path).await?;
            if !summary.is_clean() {
                tracing::warn!(
                    rejected = summary.rejected.len(),
                    "Some bundle entries were not imported"
                );
            }
            summary.items
        }
        None => {
            tracing::info!("No content bundle configured, auditing an empty store");
            Default::default()
        }
    };

    let report = app.use_cases.audit.run(&items).await?;
    if report.is_clean() {
        tracing::info!("Content audit passed");
    } else if app.config.strict_audit {
        anyhow::bail!(
            "Content audit failed: {} graph problems, {} invalid references",
            report.graph_problem_count(),
            report.invalid_reference_count()
        );
    } else {
        tracing::warn!(
            graph_problems = report.graph_problem_count(),
            invalid_references = report.invalid_reference_count(),
            "Content audit found problems"
        );
    }

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
