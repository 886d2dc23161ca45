use esshub_api::{build_router, state::AppState};
use esshub_config::Settings;
use esshub_db::{connect, indexes::ensure_indexes};
use esshub_services::SchemaRegistry;
use esshub_services::background::SweepScheduler;
use esshub_services::schema::seed_mapping;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "esshub_api=debug,esshub_services=debug,esshub_db=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config
    let settings = Settings::load()?;
    info!(
        "Starting ESS Hub API on {}:{}",
        settings.app.host, settings.app.port
    );

    // Connect to MongoDB
    let db = connect(&settings).await?;

    // Ensure indexes
    ensure_indexes(&db).await?;

    // Build app state
    let app_state = AppState::new(db, settings.clone());

    // Install the shipped custom-field set (upsert, safe to re-run)
    install_seed_fields(&app_state.schema).await;

    // Schedule the daily time-based rule sweep
    let _sweep = if settings.notifications.enabled {
        Some(
            SweepScheduler::start(
                &settings.notifications.sweep_schedule,
                Arc::clone(&app_state.engine),
            )
            .await?,
        )
    } else {
        None
    };

    // Build router
    let app = build_router(app_state);

    // Start server
    let addr = format!("{}:{}", settings.app.host, settings.app.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn install_seed_fields(schema: &SchemaRegistry) {
    if let Err(e) = schema.install(seed_mapping()).await {
        tracing::error!(%e, "Failed to install shipped custom fields");
    }
}
