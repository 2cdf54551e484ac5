//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{self, AiGatewayAdapter, DbAdapter, SupabaseAdapter},
    config::Config,
    error::ApiError,
    web::{self, rest::ApiDoc, state::AppState},
};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use study_assistant_core::ports::StudyStore;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    let supabase = Arc::new(SupabaseAdapter::new(
        adapters::http_client(config.backend_timeout)?,
        &config.supabase_url,
        config.supabase_anon_key.clone(),
    ));

    let completions = Arc::new(AiGatewayAdapter::new(
        adapters::http_client(config.ai_gateway_timeout)?,
        &config.ai_gateway_url,
        config.ai_gateway_key.clone(),
        config.ai_model.clone(),
    ));

    // --- 3. Pick the Persistence Backend ---
    let store: Arc<dyn StudyStore> = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            let db_adapter = DbAdapter::new(db_pool);
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(db_adapter)
        }
        None => {
            info!("Writing generated content through the backend REST API.");
            supabase.clone()
        }
    };

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        auth: supabase,
        store,
        completions,
    });

    // --- 5. Create the Web Router ---
    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(web::router(app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
