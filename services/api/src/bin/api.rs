//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        fetch_strategies, http_client, CannedTranscriptAdapter, DbAdapter, GoogleSearchAdapter,
        OEmbedAdapter, OpenAiCompletionAdapter, TrendsLlmAdapter,
    },
    config::Config,
    error::ApiError,
    web::{self, rest::ApiDoc, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::Router;
use postcraft_core::ports::{TrendSource, WebSearchService};
use postcraft_core::{ArticleExtractor, ContentPipeline, SearchRetriever, TrendFeed, VideoExtractor};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    let completion_adapter = Arc::new(OpenAiCompletionAdapter::new(Client::with_config(
        openai_config,
    )));

    let http = http_client()
        .map_err(|e| ApiError::Internal(format!("Failed to build HTTP client: {}", e)))?;

    let search_provider: Option<Arc<dyn WebSearchService>> = match (
        config.google_search_api_key.clone(),
        config.google_search_engine_id.clone(),
    ) {
        (Some(key), Some(engine_id)) => {
            Some(Arc::new(GoogleSearchAdapter::new(http.clone(), key, engine_id)))
        }
        _ => {
            warn!("Google search credentials not configured, web search will use mock results");
            None
        }
    };

    let trend_source: Option<Arc<dyn TrendSource>> = match &config.perplexity_api_key {
        Some(key) => Some(Arc::new(TrendsLlmAdapter::perplexity(
            key,
            config.trend_model.clone(),
        ))),
        None => {
            warn!("PERPLEXITY_API_KEY not configured, trending will use fallback articles");
            None
        }
    };

    let articles = ArticleExtractor::new(fetch_strategies(&http, &config.article_proxies));
    let videos = VideoExtractor::new(
        Arc::new(OEmbedAdapter::new(http.clone())),
        Arc::new(CannedTranscriptAdapter::new()),
    );

    // --- 4. Build the Shared AppState ---
    let pipeline = ContentPipeline::new(
        completion_adapter,
        SearchRetriever::new(search_provider),
        articles,
        videos,
        config.pipeline_settings(),
    );
    let app_state = Arc::new(AppState::new(
        db_adapter,
        pipeline,
        TrendFeed::new(trend_source),
    ));

    // --- 5. Create the Web Router ---
    let origin = config.allowed_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!(
            "Invalid ALLOWED_ORIGIN '{}': {}",
            config.allowed_origin, e
        ))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    let mut app = Router::new()
        .merge(web::router(app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    if let Some(dir) = &config.static_dir {
        info!("Serving static files from {}", dir.display());
        app = app.fallback_service(ServeDir::new(dir));
    }

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
