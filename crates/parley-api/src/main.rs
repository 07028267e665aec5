use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use parley_api::{build_router, config::Config, state::AppState};
use parley_assistants::{ConversationClient, OpenAIAssistantsClient};
use parley_exchange::ExchangeOrchestrator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // Initialize logging
    init_logging(&config);

    tracing::info!("Starting Parley API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    // Initialize assistants client
    let mut client_builder = OpenAIAssistantsClient::builder().api_key(config.openai_api_key.clone());
    if let Some(base_url) = &config.assistant.base_url {
        client_builder = client_builder.base_url(base_url.clone());
    }
    if let Some(organization) = &config.openai_organization {
        client_builder = client_builder.organization(organization.clone());
    }
    let client: Arc<dyn ConversationClient> = Arc::new(client_builder.build()?);

    // Create orchestrator
    let mut orchestrator = ExchangeOrchestrator::builder()
        .client(client)
        .assistant_id(config.openai_assistant_id.clone())
        .poll_schedule(config.assistant.poll_schedule());
    if let Some(greeting) = &config.assistant.greeting {
        orchestrator = orchestrator.greeting(greeting.clone());
    }
    let orchestrator = orchestrator.build()?;

    tracing::info!(
        assistant_id = %orchestrator.assistant_id(),
        max_wait_secs = orchestrator.poll_schedule().total_wait().as_secs(),
        "Exchange orchestrator ready"
    );

    let state = Arc::new(AppState::new(config.clone(), orchestrator));

    // Build router
    let app = build_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
