use std::process;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flashdeck::ai::{CardAssistant, ChatCompletionsAssistant};
use flashdeck::config::AppConfig;
use flashdeck::state::AppState;
use flashdeck::{db, handlers};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "flashdeck=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = AppConfig::load();

  let pool = match db::init_db(&config.database_path) {
    Ok(pool) => pool,
    Err(e) => {
      tracing::error!("Failed to initialize database at {}: {}", config.database_path.display(), e);
      process::exit(1);
    }
  };

  let assistant: Option<Arc<dyn CardAssistant>> = match &config.ai {
    Some(ai_config) => match ChatCompletionsAssistant::new(ai_config) {
      Ok(client) => {
        tracing::info!("AI assistant enabled ({} via {})", ai_config.model, ai_config.base_url);
        Some(Arc::new(client))
      }
      Err(e) => {
        tracing::warn!("AI assistant disabled: {}", e);
        None
      }
    },
    None => {
      tracing::info!("No AI API key configured; generation and improvement are disabled");
      None
    }
  };

  let app = handlers::router(AppState::new(pool, &config, assistant));

  let bind_addr = config.bind_addr();
  let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
    Ok(listener) => listener,
    Err(e) => {
      tracing::error!("Failed to bind to {}: {}", bind_addr, e);
      process::exit(1);
    }
  };

  tracing::info!("Server running on http://localhost:{}", config.server_port);

  if let Err(e) = axum::serve(listener, app).await {
    tracing::error!("Server error: {}", e);
    process::exit(1);
  }
}
