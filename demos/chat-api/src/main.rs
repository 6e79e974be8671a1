mod error;
mod routes;
mod state;

use std::env;
use std::sync::Arc;

use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;

use deckwright::generate::{OllamaGenerator, PerplexityGenerator};
use deckwright::{AsyncDeckAssistant, ValidationPolicy};

use state::AppState;

#[tokio::main]
async fn main() {
    eprintln!("Initializing deck assistant...");

    let builder = AsyncDeckAssistant::builder().telemetry_file("app_telemetry.jsonl");

    // PERPLEXITY_API_KEY selects the hosted search-grounded backend;
    // otherwise a local Ollama model with full Scryfall validation.
    let builder = if let Ok(key) = env::var("PERPLEXITY_API_KEY") {
        let model = env::var("CHAT_MODEL")
            .unwrap_or_else(|_| deckwright::config::DEFAULT_GROUNDED_MODEL.to_string());
        builder
            .generator(Box::new(
                PerplexityGenerator::new(key, model).expect("Failed to build Perplexity client"),
            ))
            .policy(ValidationPolicy::TrustGrounded)
    } else {
        let host = env::var("OLLAMA_HOST")
            .unwrap_or_else(|_| deckwright::config::OLLAMA_DEFAULT_HOST.to_string());
        let model = env::var("CHAT_MODEL")
            .unwrap_or_else(|_| deckwright::config::DEFAULT_LOCAL_MODEL.to_string());
        builder
            .generator(Box::new(
                OllamaGenerator::new(&host, model).expect("Failed to build Ollama client"),
            ))
            .policy(ValidationPolicy::Full)
    };

    let assistant = builder.build().await.expect("Failed to initialize assistant");
    eprintln!("Assistant ready ({}).", assistant.model());

    let state = Arc::new(AppState { assistant });

    let app = Router::new()
        .route("/api/chat", post(routes::chat::chat))
        .route("/api/reset", post(routes::chat::reset))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = "0.0.0.0:3000";
    eprintln!("Listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
