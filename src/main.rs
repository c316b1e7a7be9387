use axum::Router;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use sobora_wallet::client::ApiClient;
use sobora_wallet::config::Config;
use sobora_wallet::routes::create_routes;
use sobora_wallet::state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sobora_wallet=debug,tower_http=debug")),
        )
        .init();

    let config = Config::from_env();

    let api = ApiClient::new(&config.api_base_url, config.api_timeout)
        .expect("SOBORA_API_URL must be a valid base URL");
    tracing::info!(api = %config.api_base_url, "Marketplace API client ready");

    let state = AppState::new(api, config.snapshot_limit);
    let app: Router = create_routes(state, &config);

    tracing::info!("🚀 Server running at http://{}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
