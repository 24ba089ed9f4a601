use anyhow::Context;
use api_router::{api_routes, api_state::ApiState};
use axum::Router;
use common::{storage::store::StorageManager, utils::config::get_config};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> anyhow::Result<()> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    let config = get_config().context("Failed to load configuration")?;

    // One storage handle for the whole process
    let storage = StorageManager::new(&config)
        .await
        .context("Failed to initialize object storage")?;
    info!(
        backend = storage.backend_kind().as_str(),
        base = ?storage.local_base_path(),
        "Object storage ready"
    );

    let api_state = ApiState::new(&config, storage).context("Failed to build API state")?;
    let app = app(api_state);

    info!("Starting server listening on 0.0.0.0:{}", config.http_port);
    let serve_address = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&serve_address)
        .await
        .with_context(|| format!("Failed to bind {serve_address}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn app(api_state: ApiState) -> Router {
    Router::new()
        .nest("/api", api_routes(&api_state))
        .with_state(api_state)
}
