use qrlinkr::config::settings;
use qrlinkr::handlers::generate::AppState;
use qrlinkr::services::metrics;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let settings = settings::load()?;
    tracing::info!("Loaded settings: {:?}", settings);
    metrics::init_metrics();

    let addr = format!("0.0.0.0:{}", settings.app_port);
    let state = AppState::new(settings);
    let app = qrlinkr::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
