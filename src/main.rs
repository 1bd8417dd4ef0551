use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,resume_optimizer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = resume_optimizer::config::AppConfig::from_env()?;
    let state = resume_optimizer::build_state(&config)?;
    let app = resume_optimizer::build_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "resume optimizer listening");

    axum::serve(listener, app).await?;
    Ok(())
}
