use interview_backend::{
    config::{get_config, init_config},
    routes, AppState,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    init_config()?;
    let config = get_config();

    let app_state = AppState::new(config)?;
    if !app_state.genai.is_configured() {
        tracing::warn!(
            "No GEMINI_API_KEY / GOOGLE_API_KEY / API_KEY set; model endpoints will fail"
        );
    }

    app_state
        .interview_service
        .spawn_deadline_sweeper(Duration::from_secs(config.deadline_sweep_secs.max(1)));
    info!(
        time_limit_secs = config.question_time_limit_secs,
        "Question deadline sweeper started"
    );

    let app = routes::router(app_state, config);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
