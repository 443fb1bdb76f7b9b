use anyhow::Result;
use clap::Parser;
use psikoscribe::store::FileStore;
use psikoscribe::{
    create_router, AppState, Config, DataStore, GeminiClient, MockGateway, Workspace,
};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "psikoscribe")]
#[command(about = "Clinical session transcription and reporting service")]
struct Args {
    /// Config file (without extension), as read by the config crate
    #[arg(short, long, default_value = "config/psikoscribe")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} starting", cfg.service.name);
    info!("Data directory: {}", cfg.storage.data_dir);
    if cfg.ai.api_key.is_empty() {
        warn!("No Gemini API key configured; AI operations will fail");
    }

    let store = DataStore::new(Arc::new(FileStore::new(&cfg.storage.data_dir)?));
    let ai = Arc::new(GeminiClient::new(&cfg.ai));
    let payment = Arc::new(MockGateway::new());

    let state = AppState::new(store.clone(), ai.clone(), payment);

    // Restore the login that was active when the process last stopped.
    if let Some(user) = store.load_active_user()? {
        info!("Restoring session for {}", user.email);
        let workspace = Workspace::open(user, store, ai)?;
        *state.workspace.write().await = Some(workspace);
    }

    let app = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
