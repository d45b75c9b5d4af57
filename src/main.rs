//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run the update loop.
//! No business logic here; authentication is delegated to AuthService.

use dotenv::dotenv;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tg_digest::adapters::ai::{GeminiAdapter, MockBackend, OpenAiAdapter};
use tg_digest::adapters::http::health;
use tg_digest::adapters::persistence::SqliteRepo;
use tg_digest::adapters::telegram::{
    GrammersAuthAdapter, GrammersTransport, run_until_shutdown, run_update_loop, session,
};
use tg_digest::adapters::ui::TuiLoginPrompt;
use tg_digest::ports::{AuthPort, ChatTransport, GenerativeBackend, MessageHandler};
use tg_digest::shared::config::{AiProvider, AppConfig};
use tg_digest::usecases::{
    AuthService, CommandRouter, MessageStore, ReportComposer, ReportScheduler, ReportService,
};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "failed to load configuration, using defaults");
        AppConfig::default()
    });
    let schedule = cfg
        .schedule_config()
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    // --- Generative backend (optional: without it only ingestion works) ---
    let composer = Arc::new(match build_backend(&cfg)? {
        Some(backend) => ReportComposer::new(backend),
        None => ReportComposer::uninitialized(),
    });
    if composer.is_initialized() {
        composer.test_connection().await;
    }

    // --- Persistence (optional: a failed connection degrades the store) ---
    let database_url = cfg.database_url_or_default();
    let store = Arc::new(
        match SqliteRepo::connect(&database_url, cfg.database_auth_token.as_deref()).await {
            Ok(repo) => MessageStore::new(Arc::new(repo)),
            Err(e) => {
                error!(error = %e, "database connection failed, messages will not be stored");
                MessageStore::disconnected()
            }
        },
    );

    // --- Telegram client (shared by auth and transport; same session) ---
    let api_id = cfg.api_id.unwrap_or(0);
    let api_hash = cfg.api_hash.clone().unwrap_or_default();
    if api_id == 0 || api_hash.is_empty() {
        anyhow::bail!(
            "Set TG_DIGEST_API_ID and TG_DIGEST_API_HASH in .env. Get them from https://my.telegram.org"
        );
    }
    let session_path = cfg.session_path_or_default();
    let conn = session::connect(api_id, Path::new(&session_path))
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let auth_adapter: Arc<dyn AuthPort> = Arc::new(GrammersAuthAdapter::new(conn.client.clone()));
    AuthService::new(auth_adapter, Arc::new(TuiLoginPrompt::new()), api_hash)
        .run_auth_flow()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let transport: Arc<dyn ChatTransport> =
        Arc::new(GrammersTransport::new(conn.client.clone()));

    // --- Services ---
    let reports = Arc::new(ReportService::new(
        Arc::clone(&store),
        Arc::clone(&composer),
        Arc::clone(&transport),
    ));
    let router: Arc<dyn MessageHandler> = Arc::new(CommandRouter::new(
        Arc::clone(&store),
        Arc::clone(&composer),
        Arc::clone(&reports),
        Arc::clone(&transport),
    ));
    let scheduler = Arc::new(ReportScheduler::new(
        Arc::clone(&transport),
        Arc::clone(&reports),
        Arc::clone(&store),
        schedule,
    ));
    if cfg.scheduled_reports_enabled() {
        scheduler.start_scheduling();
    } else {
        info!("scheduled reports disabled, /report still available");
    }

    // --- Health server ---
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let port = cfg.port_or_default();
    let health_server = tokio::spawn(async move {
        let shutdown = async move {
            let _ = shutdown_rx.changed().await;
        };
        if let Err(e) = health::serve(port, shutdown).await {
            error!(error = %e, "health server stopped");
        }
    });

    // --- Run until the update stream fails or a shutdown signal arrives ---
    let outcome = run_until_shutdown(run_update_loop(conn.updates, router), shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("{}", e));

    if scheduler.is_scheduled() {
        scheduler.stop_scheduling();
    }
    let _ = shutdown_tx.send(true);
    let _ = health_server.await;
    conn.runner.abort();

    match &outcome {
        Ok(()) => info!("shut down"),
        Err(e) => error!(error = %e, "stopped without a shutdown signal"),
    }
    outcome
}

/// Build the configured backend. `None` when no credential is set.
fn build_backend(cfg: &AppConfig) -> anyhow::Result<Option<Arc<dyn GenerativeBackend>>> {
    let provider = cfg.ai_provider().map_err(|e| anyhow::anyhow!("{}", e))?;
    if provider == AiProvider::Mock {
        warn!("using mock generative backend");
        return Ok(Some(Arc::new(MockBackend::new())));
    }
    let Some(api_key) = cfg.ai_api_key() else {
        warn!(
            "no AI API key set (TG_DIGEST_AI_API_KEY / GEMINI_API_KEY), reports and answers disabled"
        );
        return Ok(None);
    };
    let url = cfg.ai_api_url_or_default(provider);
    let model = cfg.ai_model_or_default(provider);
    info!(?provider, model = %model, url = %url, "generative backend enabled");
    let backend: Arc<dyn GenerativeBackend> = match provider {
        AiProvider::OpenAi => Arc::new(OpenAiAdapter::new(url, api_key, model)),
        AiProvider::Gemini | AiProvider::Mock => Arc::new(GeminiAdapter::new(url, api_key, model)),
    };
    Ok(Some(backend))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown requested");
}
