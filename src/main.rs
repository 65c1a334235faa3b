use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use opsline::application::{
    CallService, InboundRouter, MediaStreamSessionManager, PostCallSummarizer,
};
use opsline::config::Config;
use opsline::domain::call_log::CallLogRegistry;
use opsline::domain::session::SessionRegistry;
use opsline::domain::tenant::TenantDirectory;
use opsline::domain::transcription::{NullRecognizer, SpeechRecognizer};
use opsline::infrastructure::ai::{AiAssistant, DisabledAssistant, OpenAiAssistant};
use opsline::infrastructure::persistence::{
    InMemoryClientRepository, InMemoryMinuteRepository, InMemoryTenantDirectory,
};
use opsline::infrastructure::telephony::{TelephonyProvider, TwilioProvider, UnconfiguredProvider};
use opsline::interface::api::{build_router, init_metrics, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting Opsline voice platform");

    let config = Config::load()?;

    // Tenant directory seeded from configuration
    let tenants: Arc<dyn TenantDirectory> = Arc::new(InMemoryTenantDirectory::new());
    for seed in config.tenants.iter().cloned() {
        let tenant = seed.into_tenant();
        let tenant_id = tenant.id.clone();
        match tenants.upsert(tenant).await {
            Ok(()) => info!(tenant_id = %tenant_id, "tenant registered"),
            Err(e) => warn!(tenant_id = %tenant_id, "tenant seed rejected: {}", e),
        }
    }

    // Missing provider credentials degrade to per-request errors, not a crash
    let provider: Arc<dyn TelephonyProvider> = if config.telephony.is_configured() {
        info!("telephony provider: twilio");
        Arc::new(TwilioProvider::from_config(&config.telephony)?)
    } else {
        warn!("telephony credentials missing, calls and SMS will be unavailable");
        Arc::new(UnconfiguredProvider)
    };

    let assistant: Arc<dyn AiAssistant> = if config.ai.is_configured() {
        info!("AI assistant: openai ({})", config.ai.model);
        Arc::new(OpenAiAssistant::from_config(&config.ai)?)
    } else {
        warn!("AI api key missing, summaries will fall back to raw transcripts");
        Arc::new(DisabledAssistant)
    };

    let recognizer: Arc<dyn SpeechRecognizer> = Arc::new(NullRecognizer);

    let logs = Arc::new(CallLogRegistry::new());
    let sessions = Arc::new(SessionRegistry::new());
    let minutes = Arc::new(InMemoryMinuteRepository::new());
    let clients = Arc::new(InMemoryClientRepository::new());

    let summarizer = Arc::new(PostCallSummarizer::new(
        assistant.clone(),
        tenants.clone(),
        clients,
        minutes,
        Duration::from_secs(config.voice.summary_timeout_secs),
        config.voice.min_transcript_chars,
    ));

    let session_manager = Arc::new(MediaStreamSessionManager::new(
        sessions,
        summarizer,
        recognizer,
    ));

    let calls = Arc::new(CallService::new(
        provider.clone(),
        tenants.clone(),
        logs.clone(),
        config.server.public_url.clone(),
    ));

    let inbound = Arc::new(InboundRouter::new(
        tenants,
        assistant,
        provider,
        logs,
        config.server.public_url.clone(),
        config.voice.gather_timeout_secs,
    ));

    let prometheus_handle = init_metrics();

    let state = AppState {
        calls,
        inbound,
        sessions: session_manager.clone(),
    };
    let app = build_router(state, prometheus_handle);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Live media sessions still get their minutes on shutdown
    session_manager.shutdown().await;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
