// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use anyhow::Context;
use tokio::net::TcpListener;

use reference_server::{
    api::router,
    config::Settings,
    logging::{self, LogFormat},
    state::AppState,
};

fn main() -> anyhow::Result<()> {
    logging::init(LogFormat::from_env());

    // Invalid configuration is fatal: never bind with it.
    let settings = Settings::load().inspect_err(|err| {
        tracing::error!(error = %err, "Invalid configuration");
    })?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(settings.workers as usize)
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(serve(settings))
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        project = %settings.project_name,
        version = %settings.project_version,
        "Starting service"
    );
    tracing::info!(
        environment = %settings.environment,
        debug = settings.debug,
        reload = settings.reload,
        workers = settings.workers,
        "Runtime mode"
    );
    tracing::info!(
        api_docs = if settings.feature_api_docs { "enabled" } else { "disabled" },
        "API docs"
    );
    tracing::debug!(?settings, "Configuration loaded successfully");

    let bind_address = settings.bind_address();
    let app = router(AppState::new(settings));

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    tracing::info!(address = %bind_address, "Listening (docs at /docs when enabled)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("Shutting down application");
    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
