// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, process, sync::Arc, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use library_auth::{
    api::router,
    auth::{
        CredentialStore, InMemoryCredentialStore, RevocationRegistry, RevocationSweeper, Role,
        TokenCodec,
    },
    config::{AppConfig, LogFormat, DEFAULT_LOG_FILTER},
    state::AppState,
};

/// Grace period for in-flight requests on shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::builder().parse_lossy(
        std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_owned()),
    );
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init(),
    }
}

async fn shutdown_signal(handle: Handle<SocketAddr>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}

#[tokio::main]
async fn main() {
    // Install the ring crypto provider for rustls (must be done before any TLS operations)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            process::exit(1);
        }
    };

    init_tracing(config.log_format);

    let credentials = InMemoryCredentialStore::new();
    if let Some(seed) = &config.seed_admin {
        match credentials.register(&seed.nick, &seed.password, Role::Admin) {
            Ok(principal) => info!(nick = %principal.nick, "Seeded admin account"),
            Err(e) => {
                error!(error = %e, "Failed to seed admin account");
                process::exit(1);
            }
        }
    }

    let codec = TokenCodec::new(&config.jwt_secret).with_ttl(config.token_ttl);
    let revocations = Arc::new(RevocationRegistry::new());

    let cancel = CancellationToken::new();
    let sweeper = RevocationSweeper::new(revocations.clone()).with_interval(config.sweep_interval);
    let sweeper_task = tokio::spawn(sweeper.run(cancel.clone()));

    let state = AppState::new(codec, revocations, Arc::new(credentials));
    let app = router(state);

    let handle = Handle::<SocketAddr>::new();
    tokio::spawn(shutdown_signal(handle.clone()));

    let addr = config.bind_addr;
    let served = match &config.tls {
        Some(tls) => {
            let tls_config = match RustlsConfig::from_pem_file(&tls.cert, &tls.key).await {
                Ok(tls_config) => tls_config,
                Err(e) => {
                    error!(error = %e, "Failed to load TLS certificate or key");
                    process::exit(1);
                }
            };
            info!("Library auth server listening on https://{addr} (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
        None => {
            info!("Library auth server listening on http://{addr} (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
    };

    cancel.cancel();
    let _ = sweeper_task.await;

    if let Err(e) = served {
        error!(error = %e, "Server failed");
        process::exit(1);
    }
    info!("Server stopped");
}
