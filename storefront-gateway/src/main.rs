//! # storefront-gateway
//!
//! Edge gateway for the Vijay Brothers saree storefront.
//!
//! Sits between browsers and the storefront backend. All business logic
//! (inventory, pricing, orders, payment verification, authentication) lives in
//! the backend; this service only gates, forwards and serves.
//!
//! ## Architecture
//!
//! - **Access gate**: `/admin` pages require the session cookie to be present
//! - **Proxy handlers**: contact form and payment verification, forwarded once
//! - **Placeholders**: cart, order initiation and payment key, tagged as fixture data
//! - **Rewrite**: every other `/api/*` request is forwarded to the backend
//! - **Pages**: the built storefront is served from the site root

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

mod access;
mod backend;
mod config;
mod http;
mod pages;

use std::net::SocketAddr;

use anyhow::Context;
use axum::serve;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::backend::BackendClient;
use crate::config::{AppConfig, Cli};
use crate::http::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging().context("failed to initialize logging")?;

    let cli = Cli::parse();
    let config = AppConfig::from_cli(cli).context("failed to load configuration")?;
    info!(
        bind = %config.bind,
        backend = %config.backend_url,
        backend_timeout = ?config.backend_timeout,
        site_root = %config.site_root.display(),
        admin_prefix = %config.gate.admin_prefix,
        session_cookie = %config.gate.session_cookie,
        rate_limit_rps = config.rate_limit.requests_per_second,
        rate_limit_burst = config.rate_limit.burst_size,
        "configuration loaded"
    );

    if config.uses_placeholder_payment_key() {
        warn!("RAZORPAY_KEY_ID not set; serving the test placeholder payment key");
    }
    info!("cart, order initiation and payment key endpoints serve placeholder data");

    if !config.site_root.is_dir() {
        warn!(
            site_root = %config.site_root.display(),
            "site root does not exist; page requests will return 404"
        );
    }

    let backend = BackendClient::new(config.backend_url.clone(), config.backend_timeout)
        .context("failed to build backend client")?;
    let state = AppState::new(&config, backend);

    let app = router(state);
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    let shutdown = tokio::signal::ctrl_c();
    info!(bind = %config.bind, "storefront-gateway listening");

    serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = shutdown.await;
        info!("shutting down gracefully");
    })
    .await
    .context("server exited with error")
}

/// Initialize tracing subscriber with `RUST_LOG` env filter (default: `info`).
fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}
