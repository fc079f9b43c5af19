// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact intake service binary.
//!
//! Configuration comes from the environment:
//!
//! - `BIND_ADDR` (default `0.0.0.0:8080`)
//! - `RATE_LIMIT_WINDOW_MS` (default `60000`)
//! - `RATE_LIMIT_MAX_REQUESTS` (default `5`)
//! - `RATE_LIMIT_MAX_ENTRIES` (default `1000`)
//! - `BODY_LIMIT_BYTES` (default `16384`)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contact_intake::config::{Config, IntakeConfig, RateLimitConfig};
use contact_intake::handlers::{router, AppState};
use contact_intake::limiter::SlidingWindowRateLimiter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = load_config();
    info!(
        bind_addr = %config.bind_addr,
        window_ms = config.rate_limit.window_ms,
        max_requests = config.rate_limit.max_requests,
        max_entries = config.rate_limit.max_entries,
        body_limit_bytes = config.intake.body_limit_bytes,
        "Starting contact intake service"
    );

    // Create application state
    let limiter = SlidingWindowRateLimiter::new(config.rate_limit.clone());
    let state = Arc::new(AppState {
        limiter,
        config: config.clone(),
    });

    // Build router
    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Load configuration from environment variables.
fn load_config() -> Config {
    Config {
        bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        rate_limit: RateLimitConfig {
            window_ms: std::env::var("RATE_LIMIT_WINDOW_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60_000),
            max_requests: std::env::var("RATE_LIMIT_MAX_REQUESTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            max_entries: std::env::var("RATE_LIMIT_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1_000),
        },
        intake: IntakeConfig {
            body_limit_bytes: std::env::var("BODY_LIMIT_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(16_384),
        },
    }
}
