use super::handlers::{handle_health, handle_submission};
use super::{AppState, Delivery, REQUEST_TIMEOUT_SECS, SUBMISSION_PATH};

use crate::config::{Config, SmtpSettings};
use crate::mail::{MailDispatcher, MailTransport, SmtpTransport};
use crate::pipeline::SubmissionProcessor;
use anyhow::{Context, Result};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Returns true when the bind address is not a loopback address.
fn is_public_bind(host: &str) -> bool {
    !matches!(
        host,
        "127.0.0.1" | "localhost" | "::1" | "[::1]" | "0:0:0:0:0:0:0:1"
    )
}

fn delivery_with(
    settings: &SmtpSettings,
    transport: Arc<dyn MailTransport>,
) -> Delivery {
    match SubmissionProcessor::new(settings, MailDispatcher::new(transport)) {
        Ok(processor) => Delivery::Ready(Arc::new(processor)),
        Err(error) => {
            tracing::error!(error = %error, "submission processor unavailable");
            Delivery::Misconfigured(Arc::from(error.detail()))
        }
    }
}

/// Gateway state backed by a real SMTP transport. Missing credentials leave
/// the server up, answering every submission with a configuration failure.
pub fn build_state(config: &Config) -> AppState {
    let delivery = match SmtpSettings::from_config(&config.smtp) {
        Ok(settings) => match SmtpTransport::new(&settings) {
            Ok(transport) => delivery_with(&settings, Arc::new(transport)),
            Err(error) => {
                tracing::error!(error = %error, "cannot build SMTP transport");
                Delivery::Misconfigured(Arc::from(error.to_string()))
            }
        },
        Err(error) => {
            tracing::error!(error = %error, "mail delivery disabled");
            Delivery::Misconfigured(Arc::from(error.to_string()))
        }
    };

    AppState {
        delivery,
        limits: config.limits,
    }
}

/// Gateway state delivering through `transport`. Credentials are still
/// required since they name the sender.
pub fn state_with_transport(config: &Config, transport: Arc<dyn MailTransport>) -> AppState {
    let delivery = match SmtpSettings::from_config(&config.smtp) {
        Ok(settings) => delivery_with(&settings, transport),
        Err(error) => Delivery::Misconfigured(Arc::from(error.to_string())),
    };

    AppState {
        delivery,
        limits: config.limits,
    }
}

/// Run the HTTP gateway using axum with proper HTTP/1.1 compliance.
pub async fn run_gateway(config: Arc<Config>) -> Result<()> {
    let host = config.gateway.host.clone();
    let port = config.gateway.port;

    // ── Security: refuse public bind without explicit opt-in ──
    if is_public_bind(&host) && !config.gateway.allow_public_bind {
        anyhow::bail!(
            "Refusing to bind to {host}: the form endpoint would be exposed publicly.\n\
             Fix: use --host 127.0.0.1 (default), or set\n\
             [gateway] allow_public_bind = true in config.toml."
        );
    }

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .context("parse gateway bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind gateway socket")?;

    run_gateway_with_listener(&host, listener, config).await
}

/// Run the HTTP gateway from a pre-bound listener.
pub async fn run_gateway_with_listener(
    host: &str,
    listener: tokio::net::TcpListener,
    config: Arc<Config>,
) -> Result<()> {
    let actual_port = listener
        .local_addr()
        .context("get gateway listener local address")?
        .port();
    let display_addr = format!("{host}:{actual_port}");

    let state = build_state(&config);
    print_gateway_banner(&display_addr, &state);

    serve(listener, state, &config.gateway.cors_origins).await
}

/// Serve `state` on an already bound listener until the server stops.
pub async fn serve(
    listener: tokio::net::TcpListener,
    state: AppState,
    cors_origins: &[String],
) -> Result<()> {
    let app = build_app(state, cors_origins);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve HTTP gateway")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %error, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down gateway");
}

fn print_gateway_banner(display_addr: &str, state: &AppState) {
    println!("Gateway listening on {display_addr}");
    println!("  POST {SUBMISSION_PATH}");
    println!("  GET  /health");
    match &state.delivery {
        Delivery::Ready(_) => println!("  Mail delivery configured"),
        Delivery::Misconfigured(reason) => println!("  Mail delivery disabled: {reason}"),
    }
}

pub fn build_app(state: AppState, cors_origins: &[String]) -> Router {
    let body_limit = state.body_limit();

    let mut app = Router::new()
        .route("/health", get(handle_health))
        .route(SUBMISSION_PATH, post(handle_submission))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ));

    if !cors_origins.is_empty() {
        let origins: Vec<_> = cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        );
    }

    app
}
