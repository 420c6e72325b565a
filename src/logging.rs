//! # Structured Logging Module
//!
//! Environment-aware structured logging for registry operations and object
//! lifecycle transitions.

use crate::constants::env;
use crate::lifecycle::LifecycleState;
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));
        let json = std::env::var(env::LOG_FORMAT)
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let console = if json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .json()
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true)
                .boxed()
        };

        // A host application may already own the global subscriber
        if tracing_subscriber::registry()
            .with(console.with_filter(filter))
            .try_init()
            .is_err()
        {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            environment = %environment,
            json = json,
            "Structured logging initialized"
        );
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var(env::ENVIRONMENT)
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "test" => "debug".to_string(),
        "development" => "debug".to_string(),
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for registry operations
pub fn log_registry_operation(
    operation: &str,
    registry: &str,
    name: Option<&str>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        registry = %registry,
        name = name,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "REGISTRY_OPERATION"
    );
}

/// Log a lifecycle state transition of one managed object
pub fn log_lifecycle_transition(
    registry: &str,
    name: &str,
    from: LifecycleState,
    to: LifecycleState,
) {
    tracing::trace!(
        registry = %registry,
        name = %name,
        from = %from,
        to = %to,
        timestamp = %Utc::now().to_rfc3339(),
        "LIFECYCLE_TRANSITION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}
