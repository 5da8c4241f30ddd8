//! # Prometheus Metrics
//!
//! Operational counters for the vault server. Scraped by Prometheus at the
//! `/metrics` HTTP endpoint on the configured metrics port.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] so they
//! do not collide with any default global registry consumers. Nothing here
//! carries a credential id or a DID as a label; cardinality stays fixed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Holds all Prometheus metric handles for the server.
///
/// Clone-friendly (prometheus handles are `Arc`s internally) so it can be
/// shared across request handlers.
#[derive(Clone)]
pub struct VaultMetrics {
    /// Prometheus registry that owns all metrics below.
    registry: Registry,
    /// Wallets provisioned by this process.
    pub wallets_created_total: IntCounter,
    /// Credentials encrypted and stored.
    pub credentials_stored_total: IntCounter,
    /// Share tokens issued.
    pub share_tokens_issued_total: IntCounter,
    /// Share-token verifications, labeled by `outcome`
    /// (`valid`, `malformed`, `invalid_signature`, `expired`, `no_wallet`).
    pub share_verifications_total: IntCounterVec,
    /// Stored payloads that failed to decrypt. Anything above zero means
    /// tampering or a corrupted store.
    pub decryption_failures_total: IntCounter,
}

impl VaultMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Self {
        let registry = Registry::new_custom(Some("credvault".into()), None)
            .expect("failed to create prometheus registry");

        let wallets_created_total =
            IntCounter::new("wallets_created_total", "Total number of wallets provisioned")
                .expect("metric creation");
        registry
            .register(Box::new(wallets_created_total.clone()))
            .expect("metric registration");

        let credentials_stored_total = IntCounter::new(
            "credentials_stored_total",
            "Total number of credentials encrypted and stored",
        )
        .expect("metric creation");
        registry
            .register(Box::new(credentials_stored_total.clone()))
            .expect("metric registration");

        let share_tokens_issued_total = IntCounter::new(
            "share_tokens_issued_total",
            "Total number of share tokens issued",
        )
        .expect("metric creation");
        registry
            .register(Box::new(share_tokens_issued_total.clone()))
            .expect("metric registration");

        let share_verifications_total = IntCounterVec::new(
            Opts::new(
                "share_verifications_total",
                "Share token verifications by outcome",
            ),
            &["outcome"],
        )
        .expect("metric creation");
        registry
            .register(Box::new(share_verifications_total.clone()))
            .expect("metric registration");

        let decryption_failures_total = IntCounter::new(
            "decryption_failures_total",
            "Stored payloads that failed authentication on decrypt",
        )
        .expect("metric creation");
        registry
            .register(Box::new(decryption_failures_total.clone()))
            .expect("metric registration");

        Self {
            registry,
            wallets_created_total,
            credentials_stored_total,
            share_tokens_issued_total,
            share_verifications_total,
            decryption_failures_total,
        }
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl Default for VaultMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared metrics state passed to axum handlers.
pub type SharedMetrics = Arc<VaultMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
///
/// Returns HTTP 500 if encoding fails (should never happen in practice).
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}
