//! Prometheus metrics for the custody ledger.
//!
//! All metrics follow the naming convention: `ledger_<area>_<metric>_total`

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // BALANCE METRICS
    // =========================================================================

    /// Deposits credited
    pub static ref DEPOSITS: Counter = Counter::new(
        "ledger_deposits_total",
        "Total number of deposits credited"
    ).expect("metric creation failed");

    /// Debits clamped to the available balance
    pub static ref AMOUNT_ADJUSTMENTS: Counter = Counter::new(
        "ledger_amount_adjustments_total",
        "Total number of debits clamped to the available balance"
    ).expect("metric creation failed");

    // =========================================================================
    // WITHDRAWAL METRICS
    // =========================================================================

    /// Batched withdrawal items by outcome
    pub static ref WITHDRAWALS: CounterVec = CounterVec::new(
        Opts::new("ledger_withdrawals_total", "Withdrawal items by outcome"),
        &["outcome"]  // applied / failed
    ).expect("metric creation failed");

    /// Failed withdrawal items by error code
    pub static ref WITHDRAWAL_FAILURES: CounterVec = CounterVec::new(
        Opts::new("ledger_withdrawal_failures_total", "Failed withdrawal items by error code"),
        &["code"]
    ).expect("metric creation failed");

    /// Withdrawal batches by outcome
    pub static ref WITHDRAWAL_BATCHES: CounterVec = CounterVec::new(
        Opts::new("ledger_withdrawal_batches_total", "Withdrawal batches by outcome"),
        &["outcome"]  // processed / rolled_back / aborted
    ).expect("metric creation failed");

    /// Sovereign withdrawals by stage
    pub static ref SOVEREIGN_WITHDRAWALS: CounterVec = CounterVec::new(
        Opts::new("ledger_sovereign_withdrawals_total", "Sovereign withdrawals by stage"),
        &["stage"]  // requested / completed
    ).expect("metric creation failed");

    // =========================================================================
    // SETTLEMENT METRICS
    // =========================================================================

    /// Settlement batches by outcome
    pub static ref SETTLEMENT_BATCHES: CounterVec = CounterVec::new(
        Opts::new("ledger_settlement_batches_total", "Settlement batches by outcome"),
        &["outcome"]  // prepared / failed / submitted / rolled_back / rejected
    ).expect("metric creation failed");

    // =========================================================================
    // ERROR METRICS
    // =========================================================================

    /// Rejected calls and skipped items by reason
    pub static ref LEDGER_ERRORS: CounterVec = CounterVec::new(
        Opts::new("ledger_errors_total", "Rejected calls and skipped items by reason"),
        &["reason"]
    ).expect("metric creation failed");
}

/// Handle for the registered metrics
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(DEPOSITS.clone()),
        Box::new(AMOUNT_ADJUSTMENTS.clone()),
        Box::new(WITHDRAWALS.clone()),
        Box::new(WITHDRAWAL_FAILURES.clone()),
        Box::new(WITHDRAWAL_BATCHES.clone()),
        Box::new(SOVEREIGN_WITHDRAWALS.clone()),
        Box::new(SETTLEMENT_BATCHES.clone()),
        Box::new(LEDGER_ERRORS.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
