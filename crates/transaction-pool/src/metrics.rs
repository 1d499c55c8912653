use metrics::Counter;
use metrics_derive::Metrics;

/// Pool-wide counters, mirroring the teacher's per-subsystem `Metrics`
/// derive usage (see `reth-network`'s `metrics.rs`).
#[derive(Metrics)]
#[metrics(scope = "transaction_pool")]
pub struct PoolMetrics {
    /// Total transactions that passed the acceptance pipeline.
    pub(crate) transactions_added: Counter,
    /// Total transactions rejected by the acceptance pipeline.
    pub(crate) transactions_rejected: Counter,
    /// Total transactions removed by block reconciliation.
    pub(crate) transactions_mined: Counter,
    /// Total transactions evicted by the cleanup sweep.
    pub(crate) transactions_evicted: Counter,
}
