use axum::routing::get;
use axum::Router;
use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};
use tracing::warn;

static CLUSTER_OPS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "virtty_cluster_ops_total",
        "Cluster API calls issued, partitioned by operation and outcome.",
        &["op", "outcome"]
    )
    .unwrap()
});

pub fn observe_cluster_op(op: &str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    CLUSTER_OPS.with_label_values(&[op, outcome]).inc();
}

pub fn routes() -> Router {
    async fn export() -> String {
        let mut buf = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&prometheus::gather(), &mut buf) {
            warn!("failed to encode metrics: {}", e);
        }
        String::from_utf8(buf).unwrap_or_default()
    }

    Router::new().route("/metrics", get(export))
}
