//! HTTP metric endpoints.
//!
//! Two independent surfaces over the same store snapshot:
//! * JSON: `GET /metrics` returns every standardized series with its
//!   current value and full ring history (oldest first).
//! * Prometheus: `GET /metrics` returns text exposition, with metric
//!   hierarchy folded into labels.
//!
//! Each server runs on its own worker thread with its own runtime; failures
//! are logged and the TUI carries on without them.

use std::sync::Arc;
use std::thread;

use axum::{Router, extract::State, http::StatusCode, response::Json, routing::get};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{error, info};

use strata_core::MetricStore;

#[derive(Serialize)]
struct SeriesBody {
    current: f64,
    history: Vec<f64>,
}

async fn handle_json_metrics(State(store): State<Arc<MetricStore>>) -> Json<Value> {
    let mut body = Map::new();
    for (name, history) in store.snapshot_all() {
        let Some(&current) = history.last() else {
            continue;
        };
        let series = SeriesBody { current, history };
        body.insert(name, serde_json::to_value(series).expect("series serializes"));
    }
    Json(Value::Object(body))
}

async fn handle_prometheus_metrics(State(store): State<Arc<MetricStore>>) -> (StatusCode, String) {
    (StatusCode::OK, render_prometheus(&store.snapshot_all()))
}

async fn handle_not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "not found")
}

fn json_router(store: Arc<MetricStore>) -> Router {
    Router::new()
        .route("/metrics", get(handle_json_metrics))
        .fallback(handle_not_found)
        .with_state(store)
}

fn prometheus_router(store: Arc<MetricStore>) -> Router {
    Router::new()
        .route("/metrics", get(handle_prometheus_metrics))
        .fallback(handle_not_found)
        .with_state(store)
}

async fn serve(router: Router, host: &str, port: u16, what: &str) {
    let addr = format!("{host}:{port}");
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("{what} server cannot bind {addr}: {e}");
            return;
        }
    };
    info!("{what} metrics at http://{addr}/metrics");
    if let Err(e) = axum::serve(listener, router).await {
        error!("{what} server stopped: {e}");
    }
}

/// Serve the JSON endpoint from a dedicated worker thread.
pub fn spawn_json_server(
    store: Arc<MetricStore>,
    host: String,
    port: u16,
) -> thread::JoinHandle<()> {
    thread::spawn(move || match tokio::runtime::Runtime::new() {
        Ok(rt) => rt.block_on(serve(json_router(store), &host, port, "json")),
        Err(e) => error!("json server runtime: {e}"),
    })
}

/// Serve the Prometheus endpoint from a dedicated worker thread.
pub fn spawn_prometheus_server(
    store: Arc<MetricStore>,
    host: String,
    port: u16,
) -> thread::JoinHandle<()> {
    thread::spawn(move || match tokio::runtime::Runtime::new() {
        Ok(rt) => rt.block_on(serve(prometheus_router(store), &host, port, "prometheus")),
        Err(e) => error!("prometheus server runtime: {e}"),
    })
}

/// A standardized name mapped onto the Prometheus data model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromSeries {
    pub family: String,
    pub labels: Vec<(&'static str, String)>,
}

fn snake_case(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Fold a dotted metric name into a Prometheus family plus labels derived
/// from the hierarchy. Anything without a dedicated rule keeps its full
/// snake-cased name, unlabeled.
pub fn prometheus_series(name: &str) -> PromSeries {
    let parts: Vec<&str> = name.split('.').collect();
    let (family, labels): (String, Vec<(&'static str, String)>) = match parts.as_slice() {
        ["cpu", cluster, idx, "core", core, "utilization", "percent"] => (
            "cpu_utilization_percent".into(),
            vec![
                ("cluster", cluster.to_string()),
                ("cluster_index", idx.to_string()),
                ("core", core.to_string()),
            ],
        ),
        ["cpu", cluster, idx, "total", "utilization", "percent"] => (
            "cpu_utilization_percent".into(),
            vec![
                ("cluster", cluster.to_string()),
                ("cluster_index", idx.to_string()),
            ],
        ),
        ["gpu", vendor, idx, "compute", "utilization", "percent"] => (
            "gpu_compute_utilization_percent".into(),
            vec![("vendor", vendor.to_string()), ("gpu", idx.to_string())],
        ),
        ["gpu", vendor, idx, "memory", kind, "bytes"] => (
            format!("gpu_memory_{kind}_bytes"),
            vec![("vendor", vendor.to_string()), ("gpu", idx.to_string())],
        ),
        ["disk", "device", device, dir, "bytes_per_sec"] => (
            format!("disk_{dir}_bytes_per_sec"),
            vec![("device", device.to_string())],
        ),
        ["disk", "total", dir, "bytes_per_sec"] => (
            format!("disk_{dir}_bytes_per_sec"),
            vec![("device", "total".to_string())],
        ),
        ["network", "interface", iface, dir, "bytes_per_sec"] => (
            format!("network_{dir}_bytes_per_sec"),
            vec![("interface", iface.to_string())],
        ),
        ["network", "total", dir, "bytes_per_sec"] => (
            format!("network_{dir}_bytes_per_sec"),
            vec![("interface", "total".to_string())],
        ),
        _ => (snake_case(name), Vec::new()),
    };
    PromSeries { family, labels }
}

/// Render a store snapshot as Prometheus text exposition. `# HELP` and
/// `# TYPE` appear once per family, before its first sample.
pub fn render_prometheus(snapshot: &[(String, Vec<f64>)]) -> String {
    let mut out = String::new();
    let mut seen_families: Vec<String> = Vec::new();

    for (name, history) in snapshot {
        let Some(current) = history.last() else {
            continue;
        };
        let series = prometheus_series(name);
        if !seen_families.contains(&series.family) {
            out.push_str(&format!(
                "# HELP {family} Telemetry gauge {name}\n# TYPE {family} gauge\n",
                family = series.family
            ));
            seen_families.push(series.family.clone());
        }
        if series.labels.is_empty() {
            out.push_str(&format!("{} {current}\n", series.family));
        } else {
            let labels = series
                .labels
                .iter()
                .map(|(k, v)| format!("{k}=\"{v}\""))
                .collect::<Vec<_>>()
                .join(",");
            out.push_str(&format!("{}{{{labels}}} {current}\n", series.family));
        }
    }
    out
}
