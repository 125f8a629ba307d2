// Prometheus metrics definitions for the creature hunt backend.

use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ── Gauges ───────────────────────────────────────────────────────

    /// Players currently visible on the presence map.
    pub static ref PRESENCE_ENTRIES: IntGauge =
        IntGauge::new("creature_hunt_presence_entries", "Players currently on the presence map").unwrap();

    // ── Counters ─────────────────────────────────────────────────────

    /// Grid cells that received a fresh spawn layout.
    pub static ref SPAWN_CELLS_GENERATED_TOTAL: IntCounter = IntCounter::new(
        "creature_hunt_spawn_cells_generated_total",
        "Grid cells that received a fresh spawn layout",
    )
    .unwrap();

    /// Spawns created, by rarity.
    pub static ref SPAWNS_CREATED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("creature_hunt_spawns_created_total", "Spawns created"),
        &["rarity"],
    )
    .unwrap();

    /// Catches recorded, by rarity.
    pub static ref CATCHES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("creature_hunt_catches_total", "Catches recorded"),
        &["rarity"],
    )
    .unwrap();

    pub static ref QUESTS_CLAIMED_TOTAL: IntCounter = IntCounter::new(
        "creature_hunt_quests_claimed_total",
        "Daily quest rewards claimed",
    )
    .unwrap();

    /// Beast evolutions, by the stage reached.
    pub static ref EVOLUTIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("creature_hunt_evolutions_total", "Beast evolutions"),
        &["stage"],
    )
    .unwrap();

    /// Total API requests, by method/endpoint/status.
    pub static ref API_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("creature_hunt_api_requests_total", "Total API requests"),
        &["method", "endpoint", "status"],
    )
    .unwrap();

    // ── Histograms ───────────────────────────────────────────────────

    /// API request duration in seconds, by endpoint.
    pub static ref API_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "creature_hunt_api_request_duration_seconds",
            "API request duration in seconds",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0]),
        &["endpoint"],
    )
    .unwrap();
}

static REGISTER: Once = Once::new();

/// Register all metrics with the custom registry. Repeated calls are no-ops.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(PRESENCE_ENTRIES.clone()),
            Box::new(SPAWN_CELLS_GENERATED_TOTAL.clone()),
            Box::new(SPAWNS_CREATED_TOTAL.clone()),
            Box::new(CATCHES_TOTAL.clone()),
            Box::new(QUESTS_CLAIMED_TOTAL.clone()),
            Box::new(EVOLUTIONS_TOTAL.clone()),
            Box::new(API_REQUESTS_TOTAL.clone()),
            Box::new(API_REQUEST_DURATION_SECONDS.clone()),
        ];

        for c in collectors {
            REGISTRY.register(c).expect("failed to register metric");
        }
    });
}

/// Serialize all registered metrics to the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {e}");
    }
    String::from_utf8(buffer).unwrap_or_default()
}

fn is_id_segment(segment: &str) -> bool {
    segment.parse::<i64>().is_ok() || uuid::Uuid::parse_str(segment).is_ok()
}

/// Normalize a URL path for metric labels: replace numeric and UUID path
/// segments with `:id` to prevent cardinality explosion.
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| if is_id_segment(segment) { ":id" } else { segment })
        .collect::<Vec<_>>()
        .join("/")
}
