// In-memory, short-lived player positions for the "nearby hunters" map.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::engine::spatial::BoundingBox;
use crate::metrics;

pub const DEFAULT_PRESENCE_TTL: Duration = Duration::from_secs(3 * 60);

#[derive(Debug, Clone)]
struct PresenceEntry {
    lat: f64,
    lng: f64,
    last_seen: Instant,
    display_name: String,
    level: i64,
}

/// Another player seen near a point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyPlayer {
    pub user_id: String,
    pub lat: f64,
    pub lng: f64,
    pub display_name: String,
    pub level: i64,
}

/// Thread-safe presence map keyed by user id. Entries older than the TTL
/// are dropped whenever the map is read.
#[derive(Debug, Clone)]
pub struct PresenceCache {
    inner: Arc<Mutex<HashMap<String, PresenceEntry>>>,
    ttl: Duration,
}

impl PresenceCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, PresenceEntry>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn update(&self, user_id: &str, lat: f64, lng: f64, display_name: String, level: i64) {
        self.update_at(user_id, lat, lng, display_name, level, Instant::now());
    }

    pub fn update_at(
        &self,
        user_id: &str,
        lat: f64,
        lng: f64,
        display_name: String,
        level: i64,
        now: Instant,
    ) {
        let mut map = self.lock();
        map.insert(
            user_id.to_string(),
            PresenceEntry {
                lat,
                lng,
                last_seen: now,
                display_name,
                level,
            },
        );
        metrics::PRESENCE_ENTRIES.set(map.len() as i64);
    }

    /// Players other than `exclude` within `radius_km` of the point.
    pub fn nearby(
        &self,
        lat: f64,
        lng: f64,
        radius_km: f64,
        exclude: Option<&str>,
    ) -> Vec<NearbyPlayer> {
        self.nearby_at(lat, lng, radius_km, exclude, Instant::now())
    }

    pub fn nearby_at(
        &self,
        lat: f64,
        lng: f64,
        radius_km: f64,
        exclude: Option<&str>,
        now: Instant,
    ) -> Vec<NearbyPlayer> {
        let area = BoundingBox::from_radius_km(lat, lng, radius_km);
        let mut map = self.lock();

        let ttl = self.ttl;
        map.retain(|_, p| now.saturating_duration_since(p.last_seen) <= ttl);
        metrics::PRESENCE_ENTRIES.set(map.len() as i64);

        let mut nearby: Vec<NearbyPlayer> = map
            .iter()
            .filter(|(uid, _)| exclude != Some(uid.as_str()))
            .filter(|(_, p)| area.contains(p.lat, p.lng))
            .map(|(uid, p)| NearbyPlayer {
                user_id: uid.clone(),
                lat: p.lat,
                lng: p.lng,
                display_name: p.display_name.clone(),
                level: p.level,
            })
            .collect();
        nearby.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        nearby
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PresenceCache {
    fn default() -> Self {
        Self::new(DEFAULT_PRESENCE_TTL)
    }
}
