// Geographic grid cells and bounding boxes.
//
// The map is divided into square cells of `CELL_SIZE_DEG` degrees. A cell is
// identified by its snapped center; all spawn generation is keyed on it.
use chrono::NaiveDate;
use serde::Serialize;

use super::config::{CELL_SIZE_DEG, KM_PER_DEGREE};
use super::rng::cell_seed;

/// Round half towards positive infinity, so `-0.5` snaps to `0` and `0.5`
/// snaps to `1` on both hemispheres.
fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Axis-aligned latitude/longitude box, inclusive on all edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Box extending `half_deg` degrees in each direction from a point.
    pub fn around(lat: f64, lng: f64, half_deg: f64) -> Self {
        BoundingBox {
            min_lat: lat - half_deg,
            max_lat: lat + half_deg,
            min_lng: lng - half_deg,
            max_lng: lng + half_deg,
        }
    }

    /// Box for a radius in kilometres, using a flat degrees-per-km conversion.
    pub fn from_radius_km(lat: f64, lng: f64, radius_km: f64) -> Self {
        Self::around(lat, lng, radius_km / KM_PER_DEGREE)
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
    }
}

/// A snapped grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cell {
    pub lat: f64,
    pub lng: f64,
}

impl Cell {
    /// The cell whose center is nearest to the given point.
    pub fn containing(lat: f64, lng: f64) -> Self {
        Cell {
            lat: round_half_up(lat / CELL_SIZE_DEG) * CELL_SIZE_DEG,
            lng: round_half_up(lng / CELL_SIZE_DEG) * CELL_SIZE_DEG,
        }
    }

    /// Bounds of this cell widened by `margin_cells` cell edges on each side.
    pub fn bounds(&self, margin_cells: f64) -> BoundingBox {
        BoundingBox::around(self.lat, self.lng, CELL_SIZE_DEG * margin_cells)
    }

    /// Deterministic RNG seed for this cell on `date`.
    pub fn seed(&self, date: NaiveDate) -> u32 {
        cell_seed(self.lat, self.lng, date)
    }
}
