// Seeded pseudo-random generation for spawn layouts.
//
// The generator is a plain 32-bit linear congruential generator. Its state is
// explicit so a layout can be reproduced by constructing `Lcg::new(seed)` and
// drawing in the same order.
use chrono::{Datelike, NaiveDate};

const LCG_MULTIPLIER: u32 = 1_664_525;
const LCG_INCREMENT: u32 = 1_013_904_223;

const LAT_SEED_FACTOR: u64 = 31_337;
const LNG_SEED_FACTOR: u64 = 13_337;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Lcg { state: seed }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    /// Advance the state and return the next raw 32-bit value.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state
    }

    /// Next value in `[0, 1]`.
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / u32::MAX as f64
    }
}

/// Encode a date as the integer `YYYYMMDD`.
pub fn date_number(date: NaiveDate) -> u64 {
    date.year() as u64 * 10_000 + date.month() as u64 * 100 + date.day() as u64
}

/// Seed for a snapped cell on a given day. Same cell and day give the same
/// seed; the arithmetic wraps modulo 2^32.
pub fn cell_seed(cell_lat: f64, cell_lng: f64, date: NaiveDate) -> u32 {
    let lat_part = (cell_lat * 10_000.0).floor().abs() as u64;
    let lng_part = (cell_lng * 10_000.0).floor().abs() as u64;
    let mixed = lat_part
        .wrapping_mul(LAT_SEED_FACTOR)
        .wrapping_add(lng_part.wrapping_mul(LNG_SEED_FACTOR))
        .wrapping_add(date_number(date));
    mixed as u32
}
