// Pure game rules: no I/O, no clock reads. Callers pass `now` explicitly.

pub mod beast;
pub mod config;
pub mod creature;
pub mod names;
pub mod player;
pub mod quests;
pub mod rng;
pub mod season;
pub mod spatial;
pub mod spawn;
