#![allow(dead_code)]

use engine::{Engine, EngineConfig, Event, GeoPoint};

pub const NYC: GeoPoint = GeoPoint { lat: 40.7128, lon: -74.0060 };

/// The 42-event seed corpus shipped in `data/events.json`.
pub fn seed_events() -> Vec<Event> {
    serde_json::from_str(include_str!("../../../data/events.json")).expect("seed corpus parses")
}

pub fn seeded_engine() -> Engine {
    let engine = Engine::new(EngineConfig::default());
    engine.load(seed_events()).expect("seed corpus loads");
    engine
}
