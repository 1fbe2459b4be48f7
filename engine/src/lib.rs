use serde::{Deserialize, Serialize};
use time::Date;

pub mod config;
pub mod engine;
pub mod error;
pub mod facet;
pub mod format;
pub mod fuzzy;
pub mod geo;
pub mod highlight;
pub mod index;
pub mod persist;
pub mod planner;
pub mod query;
pub mod snapshot;
pub mod store;
pub mod tokenizer;

pub use crate::config::EngineConfig;
pub use crate::engine::Engine;
pub use crate::error::{EngineError, EngineResult};
pub use crate::format::{CategoryCount, EventHit, Highlight, MapResponse, SearchResponse, StatsOverview};
pub use crate::query::{BoundingBox, DateRange, GeoFilter, Query, SortMode};
pub use crate::snapshot::Snapshot;

/// Dense document number, assigned in load order within one snapshot.
pub type DocId = u32;
pub type TermId = u32;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Rejects out-of-range (and non-finite) coordinates instead of clamping.
    pub fn validate(&self) -> EngineResult<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(EngineError::validation(format!("latitude {} is outside [-90, 90]", self.lat)));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(EngineError::validation(format!("longitude {} is outside [-180, 180]", self.lon)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(with = "iso_date")]
    pub date: Date,
    /// Zero means free.
    pub price: f64,
    pub attendees: u64,
    pub venue: String,
    pub organizer: String,
    pub city: String,
    pub country: String,
    pub location: GeoPoint,
}

impl Event {
    /// Load-time checks; a corpus with a single bad record is rejected as a whole.
    pub fn validate(&self) -> EngineResult<()> {
        if self.id.trim().is_empty() {
            return Err(EngineError::validation("event id must not be empty"));
        }
        if self.title.trim().is_empty() {
            return Err(EngineError::validation(format!("event {} has an empty title", self.id)));
        }
        if self.category.trim().is_empty() {
            return Err(EngineError::validation(format!("event {} has an empty category", self.id)));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(EngineError::validation(format!("event {} has invalid price {}", self.id, self.price)));
        }
        self.location
            .validate()
            .map_err(|e| EngineError::validation(format!("event {}: {}", self.id, e.message())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Event {
        serde_json::from_value(serde_json::json!({
            "id": "evt-1",
            "title": "Yankees vs Red Sox",
            "description": "Classic rivalry game.",
            "category": "Sports",
            "date": "2026-06-20",
            "price": 75,
            "attendees": 47000,
            "venue": "Yankee Stadium",
            "organizer": "MLB",
            "city": "New York",
            "country": "USA",
            "location": { "lat": 40.8296, "lon": -73.9262 }
        }))
        .unwrap()
    }

    #[test]
    fn event_dates_use_calendar_day_format() {
        let ev = sample();
        assert_eq!(ev.date, time::macros::date!(2026 - 06 - 20));
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["date"], "2026-06-20");
    }

    #[test]
    fn missing_required_field_fails_to_deserialize() {
        let res: Result<Event, _> = serde_json::from_value(serde_json::json!({
            "id": "evt-2",
            "title": "No location",
            "description": "",
            "category": "Music",
            "date": "2026-01-01",
            "price": 0,
            "attendees": 0,
            "venue": "",
            "organizer": "",
            "city": "",
            "country": ""
        }));
        assert!(res.is_err());
    }

    #[test]
    fn validate_rejects_bad_records() {
        let mut ev = sample();
        ev.price = -1.0;
        assert!(matches!(ev.validate(), Err(EngineError::Validation(_))));

        let mut ev = sample();
        ev.location.lat = 91.0;
        assert!(matches!(ev.validate(), Err(EngineError::Validation(_))));

        let mut ev = sample();
        ev.id = "  ".into();
        assert!(ev.validate().is_err());

        assert!(sample().validate().is_ok());
    }
}
