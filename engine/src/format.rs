//! Response shapes handed to callers, and the functions that fill them.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::highlight::highlight;
use crate::planner::RankedPage;
use crate::query::SortMode;
use crate::snapshot::Snapshot;
use crate::{DocId, Event};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventHit {
    #[serde(flatten)]
    pub event: Event,
    pub score: f32,
    /// Highlighted title fragment when there is one, else the raw title.
    pub display_title: String,
    pub display_description: String,
    /// Kilometres from the query origin, two decimals.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub highlight: Option<Highlight>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Size of the full candidate set, independent of paging.
    pub total: usize,
    pub page: usize,
    pub size: usize,
    pub sort: SortMode,
    pub events: Vec<EventHit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapResponse {
    pub total: usize,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

impl From<(String, usize)> for CategoryCount {
    fn from((name, count): (String, usize)) -> Self {
        Self { name, count }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsOverview {
    pub total: usize,
    pub avg_price: f64,
    pub top_categories: Vec<CategoryCount>,
    pub top_cities: Vec<CategoryCount>,
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub fn search_response(snapshot: &Snapshot, ranked: &RankedPage, config: &EngineConfig) -> EngineResult<SearchResponse> {
    let mut events = Vec::with_capacity(ranked.hits.len());
    for hit in &ranked.hits {
        let event = snapshot.store.expect_doc(hit.doc_id)?;
        let hl = Highlight {
            title: highlight(&event.title, &ranked.matched_terms, config.fragment_size),
            description: highlight(&event.description, &ranked.matched_terms, config.fragment_size),
        };
        let display_title = hl.title.clone().unwrap_or_else(|| event.title.clone());
        let display_description = hl.description.clone().unwrap_or_else(|| event.description.clone());
        let fragments = (hl != Highlight::default()).then_some(hl);
        events.push(EventHit {
            event: event.clone(),
            score: hit.score,
            display_title,
            display_description,
            distance: hit.distance_km,
            highlight: fragments,
        });
    }
    Ok(SearchResponse { total: ranked.total, page: ranked.page, size: ranked.size, sort: ranked.sort, events })
}

/// Events for `docs` ordered by identifier, truncated to `cap`; `total` stays the full count.
pub fn map_response(snapshot: &Snapshot, docs: &[DocId], cap: usize) -> EngineResult<MapResponse> {
    let mut events = docs
        .iter()
        .map(|&d| snapshot.store.expect_doc(d))
        .collect::<EngineResult<Vec<&Event>>>()?;
    events.sort_by(|a, b| a.id.cmp(&b.id));
    events.truncate(cap);
    Ok(MapResponse { total: docs.len(), events: events.into_iter().cloned().collect() })
}

pub fn stats_overview(snapshot: &Snapshot, top_n: usize) -> StatsOverview {
    let facets = &snapshot.facets;
    StatsOverview {
        total: snapshot.num_docs(),
        avg_price: facets.average_price().map(round2).unwrap_or(0.0),
        top_categories: facets.categories_with_counts(top_n).into_iter().map(CategoryCount::from).collect(),
        top_cities: facets.cities_with_counts(top_n).into_iter().map(CategoryCount::from).collect(),
    }
}
