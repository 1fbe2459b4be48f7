use std::cmp::Ordering;
use std::collections::HashSet;

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::format::round2;
use crate::query::{Query, SortMode};
use crate::snapshot::Snapshot;
use crate::{DocId, Event};

#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub doc_id: DocId,
    pub score: f32,
    pub distance_km: Option<f64>,
}

/// One page of ranked hits plus what the formatter needs to render them.
#[derive(Debug, Clone)]
pub struct RankedPage {
    pub total: usize,
    pub page: usize,
    pub size: usize,
    /// The sort actually applied.
    pub sort: SortMode,
    pub hits: Vec<Hit>,
    pub matched_terms: HashSet<String>,
}

pub struct Planner<'a> {
    snapshot: &'a Snapshot,
    config: &'a EngineConfig,
}

impl<'a> Planner<'a> {
    pub fn new(snapshot: &'a Snapshot, config: &'a EngineConfig) -> Self {
        Self { snapshot, config }
    }

    /// Intersection of every filter the query supplies, smallest set first.
    /// `None` means no filter was given.
    pub fn filter_set(&self, query: &Query) -> Option<Vec<DocId>> {
        let facets = &self.snapshot.facets;
        let mut sets: Vec<Vec<DocId>> = Vec::new();
        if let Some(category) = &query.category {
            sets.push(facets.filter_category(category));
        }
        if let Some(city) = &query.city {
            sets.push(facets.filter_city(city));
        }
        if let Some(country) = &query.country {
            sets.push(facets.filter_country(country));
        }
        if let Some(range) = &query.date_range {
            sets.push(facets.filter_date_range(range.from, range.to));
        }
        if let Some(max) = query.price_max {
            sets.push(facets.filter_price_max(max));
        }
        if let Some(geo) = &query.geo {
            let radius = geo.radius_or(self.config.default_radius_km);
            sets.push(self.snapshot.geo.within_radius(geo.origin, radius));
        }

        sets.sort_by_key(Vec::len);
        let mut iter = sets.into_iter();
        let first = iter.next()?;
        let filtered = iter.fold(first, |acc, s| if acc.is_empty() { acc } else { intersect(&acc, &s) });
        tracing::debug!(candidates = filtered.len(), "filter set");
        Some(filtered)
    }

    pub fn execute(&self, query: &Query) -> EngineResult<RankedPage> {
        let filter = self.filter_set(query);
        let text = self
            .snapshot
            .text
            .match_query(&query.text, &self.config.boosts, &self.config.fuzziness);

        let candidates: Vec<DocId> = match (text.match_all, filter) {
            (true, Some(filtered)) => filtered,
            (true, None) => self.snapshot.store.all_doc_ids(),
            (false, Some(filtered)) => filtered.into_iter().filter(|d| text.docs.contains_key(d)).collect(),
            (false, None) => text.docs.keys().copied().collect(),
        };

        let mut ranked: Vec<(Hit, &Event)> = Vec::with_capacity(candidates.len());
        for doc_id in candidates {
            let event = self.snapshot.store.expect_doc(doc_id)?;
            let distance_km = match &query.geo {
                Some(geo) => Some(self.snapshot.geo.distance_km(geo.origin, doc_id)?),
                None => None,
            };
            ranked.push((Hit { doc_id, score: text.score(doc_id), distance_km }, event));
        }

        let sort = query.effective_sort();
        if sort != query.sort {
            tracing::debug!("distance sort requested without an origin, ranking by relevance");
        }
        ranked.sort_by(|(ha, ea), (hb, eb)| compare(sort, ha, ea, hb, eb));

        let total = ranked.len();
        let offset = (query.page - 1).saturating_mul(query.size);
        let hits = ranked
            .into_iter()
            .skip(offset)
            .take(query.size)
            .map(|(mut hit, _)| {
                hit.distance_km = hit.distance_km.map(round2);
                hit
            })
            .collect();

        Ok(RankedPage {
            total,
            page: query.page,
            size: query.size,
            sort,
            hits,
            matched_terms: text.matched_terms,
        })
    }
}

/// Ordering for `sort`, always finished by event id so equal keys rank the same way every time.
fn compare(sort: SortMode, a: &Hit, ea: &Event, b: &Hit, eb: &Event) -> Ordering {
    let primary = match sort {
        SortMode::Relevance => b.score.total_cmp(&a.score).then_with(|| ea.date.cmp(&eb.date)),
        SortMode::Date => ea.date.cmp(&eb.date),
        SortMode::Price => ea.price.total_cmp(&eb.price),
        SortMode::Popularity => eb.attendees.cmp(&ea.attendees),
        SortMode::Distance => a
            .distance_km
            .unwrap_or(f64::INFINITY)
            .total_cmp(&b.distance_km.unwrap_or(f64::INFINITY)),
    };
    primary.then_with(|| ea.id.cmp(&eb.id))
}

/// Intersection of two ascending doc id lists.
pub fn intersect(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}
