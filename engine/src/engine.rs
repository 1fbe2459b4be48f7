//! The public face of the search engine.
//!
//! An [`Engine`] owns the current [`Snapshot`] behind an `Arc`. Queries clone
//! the `Arc` and run without holding any lock, so a reload never blocks or
//! disturbs them: it builds a complete new snapshot off to the side and then
//! swaps the pointer. Reloads are serialized with each other.

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::format::{self, CategoryCount, MapResponse, SearchResponse, StatsOverview};
use crate::planner::{intersect, Planner};
use crate::query::{BoundingBox, Query};
use crate::snapshot::Snapshot;
use crate::Event;

pub struct Engine {
    config: EngineConfig,
    current: RwLock<Option<Arc<Snapshot>>>,
    /// Held for the duration of a reload; counts published snapshots.
    rebuild: Mutex<u64>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config, current: RwLock::new(None), rebuild: Mutex::new(0) }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }

    /// The live snapshot. Holding on to it keeps it alive across reloads.
    pub fn snapshot(&self) -> EngineResult<Arc<Snapshot>> {
        self.current.read().clone().ok_or(EngineError::IndexUnavailable)
    }

    /// Replace the whole corpus. On error the previous snapshot stays live.
    pub fn load(&self, events: Vec<Event>) -> EngineResult<usize> {
        let mut generation = self.rebuild.lock();
        let next = *generation + 1;
        let snapshot = match Snapshot::build(events, next) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "load rejected, keeping previous snapshot");
                return Err(e);
            }
        };
        let num_docs = snapshot.num_docs();
        *self.current.write() = Some(Arc::new(snapshot));
        *generation = next;
        tracing::info!(generation = next, num_docs, "snapshot published");
        Ok(num_docs)
    }

    pub fn search(&self, query: &Query) -> EngineResult<SearchResponse> {
        query.validate(&self.config)?;
        let snapshot = self.snapshot()?;
        let ranked = Planner::new(&snapshot, &self.config).execute(query)?;
        format::search_response(&snapshot, &ranked, &self.config)
    }

    /// Unscored events inside `bbox`, optionally restricted to one category.
    pub fn search_within_box(&self, bbox: &BoundingBox, category: Option<&str>) -> EngineResult<MapResponse> {
        bbox.validate()?;
        let snapshot = self.snapshot()?;
        let mut docs = snapshot.geo.within_box(bbox);
        if let Some(category) = category {
            docs = intersect(&docs, snapshot.facets.categories.get(category));
        }
        format::map_response(&snapshot, &docs, self.config.map_result_cap)
    }

    pub fn list_categories(&self) -> EngineResult<Vec<CategoryCount>> {
        let snapshot = self.snapshot()?;
        Ok(snapshot
            .facets
            .categories_with_counts(self.config.max_categories)
            .into_iter()
            .map(CategoryCount::from)
            .collect())
    }

    pub fn get_by_id(&self, id: &str) -> EngineResult<Event> {
        let snapshot = self.snapshot()?;
        snapshot
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(id.to_string()))
    }

    pub fn stats_overview(&self) -> EngineResult<StatsOverview> {
        let snapshot = self.snapshot()?;
        Ok(format::stats_overview(&snapshot, self.config.stats_top_n))
    }
}
