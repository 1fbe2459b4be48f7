use time::OffsetDateTime;

use crate::error::EngineResult;
use crate::facet::FacetIndex;
use crate::geo::GeoIndex;
use crate::index::InvertedIndex;
use crate::store::DocumentStore;
use crate::Event;

/// Every index over one corpus, built together and never mutated afterwards.
pub struct Snapshot {
    pub store: DocumentStore,
    pub text: InvertedIndex,
    pub geo: GeoIndex,
    pub facets: FacetIndex,
    pub generation: u64,
    pub built_at: OffsetDateTime,
}

impl Snapshot {
    pub fn build(events: Vec<Event>, generation: u64) -> EngineResult<Self> {
        let mut store = DocumentStore::new();
        store.put(events)?;
        let text = InvertedIndex::build(&store);
        let geo = GeoIndex::build(&store);
        let facets = FacetIndex::build(&store);
        tracing::info!(
            generation,
            num_docs = store.count(),
            num_terms = text.num_terms(),
            num_categories = facets.categories.len(),
            "snapshot built"
        );
        Ok(Self { store, text, geo, facets, generation, built_at: OffsetDateTime::now_utc() })
    }

    pub fn num_docs(&self) -> usize {
        self.store.count()
    }
}
