use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use time::Date;

use crate::store::DocumentStore;
use crate::DocId;

/// Exact-match keyword facet. Remembers first-seen order so equal counts rank
/// in insertion order.
#[derive(Debug, Default)]
pub struct TermsFacet {
    order: Vec<String>,
    docs: HashMap<String, Vec<DocId>>,
}

impl TermsFacet {
    fn insert(&mut self, value: &str, doc_id: DocId) {
        match self.docs.get_mut(value) {
            Some(list) => list.push(doc_id),
            None => {
                self.order.push(value.to_string());
                self.docs.insert(value.to_string(), vec![doc_id]);
            }
        }
    }

    /// Sorted doc ids carrying exactly `value`; unknown values yield nothing.
    pub fn get(&self, value: &str) -> &[DocId] {
        self.docs.get(value).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// (value, count) by descending count, ties in insertion order, at most `limit`.
    pub fn counts(&self, limit: usize) -> Vec<(String, usize)> {
        let mut out: Vec<(String, usize)> = self
            .order
            .iter()
            .map(|v| (v.clone(), self.docs[v].len()))
            .collect();
        // stable sort keeps insertion order among equal counts
        out.sort_by(|a, b| b.1.cmp(&a.1));
        out.truncate(limit);
        out
    }
}

#[derive(Debug, Default)]
pub struct FacetIndex {
    pub categories: TermsFacet,
    pub cities: TermsFacet,
    pub countries: TermsFacet,
    dates: BTreeMap<Date, Vec<DocId>>,
    /// (price, doc) sorted by price then doc.
    prices: Vec<(f64, DocId)>,
    price_total: f64,
}

impl FacetIndex {
    pub fn build(store: &DocumentStore) -> Self {
        let mut facets = Self::default();
        for (doc_id, ev) in store.iter() {
            facets.categories.insert(&ev.category, doc_id);
            facets.cities.insert(&ev.city, doc_id);
            facets.countries.insert(&ev.country, doc_id);
            facets.dates.entry(ev.date).or_default().push(doc_id);
            facets.prices.push((ev.price, doc_id));
            facets.price_total += ev.price;
        }
        facets.prices.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        facets
    }

    pub fn filter_category(&self, name: &str) -> Vec<DocId> {
        self.categories.get(name).to_vec()
    }

    pub fn filter_city(&self, name: &str) -> Vec<DocId> {
        self.cities.get(name).to_vec()
    }

    pub fn filter_country(&self, name: &str) -> Vec<DocId> {
        self.countries.get(name).to_vec()
    }

    /// Inclusive on both bounds; a missing bound leaves that side open.
    pub fn filter_date_range(&self, from: Option<Date>, to: Option<Date>) -> Vec<DocId> {
        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Vec::new();
            }
        }
        let lower = from.map_or(Bound::Unbounded, Bound::Included);
        let upper = to.map_or(Bound::Unbounded, Bound::Included);
        let mut out: Vec<DocId> = self
            .dates
            .range((lower, upper))
            .flat_map(|(_, docs)| docs.iter().copied())
            .collect();
        out.sort_unstable();
        out
    }

    /// Documents priced at or below `max`.
    pub fn filter_price_max(&self, max: f64) -> Vec<DocId> {
        let end = self.prices.partition_point(|(p, _)| *p <= max);
        let mut out: Vec<DocId> = self.prices[..end].iter().map(|(_, d)| *d).collect();
        out.sort_unstable();
        out
    }

    pub fn categories_with_counts(&self, limit: usize) -> Vec<(String, usize)> {
        self.categories.counts(limit)
    }

    pub fn cities_with_counts(&self, limit: usize) -> Vec<(String, usize)> {
        self.cities.counts(limit)
    }

    /// Mean price over all documents, `None` for an empty corpus.
    pub fn average_price(&self) -> Option<f64> {
        if self.prices.is_empty() {
            None
        } else {
            Some(self.price_total / self.prices.len() as f64)
        }
    }
}
