use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::{FieldBoosts, Fuzziness};
use crate::fuzzy::bounded_distance;
use crate::store::DocumentStore;
use crate::tokenizer::tokenize;
use crate::{DocId, Event, TermId};

/// Text fields that take part in relevance scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Description,
    Venue,
    Organizer,
    City,
}

impl Field {
    pub const ALL: [Field; 5] = [Field::Title, Field::Description, Field::Venue, Field::Organizer, Field::City];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::Venue => "venue",
            Field::Organizer => "organizer",
            Field::City => "city",
        }
    }

    pub fn text<'a>(&self, event: &'a Event) -> &'a str {
        match self {
            Field::Title => &event.title,
            Field::Description => &event.description,
            Field::Venue => &event.venue,
            Field::Organizer => &event.organizer,
            Field::City => &event.city,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    pub doc_id: DocId,
    pub field: Field,
    pub tf: u32,
}

/// Per-document outcome of a text match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocMatch {
    pub fields: BTreeMap<Field, f32>,
}

impl DocMatch {
    /// Best single-field score; a document is as relevant as its best field.
    pub fn score(&self) -> f32 {
        self.fields.values().copied().fold(0.0, f32::max)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextMatch {
    /// True when the query text was empty: every document matches with score 0.
    pub match_all: bool,
    pub docs: BTreeMap<DocId, DocMatch>,
    /// Index terms hit by the query, exact or fuzzy, for highlighting.
    pub matched_terms: HashSet<String>,
}

impl TextMatch {
    pub fn score(&self, doc_id: DocId) -> f32 {
        self.docs.get(&doc_id).map(DocMatch::score).unwrap_or(0.0)
    }
}

#[derive(Debug, Default)]
pub struct InvertedIndex {
    pub dictionary: HashMap<String, TermId>,
    terms: Vec<String>,
    term_chars: Vec<Vec<char>>,
    /// Indexed by term id; each list sorted by (doc_id, field).
    postings: Vec<Vec<Posting>>,
    pub num_docs: u32,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(store: &DocumentStore) -> Self {
        let mut index = Self::new();
        for (doc_id, event) in store.iter() {
            for field in Field::ALL {
                let mut tf_counts: BTreeMap<TermId, u32> = BTreeMap::new();
                for (term, _pos) in tokenize(field.text(event)) {
                    let tid = index.intern(term);
                    *tf_counts.entry(tid).or_insert(0) += 1;
                }
                for (tid, tf) in tf_counts {
                    index.postings[tid as usize].push(Posting { doc_id, field, tf });
                }
            }
            index.num_docs += 1;
        }
        index
    }

    fn intern(&mut self, term: String) -> TermId {
        if let Some(&tid) = self.dictionary.get(&term) {
            return tid;
        }
        let tid = self.terms.len() as TermId;
        self.term_chars.push(term.chars().collect());
        self.terms.push(term.clone());
        self.postings.push(Vec::new());
        self.dictionary.insert(term, tid);
        tid
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn postings(&self, term: &str) -> &[Posting] {
        match self.dictionary.get(term) {
            Some(&tid) => &self.postings[tid as usize],
            None => &[],
        }
    }

    /// Resolve a query token to vocabulary terms with a weight: the exact term
    /// at weight 1, otherwise near misses within the edit budget at `1 / (1 + edits)`.
    pub fn expand(&self, token: &str, fuzziness: &Fuzziness) -> Vec<(TermId, f32)> {
        if let Some(&tid) = self.dictionary.get(token) {
            return vec![(tid, 1.0)];
        }
        let chars: Vec<char> = token.chars().collect();
        let max = fuzziness.max_edits(chars.len());
        if max == 0 {
            return Vec::new();
        }
        let mut near: Vec<(usize, &str, TermId)> = self
            .term_chars
            .iter()
            .enumerate()
            .filter_map(|(tid, cand)| {
                bounded_distance(&chars, cand, max).map(|d| (d, self.terms[tid].as_str(), tid as TermId))
            })
            .collect();
        near.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
        near.truncate(fuzziness.max_expansions);
        near.into_iter().map(|(d, _, tid)| (tid, 1.0 / (1.0 + d as f32))).collect()
    }

    /// Score documents against `query_text`. Per field: sum over query tokens of
    /// tf x field boost (x fuzzy weight). Documents with no matching token are absent.
    pub fn match_query(&self, query_text: &str, boosts: &FieldBoosts, fuzziness: &Fuzziness) -> TextMatch {
        if query_text.trim().is_empty() {
            return TextMatch { match_all: true, ..TextMatch::default() };
        }

        let mut result = TextMatch::default();
        let mut seen: HashSet<String> = HashSet::new();
        for (token, _pos) in tokenize(query_text) {
            if !seen.insert(token.clone()) {
                continue;
            }
            for (tid, weight) in self.expand(&token, fuzziness) {
                let plist = &self.postings[tid as usize];
                if plist.is_empty() {
                    continue;
                }
                result.matched_terms.insert(self.terms[tid as usize].clone());
                for p in plist {
                    let contrib = p.tf as f32 * boosts.boost(p.field) * weight;
                    *result
                        .docs
                        .entry(p.doc_id)
                        .or_default()
                        .fields
                        .entry(p.field)
                        .or_insert(0.0) += contrib;
                }
            }
        }
        tracing::debug!(query = query_text, hits = result.docs.len(), terms = result.matched_terms.len(), "text match");
        result
    }
}
