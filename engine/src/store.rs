use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};
use crate::{DocId, Event};

/// Canonical event records of one snapshot, addressable by external id or doc id.
#[derive(Debug, Default)]
pub struct DocumentStore {
    events: Vec<Event>,
    ids: HashMap<String, DocId>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a batch. The batch is validated in full before anything is stored,
    /// so a failing batch leaves the store unchanged.
    pub fn put(&mut self, events: Vec<Event>) -> EngineResult<Vec<String>> {
        let mut batch_ids: HashMap<&str, usize> = HashMap::with_capacity(events.len());
        for (i, ev) in events.iter().enumerate() {
            ev.validate()?;
            if self.ids.contains_key(&ev.id) || batch_ids.insert(ev.id.as_str(), i).is_some() {
                return Err(EngineError::validation(format!("duplicate event id {}", ev.id)));
            }
        }
        drop(batch_ids);

        let mut out = Vec::with_capacity(events.len());
        for ev in events {
            let doc_id = self.events.len() as DocId;
            self.ids.insert(ev.id.clone(), doc_id);
            out.push(ev.id.clone());
            self.events.push(ev);
        }
        Ok(out)
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.ids.get(id).map(|&doc| &self.events[doc as usize])
    }

    pub fn doc(&self, doc_id: DocId) -> Option<&Event> {
        self.events.get(doc_id as usize)
    }

    /// Like [`DocumentStore::doc`], for ids handed out by an index of the same
    /// snapshot: a miss means the snapshot is inconsistent.
    pub fn expect_doc(&self, doc_id: DocId) -> EngineResult<&Event> {
        self.doc(doc_id)
            .ok_or_else(|| EngineError::corrupted(format!("doc id {doc_id} has no stored event")))
    }

    pub fn doc_id(&self, id: &str) -> Option<DocId> {
        self.ids.get(id).copied()
    }

    pub fn count(&self) -> usize {
        self.events.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DocId, &Event)> {
        self.events.iter().enumerate().map(|(i, ev)| (i as DocId, ev))
    }

    pub fn all_doc_ids(&self) -> Vec<DocId> {
        (0..self.events.len() as DocId).collect()
    }
}
