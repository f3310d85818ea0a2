// 🗃️ Summary Cache - computed rankings keyed by population
//
// Sources are static per deployment, so entries live until someone calls
// invalidate()/invalidate_all() explicitly.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::disclosure::Population;
use crate::ranking::RankedMember;

#[derive(Debug, Default)]
pub struct SummaryCache {
    entries: RwLock<HashMap<Population, Arc<Vec<RankedMember>>>>,
}

impl SummaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, population: Population) -> Option<Arc<Vec<RankedMember>>> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(&population).cloned())
    }

    /// Return the cached ranking, computing it on first use.
    ///
    /// Two callers racing on an empty key may both compute; the first insert
    /// wins and both get the same Arc afterwards.
    pub fn get_or_compute<F>(&self, population: Population, compute: F) -> Arc<Vec<RankedMember>>
    where
        F: FnOnce() -> Vec<RankedMember>,
    {
        if let Some(hit) = self.get(population) {
            return hit;
        }

        let computed = Arc::new(compute());
        debug!(population = %population, count = computed.len(), "summary cache filled");

        match self.entries.write() {
            Ok(mut entries) => entries.entry(population).or_insert(computed).clone(),
            // Poisoned lock: serve the fresh value uncached
            Err(_) => computed,
        }
    }

    pub fn invalidate(&self, population: Population) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(&population);
        }
    }

    pub fn invalidate_all(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
