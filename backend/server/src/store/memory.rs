//! # In-process store
//!
//! Treap of entries plus a per-player index of keys, both behind one
//! `RwLock`. Writers hold the write guard for the insert and the eviction that
//! follows it, so readers never see the board above its bound. Nothing under
//! the guard awaits.
use std::{
    collections::{BTreeSet, HashMap},
    sync::atomic::{AtomicU64, Ordering},
};

use parking_lot::RwLock;
use tracing::debug;

use super::{RankedStore, ranked::RankedSet};
use crate::{
    entry::{Entry, Key},
    error::StoreError,
};

#[derive(Default)]
struct Inner {
    entries: RankedSet<Key, Entry>,
    players: HashMap<String, BTreeSet<Key>>,
}

impl Inner {
    fn insert(&mut self, entry: Entry) {
        let key = entry.key();
        self.players
            .entry(entry.player.clone())
            .or_default()
            .insert(key);

        if let Some(replaced) = self.entries.insert(key, entry) {
            self.unindex(&replaced);
        }
    }

    fn remove_lowest(&mut self, count: usize) -> usize {
        let evicted = self.entries.pop_back(count);
        for entry in &evicted {
            self.unindex(entry);
        }

        #[cfg(feature = "verbose")]
        for entry in &evicted {
            debug!("Evicted {} ({})", entry.player, entry.score);
        }

        evicted.len()
    }

    fn truncate(&mut self, max: usize) -> usize {
        let surplus = self.entries.len().saturating_sub(max);
        if surplus == 0 {
            return 0;
        }

        let evicted = self.remove_lowest(surplus);
        debug!("Evicted {evicted} entries to stay within {max}");

        evicted
    }

    fn unindex(&mut self, entry: &Entry) {
        if let Some(keys) = self.players.get_mut(&entry.player) {
            keys.remove(&entry.key());

            if keys.is_empty() {
                self.players.remove(&entry.player);
            }
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RankedStore for MemoryStore {
    async fn next_seq(&self) -> Result<u64, StoreError> {
        Ok(self.seq.fetch_add(1, Ordering::Relaxed))
    }

    async fn insert(&self, entry: Entry) -> Result<(), StoreError> {
        self.inner.write().insert(entry);

        Ok(())
    }

    async fn range_descending(&self, offset: usize, count: usize) -> Result<Vec<Entry>, StoreError> {
        let inner = self.inner.read();

        Ok(inner
            .entries
            .range(offset, count)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn rank(&self, entry: &Entry) -> Result<Option<usize>, StoreError> {
        Ok(self.inner.read().entries.rank(&entry.key()))
    }

    async fn best_of(&self, player: &str) -> Result<Option<Entry>, StoreError> {
        let inner = self.inner.read();

        Ok(inner
            .players
            .get(player)
            .and_then(BTreeSet::first)
            .and_then(|key| inner.entries.get(key))
            .cloned())
    }

    async fn size(&self) -> Result<usize, StoreError> {
        Ok(self.inner.read().entries.len())
    }

    async fn remove_lowest(&self, count: usize) -> Result<usize, StoreError> {
        Ok(self.inner.write().remove_lowest(count))
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        inner.entries.clear();
        inner.players.clear();

        Ok(())
    }

    async fn truncate(&self, max: usize) -> Result<usize, StoreError> {
        Ok(self.inner.write().truncate(max))
    }

    async fn insert_bounded(&self, entry: Entry, max: usize) -> Result<usize, StoreError> {
        let mut inner = self.inner.write();
        inner.insert(entry);

        Ok(inner.truncate(max))
    }
}
