//! # Ranked stores
//!
//! Ordered-set backends behind the leaderboard. Positions are 0-based and
//! counted from the top, i.e. position 0 is the best entry.
//!
//! - [`MemoryStore`]: in-process treap, single process only
//! - [`RedisStore`]: Redis sorted set, shared between server replicas
use std::future::Future;

pub mod memory;
mod ranked;
pub mod remote;

pub use memory::MemoryStore;
pub use remote::RedisStore;

use crate::{entry::Entry, error::StoreError};

pub trait RankedStore: Send + Sync {
    /// Fresh disambiguator, strictly increasing per store.
    fn next_seq(&self) -> impl Future<Output = Result<u64, StoreError>> + Send;

    fn insert(&self, entry: Entry) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn range_descending(
        &self,
        offset: usize,
        count: usize,
    ) -> impl Future<Output = Result<Vec<Entry>, StoreError>> + Send;

    fn rank(&self, entry: &Entry) -> impl Future<Output = Result<Option<usize>, StoreError>> + Send;

    /// Highest ranked entry submitted under `player`.
    fn best_of(&self, player: &str)
    -> impl Future<Output = Result<Option<Entry>, StoreError>> + Send;

    fn size(&self) -> impl Future<Output = Result<usize, StoreError>> + Send;

    /// Evicts the `count` lowest ranked entries, returns how many went.
    fn remove_lowest(&self, count: usize) -> impl Future<Output = Result<usize, StoreError>> + Send;

    fn clear(&self) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Evicts from the bottom until at most `max` entries remain.
    fn truncate(&self, max: usize) -> impl Future<Output = Result<usize, StoreError>> + Send {
        async move {
            let size = self.size().await?;
            if size <= max {
                return Ok(0);
            }

            self.remove_lowest(size - max).await
        }
    }

    /// Insert followed by [`RankedStore::truncate`]. Backends override this
    /// when they can make the pair atomic.
    fn insert_bounded(
        &self,
        entry: Entry,
        max: usize,
    ) -> impl Future<Output = Result<usize, StoreError>> + Send {
        async move {
            self.insert(entry).await?;
            self.truncate(max).await
        }
    }
}

/// Backend picked from configuration at startup.
pub enum Store {
    Memory(MemoryStore),
    Redis(RedisStore),
}

macro_rules! delegate {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            Store::Memory($store) => $call.await,
            Store::Redis($store) => $call.await,
        }
    };
}

impl RankedStore for Store {
    async fn next_seq(&self) -> Result<u64, StoreError> {
        delegate!(self, store => store.next_seq())
    }

    async fn insert(&self, entry: Entry) -> Result<(), StoreError> {
        delegate!(self, store => store.insert(entry))
    }

    async fn range_descending(&self, offset: usize, count: usize) -> Result<Vec<Entry>, StoreError> {
        delegate!(self, store => store.range_descending(offset, count))
    }

    async fn rank(&self, entry: &Entry) -> Result<Option<usize>, StoreError> {
        delegate!(self, store => store.rank(entry))
    }

    async fn best_of(&self, player: &str) -> Result<Option<Entry>, StoreError> {
        delegate!(self, store => store.best_of(player))
    }

    async fn size(&self) -> Result<usize, StoreError> {
        delegate!(self, store => store.size())
    }

    async fn remove_lowest(&self, count: usize) -> Result<usize, StoreError> {
        delegate!(self, store => store.remove_lowest(count))
    }

    async fn clear(&self) -> Result<(), StoreError> {
        delegate!(self, store => store.clear())
    }

    async fn truncate(&self, max: usize) -> Result<usize, StoreError> {
        delegate!(self, store => store.truncate(max))
    }

    async fn insert_bounded(&self, entry: Entry, max: usize) -> Result<usize, StoreError> {
        delegate!(self, store => store.insert_bounded(entry, max))
    }
}
