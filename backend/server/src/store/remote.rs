//! # Redis sorted set
//!
//! ## Keys
//! - `{key}`: sorted set, member is the encoded entry, score is the game score
//! - `{key}:seq`: `INCR` counter feeding entry sequences
//!
//! ## Atomicity
//! Insert and eviction go out as one `MULTI`/`EXEC` pipeline, and eviction is
//! `ZREMRANGEBYRANK key 0 -(max + 1)` which needs no prior `ZCARD`, so
//! concurrent writers from any replica keep the cap.
use std::sync::Arc;

use redis::AsyncCommands;

use super::RankedStore;
use crate::{database::RedisConnector, entry::Entry, error::StoreError};

pub struct RedisStore {
    redis: Arc<RedisConnector>,
    key: String,
    seq_key: String,
}

impl RedisStore {
    pub fn new(redis: Arc<RedisConnector>, key: &str) -> Self {
        Self {
            redis,
            key: key.to_string(),
            seq_key: format!("{key}:seq"),
        }
    }

    fn decode(members: Vec<String>) -> Result<Vec<Entry>, StoreError> {
        members.iter().map(|m| Entry::from_member(m)).collect()
    }
}

impl RankedStore for RedisStore {
    async fn next_seq(&self) -> Result<u64, StoreError> {
        self.redis
            .within(async {
                let mut connection = self.redis.connection().await?;
                let seq: u64 = connection.incr(&self.seq_key, 1).await?;

                Ok::<_, StoreError>(seq)
            })
            .await
    }

    async fn insert(&self, entry: Entry) -> Result<(), StoreError> {
        self.redis
            .within(async {
                let mut connection = self.redis.connection().await?;
                let _: () = connection
                    .zadd(&self.key, entry.to_member(), entry.score)
                    .await?;

                Ok::<_, StoreError>(())
            })
            .await
    }

    async fn range_descending(&self, offset: usize, count: usize) -> Result<Vec<Entry>, StoreError> {
        // a stop of offset - 1 would read as -1, the whole set
        if count == 0 {
            return Ok(Vec::new());
        }

        let start = offset as isize;
        let stop = start + count as isize - 1;

        let members = self
            .redis
            .within(async {
                let mut connection = self.redis.connection().await?;
                let members: Vec<String> = connection.zrevrange(&self.key, start, stop).await?;

                Ok::<_, StoreError>(members)
            })
            .await?;

        Self::decode(members)
    }

    async fn rank(&self, entry: &Entry) -> Result<Option<usize>, StoreError> {
        self.redis
            .within(async {
                let mut connection = self.redis.connection().await?;
                let rank: Option<usize> = connection.zrevrank(&self.key, entry.to_member()).await?;

                Ok::<_, StoreError>(rank)
            })
            .await
    }

    async fn best_of(&self, player: &str) -> Result<Option<Entry>, StoreError> {
        // the set is capped, so a full descending scan stays small
        let members = self
            .redis
            .within(async {
                let mut connection = self.redis.connection().await?;
                let members: Vec<String> = connection.zrevrange(&self.key, 0, -1).await?;

                Ok::<_, StoreError>(members)
            })
            .await?;

        for member in members {
            let entry = Entry::from_member(&member)?;
            if entry.player == player {
                return Ok(Some(entry));
            }
        }

        Ok(None)
    }

    async fn size(&self) -> Result<usize, StoreError> {
        self.redis
            .within(async {
                let mut connection = self.redis.connection().await?;
                let size: usize = connection.zcard(&self.key).await?;

                Ok::<_, StoreError>(size)
            })
            .await
    }

    async fn remove_lowest(&self, count: usize) -> Result<usize, StoreError> {
        if count == 0 {
            return Ok(0);
        }

        self.redis
            .within(async {
                let mut connection = self.redis.connection().await?;
                let removed: usize = connection
                    .zremrangebyrank(&self.key, 0, count as isize - 1)
                    .await?;

                Ok::<_, StoreError>(removed)
            })
            .await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.redis
            .within(async {
                let mut connection = self.redis.connection().await?;
                let _: () = connection.del(&self.key).await?;

                Ok::<_, StoreError>(())
            })
            .await
    }

    async fn truncate(&self, max: usize) -> Result<usize, StoreError> {
        self.redis
            .within(async {
                let mut connection = self.redis.connection().await?;
                let evicted: usize = connection
                    .zremrangebyrank(&self.key, 0, -(max as isize) - 1)
                    .await?;

                Ok::<_, StoreError>(evicted)
            })
            .await
    }

    async fn insert_bounded(&self, entry: Entry, max: usize) -> Result<usize, StoreError> {
        let mut pipe = redis::pipe();
        pipe.atomic()
            .zadd(&self.key, entry.to_member(), entry.score)
            .ignore()
            .zremrangebyrank(&self.key, 0, -(max as isize) - 1);

        self.redis
            .within(async {
                let mut connection = self.redis.connection().await?;
                let (evicted,): (usize,) = pipe.query_async(&mut connection).await?;

                Ok::<_, StoreError>(evicted)
            })
            .await
    }
}
