//! Runs against a live Redis. Ignored by default:
//!
//! ```sh
//! REDIS_URL=redis://127.0.0.1:6379 cargo test -p server --test redis_store -- --ignored
//! ```
//!
//! Every test works under its own random key.
use std::{sync::Arc, time::Duration};

use redis::AsyncCommands;
use server::{
    database::init_redis,
    entry::Entry,
    leaderboard::Leaderboard,
    store::{RankedStore, RedisStore},
};

fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

fn fresh_key() -> String {
    format!("test:{}:leaderboard", rand::random::<u64>())
}

fn store(key: &str) -> RedisStore {
    let redis = init_redis(&redis_url(), Duration::from_secs(2)).unwrap();

    RedisStore::new(Arc::new(redis), key)
}

async fn cleanup(key: &str) {
    let client = redis::Client::open(redis_url()).unwrap();
    let mut connection = client.get_multiplexed_async_connection().await.unwrap();

    let _: () = connection.del(vec![key.to_string(), format!("{key}:seq")]).await.unwrap();
}

fn players(entries: &[Entry]) -> Vec<&str> {
    entries.iter().map(|e| e.player.as_str()).collect()
}

#[tokio::test]
#[ignore = "needs a running Redis"]
async fn test_bound_holds_past_cap() {
    let key = fresh_key();
    let board = Leaderboard::new(store(&key), 1000, 5);

    for score in 0..1005 {
        board.add_score("p", score).await.unwrap();
    }

    assert_eq!(board.total_scores().await, 1000);

    let all = board.top_scores(1000).await;
    assert_eq!(all.len(), 1000);
    assert_eq!(all[0].score, 1004);
    assert_eq!(all[999].score, 5);
    assert!(all.iter().all(|s| s.score >= 5));

    cleanup(&key).await;
}

#[tokio::test]
#[ignore = "needs a running Redis"]
async fn test_tied_eviction_drops_latest() {
    let key = fresh_key();
    let board = Leaderboard::new(store(&key), 3, 5);

    board.add_score("a", 10).await.unwrap();
    board.add_score("b", 5).await.unwrap();
    board.add_score("c", 5).await.unwrap();
    board.add_score("d", 5).await.unwrap();

    let top: Vec<_> = board
        .top_scores(5)
        .await
        .into_iter()
        .map(|s| (s.rank, s.player, s.score))
        .collect();

    assert_eq!(
        top,
        [
            (1, "a".to_string(), 10),
            (2, "b".to_string(), 5),
            (3, "c".to_string(), 5),
        ]
    );
    assert_eq!(board.player_rank("d").await, None);

    cleanup(&key).await;
}

#[tokio::test]
#[ignore = "needs a running Redis"]
async fn test_rank_uses_best_score() {
    let key = fresh_key();
    let board = Leaderboard::new(store(&key), 1000, 5);

    board.add_score("Alice", 10).await.unwrap();
    board.add_score("Bob", 20).await.unwrap();
    board.add_score("Alice", 30).await.unwrap();
    board.add_score("name:with:colons", 15).await.unwrap();

    assert_eq!(board.player_rank("Alice").await, Some(1));
    assert_eq!(board.player_rank("Bob").await, Some(2));
    assert_eq!(board.player_rank("name:with:colons").await, Some(3));
    assert_eq!(board.player_rank("Zoe").await, None);

    cleanup(&key).await;
}

#[tokio::test]
#[ignore = "needs a running Redis"]
async fn test_range_offsets() {
    let key = fresh_key();
    let store = store(&key);

    for score in 1..=10 {
        let seq = store.next_seq().await.unwrap();
        store.insert(Entry::new(format!("p{score}"), score, seq)).await.unwrap();
    }

    let top = store.range_descending(0, 3).await.unwrap();
    assert_eq!(players(&top), ["p10", "p9", "p8"]);

    let tail = store.range_descending(8, 5).await.unwrap();
    assert_eq!(players(&tail), ["p2", "p1"]);

    assert!(store.range_descending(20, 5).await.unwrap().is_empty());
    assert!(store.range_descending(0, 0).await.unwrap().is_empty());

    assert_eq!(store.remove_lowest(2).await.unwrap(), 2);
    assert_eq!(store.size().await.unwrap(), 8);
    assert_eq!(store.truncate(5).await.unwrap(), 3);

    let left = store.range_descending(0, 10).await.unwrap();
    assert_eq!(players(&left), ["p10", "p9", "p8", "p7", "p6"]);

    cleanup(&key).await;
}

#[tokio::test]
#[ignore = "needs a running Redis"]
async fn test_ties_favor_earliest() {
    let key = fresh_key();
    let store = store(&key);

    let mut entries = Vec::new();
    for player in ["first", "second", "third"] {
        let seq = store.next_seq().await.unwrap();
        let entry = Entry::new(player.to_string(), 7, seq);
        store.insert(entry.clone()).await.unwrap();
        entries.push(entry);
    }

    let top = store.range_descending(0, 3).await.unwrap();
    assert_eq!(players(&top), ["first", "second", "third"]);

    for (position, entry) in entries.iter().enumerate() {
        assert_eq!(store.rank(entry).await.unwrap(), Some(position));
    }

    let best = store.best_of("second").await.unwrap().unwrap();
    assert_eq!(best.seq, entries[1].seq);

    cleanup(&key).await;
}

#[tokio::test]
#[ignore = "needs a running Redis"]
async fn test_clear() {
    let key = fresh_key();
    let board = Leaderboard::new(store(&key), 1000, 5);

    board.add_score("a", 1).await.unwrap();
    board.add_score("b", 2).await.unwrap();

    assert!(board.clear().await);
    assert_eq!(board.total_scores().await, 0);
    assert!(board.top_scores(5).await.is_empty());

    cleanup(&key).await;
}
