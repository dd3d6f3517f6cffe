use std::sync::Arc;

use tracing::info;

use super::{
    config::{Backend, Config},
    database::init_redis,
    error::StoreError,
    leaderboard::Leaderboard,
    store::{MemoryStore, RedisStore, Store},
};

pub type SharedState = Arc<State>;

pub struct State {
    pub config: Config,
    pub leaderboard: Leaderboard<Store>,
}

impl State {
    pub fn new(config: Config) -> Result<SharedState, StoreError> {
        let store = match config.backend {
            Backend::Memory => {
                info!("Using in-memory leaderboard");
                Store::Memory(MemoryStore::new())
            }
            Backend::Redis => {
                info!("Using Redis leaderboard at key {}", config.leaderboard_key);
                let redis = init_redis(&config.redis_url, config.redis_timeout)?;
                Store::Redis(RedisStore::new(Arc::new(redis), &config.leaderboard_key))
            }
        };

        let leaderboard = Leaderboard::from_config(store, &config);

        Ok(Arc::new(Self {
            config,
            leaderboard,
        }))
    }
}
