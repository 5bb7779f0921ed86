use axum::extract::FromRef;

use crate::cache::TtlCache;
use crate::catalog_store::{PersonStore, PieceStore};
use crate::formatting::FormattedPiece;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::ServerConfig;

pub type GuardedPersonStore = Arc<dyn PersonStore>;
pub type GuardedPieceStore = Arc<dyn PieceStore>;
pub type GuardedPieceCache = Arc<TtlCache<i64, FormattedPiece>>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub person_store: GuardedPersonStore,
    pub piece_store: GuardedPieceStore,
    pub piece_cache: GuardedPieceCache,
    pub hash: String,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        person_store: GuardedPersonStore,
        piece_store: GuardedPieceStore,
    ) -> Self {
        let piece_cache = Arc::new(TtlCache::new(Duration::from_secs(
            config.piece_cache_ttl_sec,
        )));
        ServerState {
            config,
            start_time: Instant::now(),
            person_store,
            piece_store,
            piece_cache,
            hash: env!("GIT_HASH").to_string(),
        }
    }
}

impl FromRef<ServerState> for GuardedPersonStore {
    fn from_ref(input: &ServerState) -> Self {
        input.person_store.clone()
    }
}

impl FromRef<ServerState> for GuardedPieceStore {
    fn from_ref(input: &ServerState) -> Self {
        input.piece_store.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
