use super::RequestsLoggingLevel;

pub const DEFAULT_PORT: u16 = 3005;
pub const DEFAULT_PIECE_CACHE_TTL_SEC: u64 = 300;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    /// Lifetime of cached single-piece lookups. 0 disables the cache.
    pub piece_cache_ttl_sec: u64,
    /// Origins allowed by CORS. Empty means only [`DEFAULT_CORS_ORIGIN`].
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: DEFAULT_PORT,
            piece_cache_ttl_sec: DEFAULT_PIECE_CACHE_TTL_SEC,
            cors_origins: Vec::new(),
        }
    }
}
