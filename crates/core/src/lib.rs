pub mod config;
pub mod display;
pub mod feed;
pub mod metrics;
pub mod movie;
pub mod remote;
pub mod repository;
pub mod search;
pub mod store;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    ItunesConfig, SearchConfig, ServerConfig,
};
pub use display::DisplayTracker;
pub use feed::{feed_stream, FeedCombinator, FeedSnapshot, FeedState, RepublishSignal};
pub use movie::{CacheEntry, Favorite, Movie, RawResult};
pub use remote::{ItunesClient, MovieSearcher, RemoteError, SearchRequest, SearchResponse};
pub use repository::Repository;
pub use search::{SearchFailure, SearchOrchestrator, SearchState};
pub use store::{MovieStore, SqliteMovieStore, StoreError};
