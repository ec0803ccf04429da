pub mod api;
pub mod config;
pub mod connection;
pub mod database;
pub mod error;
pub mod memory;
pub mod normalize;
pub mod refresh;
pub mod routes;
pub mod stats;
pub mod store;
pub mod types;
pub mod use_cases;
pub mod utils;

pub use api::{HttpSource, LotterySource};
pub use error::{Feed, LotteryError, StorageError, UpstreamError};
pub use memory::MemoryStore;
pub use database::SqliteStore;
pub use store::{LotteryStore, StoreKind, open_store};
pub use types::*;
pub use use_cases::{IngestUseCase, QueryUseCase};
