//! Service layer: the prize collection API on top of a pluggable persistence adapter.
//! - `storage` holds the backends (file, Redis, KV REST, read-only) behind one trait.
//! - `prizes` applies validation and defaulting and does whole-collection read-modify-write.

pub mod errors;
pub mod storage;
pub mod prizes;

pub use prizes::PrizeService;
pub use storage::PrizeStore;
