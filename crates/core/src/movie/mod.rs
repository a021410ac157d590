//! Movie data model.
//!
//! One shared `Movie` value type for presentation plus two persisted record
//! types (`Favorite`, `CacheEntry`) that copy its fields. The remote search
//! shape (`RawResult`) maps into `Movie`.

mod types;

pub use types::*;
