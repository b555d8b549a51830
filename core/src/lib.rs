//! Favourite-product and purchase-streak analytics over a flat
//! transaction log, with a SQLite sink for the result relations.

pub mod config;
pub mod error;
pub mod favourite;
pub mod gap;
pub mod ingest;
pub mod pipeline;
pub mod probe;
pub mod store;
pub mod streak;
pub mod types;
