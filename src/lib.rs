//! Graph acceleration for NornicDB: a warmup cache and a pattern-matching
//! search engine layered over a pluggable graph [`Storage`](storage::Storage).
//!
//! Neither component owns data. The warmup cache preloads nodes and
//! relationships into in-memory indexes and tracks hit/miss statistics; the
//! search engine re-reads Storage on every call and filters in memory.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`graph`]: Node, relationship, and property value types
//! - [`storage`]: The `Storage` trait, an in-memory backend, and a JSON-lines loader
//! - [`search`]: Exact, text, fuzzy, regex, range, and membership matching plus scoring
//! - [`warmup`]: Preload cache with statistics, progress, and tuning advice

pub mod config;
pub mod graph;
pub mod search;
pub mod storage;
pub mod warmup;
