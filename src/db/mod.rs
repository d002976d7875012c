// src/db/mod.rs
// SQLite-backed stores

pub mod content;
pub mod jobs;
pub mod logs;
pub mod options;
pub mod pool;
pub mod schema;
pub mod types;

pub use pool::DatabasePool;
