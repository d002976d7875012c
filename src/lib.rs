// src/lib.rs
// langsync: keeps translated CMS content and job records in step with
// their source-language originals via fingerprint comparison and a
// provider fallback chain.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod db;
pub mod error;
pub mod fingerprint;
pub mod guard;
pub mod jobs;
pub mod providers;
pub mod reconcile;
pub mod run;
pub mod text;
pub mod utils;

pub use error::{Result, SyncError};
