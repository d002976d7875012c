// src/jobs/mod.rs
// Job record pipeline: field registry, candidate selection, link rewriting
// and the batch runner itself.

pub mod fields;
pub mod links;
pub mod runner;
pub mod selector;

pub use runner::{BatchRunner, BatchSummary};
