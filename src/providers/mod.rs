// src/providers/mod.rs
// Translation backends and the fallback chain

pub mod chain;
pub mod chunk;
pub mod deepl;
pub mod google;
pub mod http;
pub mod langmap;
pub mod provider;

pub use chain::ProviderChain;
pub use provider::{ChainOutcome, TranslationProvider};
