// src/config/mod.rs
// Configuration: persisted settings and environment credentials

pub mod env;
pub mod settings;

pub use env::ApiKeys;
pub use settings::Settings;
