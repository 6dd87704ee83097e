// esg-core/src/lib.rs
// ESG Live Dashboard - Core Library Definitions

pub mod config;
pub mod live;
pub mod render;
pub mod service;

// Re-export esg-common for convenience
pub use esg_common::{analytics, data};
