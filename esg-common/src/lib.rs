// esg-common/src/lib.rs
// ESG Dashboard - shared data model and per-tick analytics

pub mod analytics;
pub mod data;
