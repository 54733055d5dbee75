pub mod analysis;
pub mod analyzer;
pub mod changes;
pub mod config;
pub mod data;
pub mod model;
pub mod report;
pub mod schema;
pub mod stats;
pub mod store;
