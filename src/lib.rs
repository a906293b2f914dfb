pub mod config;
pub mod dataset;
pub mod format;
pub mod growth;
pub mod quota;
pub mod snapshot;
pub mod state;
pub mod top_stats;
pub mod trend;
