// Investor Commitments - Core Library
// Exposes storage, queries and the loader for the CLI, API server, and tests

pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod loader;
pub mod logging;
pub mod queries;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use db::{Commitment, Database, Investor};
pub use error::{LoadError, QueryError, QueryResult};
pub use format::format_magnitude;
pub use loader::{run_load, CommitmentRecord, LoadPlan, LoadReport};
pub use queries::{
    filter_commitments, investor_exists, list_asset_classes, list_commitments,
    list_investor_directory, list_investors_with_totals, summarize_investor, AssetClassTotal,
    InvestorRef, InvestorTotal,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
