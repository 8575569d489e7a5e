//! Bankforge: analytics over a single table of bank-customer records
//!
//! This library loads a customer dataset into an immutable in-memory record
//! store and computes eleven named derived views (churn rates, balance
//! statistics, segmentation, KPIs) as pure aggregation functions, with CSV
//! export and chart rendering on top.

pub mod cli;
pub mod data;
pub mod error;
pub mod export;
pub mod views;
pub mod viz;

// Re-export public items for easier access
pub use cli::Args;
pub use data::{CustomerRecord, RecordStore};
pub use error::{Error, Result};
pub use export::{export_all_views, view_to_csv};
pub use views::{compute_view, DerivedView, Value, VIEW_NAMES};
pub use viz::generate_dashboard_report;
