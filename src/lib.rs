// Sales Dashboard - Core Library
// Record store + aggregation engine; rendering is left to the caller.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod records;
pub mod report;

// Re-export commonly used types
pub use dashboard::{Dashboard, DashboardView, FilterOptions};
pub use error::{LoadError, LoadResult};
pub use filter::{filter, FilterSpec};
pub use metrics::{
    compute_metrics, group_by, month_over_month_growth, monthly_sales, top_region,
    Dimension, GroupEntry, GroupKey, GroupedSales, Metrics, YearMonth, NO_TOP_REGION,
};
pub use records::{parse_date, Dataset, SalesRecord, REQUIRED_COLUMNS};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
