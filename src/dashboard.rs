// Dashboard - explicit owner of the loaded dataset
//
// The presentation layer holds a Dashboard and asks it for a fresh view
// whenever the filter changes.

use crate::filter::{filter, FilterSpec};
use crate::metrics::{compute_metrics, group_by, Dimension, GroupedSales, Metrics};
use crate::records::Dataset;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

/// Everything a presentation layer needs to render one filter state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub filter: FilterSpec,
    pub metrics: Metrics,
    pub by_category: GroupedSales,
    pub by_date: GroupedSales,
    pub by_region: GroupedSales,
}

/// Widget options derived from the dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub regions: Vec<String>,
    pub categories: Vec<String>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

pub struct Dashboard {
    dataset: Dataset,
}

impl Dashboard {
    pub fn new(dataset: Dataset) -> Self {
        Dashboard { dataset }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Selectable values for the region/category/date widgets
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            regions: self.dataset.regions(),
            categories: self.dataset.categories(),
            date_range: self.dataset.date_range(),
        }
    }

    /// Initial widget state: everything selected
    pub fn default_filter(&self) -> FilterSpec {
        FilterSpec::full(&self.dataset)
    }

    /// Recompute the whole view from scratch for `spec`.
    ///
    /// Stateless: calling it twice with the same spec gives identical views.
    pub fn view(&self, spec: &FilterSpec) -> DashboardView {
        let rows = filter(self.dataset.records(), spec);
        debug!(
            spec = %spec.summary(),
            kept = rows.len(),
            total = self.dataset.len(),
            "recomputing dashboard view"
        );

        DashboardView {
            filter: spec.clone(),
            metrics: compute_metrics(&rows),
            by_category: group_by(&rows, Dimension::Category),
            by_date: group_by(&rows, Dimension::Date),
            by_region: group_by(&rows, Dimension::Region),
        }
    }
}
