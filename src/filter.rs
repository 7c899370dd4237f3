// Filter specification and the stable row filter

use crate::records::{Dataset, SalesRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which records a view includes.
///
/// Date bounds are inclusive. An empty region or category set selects
/// nothing; there is no implicit "all" fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub regions: BTreeSet<String>,
    pub categories: BTreeSet<String>,
}

impl FilterSpec {
    pub fn new<R, C>(date_from: NaiveDate, date_to: NaiveDate, regions: R, categories: C) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        FilterSpec {
            date_from,
            date_to,
            regions: regions.into_iter().map(Into::into).collect(),
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }

    /// Everything the dataset contains: full date range, every region and category.
    ///
    /// For an empty dataset the date range is unbounded and both sets are
    /// empty, so the spec still selects nothing.
    pub fn full(dataset: &Dataset) -> Self {
        let (date_from, date_to) = dataset
            .date_range()
            .unwrap_or((NaiveDate::MIN, NaiveDate::MAX));

        FilterSpec::new(date_from, date_to, dataset.regions(), dataset.categories())
    }

    /// Builder: replace the inclusive date bounds
    pub fn with_date_range(mut self, date_from: NaiveDate, date_to: NaiveDate) -> Self {
        self.date_from = date_from;
        self.date_to = date_to;
        self
    }

    /// Builder: replace the allowed regions
    pub fn with_regions<I>(mut self, regions: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.regions = regions.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: replace the allowed categories
    pub fn with_categories<I>(mut self, categories: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// False when no record could ever pass (inverted range or an empty set)
    pub fn is_satisfiable(&self) -> bool {
        self.date_from <= self.date_to && !self.regions.is_empty() && !self.categories.is_empty()
    }

    /// All three clauses must hold
    pub fn matches(&self, record: &SalesRecord) -> bool {
        self.date_from <= record.date
            && record.date <= self.date_to
            && self.regions.contains(&record.region)
            && self.categories.contains(&record.category)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} to {} | {} region(s), {} category(ies)",
            self.date_from,
            self.date_to,
            self.regions.len(),
            self.categories.len()
        )
    }
}

/// Keep the records that satisfy `spec`, preserving input order.
///
/// Borrows from `records`; nothing is copied or reordered.
pub fn filter<'a>(records: &'a [SalesRecord], spec: &FilterSpec) -> Vec<&'a SalesRecord> {
    if !spec.is_satisfiable() {
        return Vec::new();
    }

    records.iter().filter(|record| spec.matches(record)).collect()
}
