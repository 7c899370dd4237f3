// Aggregation - KPIs and grouped sales totals over a filtered row set
//
// Every function here is total and pure: the same rows always give the same
// numbers, and nothing is mutated. Amounts stay in fixed-point Decimal, so a
// grouped total always equals the KPI total; only percentages become f64.

use crate::records::SalesRecord;
use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Reported as `top_region` when no rows are selected
pub const NO_TOP_REGION: &str = "N/A";

// ============================================================================
// KPI METRICS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_sales: Decimal,
    pub total_profit: Decimal,
    pub order_count: usize,
    /// total_profit / total_sales * 100, or 0 when there are no sales
    pub profit_margin: f64,
    /// Percent change between the two latest months present, 0 when undefined
    pub month_over_month_growth: f64,
    pub top_region: String,
}

impl Metrics {
    pub fn has_rows(&self) -> bool {
        self.order_count > 0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} orders, sales {}, profit {} ({:.1}% margin), MoM {:+.1}%, top region {}",
            self.order_count,
            self.total_sales.round_dp(2),
            self.total_profit.round_dp(2),
            self.profit_margin,
            self.month_over_month_growth,
            self.top_region
        )
    }
}

/// Compute every KPI over an already-filtered row set.
///
/// An empty set yields zeros and the "N/A" top region.
pub fn compute_metrics(records: &[&SalesRecord]) -> Metrics {
    let total_sales = sum_amounts(records.iter().map(|r| r.sales));
    let total_profit = sum_amounts(records.iter().map(|r| r.profit));

    Metrics {
        total_sales,
        total_profit,
        order_count: records.len(),
        profit_margin: percent(total_profit, total_sales),
        month_over_month_growth: month_over_month_growth(records),
        top_region: top_region(records),
    }
}

/// Calendar month key, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Summed Sales per calendar month, chronological
pub fn monthly_sales(records: &[&SalesRecord]) -> BTreeMap<YearMonth, Decimal> {
    let mut months: BTreeMap<YearMonth, Decimal> = BTreeMap::new();
    for record in records {
        *months.entry(YearMonth::of(record.date)).or_insert(Decimal::ZERO) += record.sales;
    }
    months
}

/// Growth of the latest month over the one before it, in percent.
///
/// Compares the two most recent months that are present in the data, which
/// need not be adjacent on the calendar. Fewer than two months, or a prior
/// month summing to zero, gives 0.
pub fn month_over_month_growth(records: &[&SalesRecord]) -> f64 {
    let months = monthly_sales(records);
    let mut latest_first = months.values().rev();

    match (latest_first.next(), latest_first.next()) {
        (Some(&current), Some(&previous)) => percent(current - previous, previous),
        _ => 0.0,
    }
}

/// `part / whole * 100` as f64; 0 when `whole` is zero or the quotient overflows
pub fn percent(part: Decimal, whole: Decimal) -> f64 {
    let value = part
        .checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .and_then(|pct| pct.to_f64())
        .unwrap_or(0.0);

    // never report -0
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

/// Sum starting from positive zero, so an empty or cancelling set is plain 0
fn sum_amounts(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    let total = amounts.fold(Decimal::ZERO, |acc, amount| acc + amount);
    if total.is_zero() {
        Decimal::ZERO
    } else {
        total
    }
}

/// Region with the highest summed Sales.
///
/// Ties go to the region seen first in the rows.
pub fn top_region(records: &[&SalesRecord]) -> String {
    let by_region = group_by(records, Dimension::Region);

    let mut best: Option<&GroupEntry> = None;
    for entry in &by_region.entries {
        match best {
            Some(current) if entry.sales <= current.sales => {}
            _ => best = Some(entry),
        }
    }

    best.map(|entry| entry.key.to_string())
        .unwrap_or_else(|| NO_TOP_REGION.to_string())
}

// ============================================================================
// GROUPED AGGREGATES
// ============================================================================

/// Dimension a grouped aggregate buckets by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Category,
    Date,
    Region,
}

impl Dimension {
    pub fn name(&self) -> &str {
        match self {
            Dimension::Category => "Category",
            Dimension::Date => "Date",
            Dimension::Region => "Region",
        }
    }

    fn key_of(&self, record: &SalesRecord) -> GroupKey {
        match self {
            Dimension::Category => GroupKey::Label(record.category.clone()),
            Dimension::Date => GroupKey::Date(record.date),
            Dimension::Region => GroupKey::Label(record.region.clone()),
        }
    }
}

/// Value of a grouping dimension
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupKey {
    Date(NaiveDate),
    Label(String),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Date(date) => write!(f, "{}", date),
            GroupKey::Label(label) => write!(f, "{}", label),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub key: GroupKey,
    pub sales: Decimal,
}

/// Summed Sales per distinct dimension value.
///
/// Dates are ascending; labels keep the order they were first seen in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedSales {
    pub dimension: Dimension,
    pub entries: Vec<GroupEntry>,
}

impl GroupedSales {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupEntry> {
        self.entries.iter()
    }

    /// Sales for one group, None if the group has no rows
    pub fn get(&self, key: &GroupKey) -> Option<Decimal> {
        self.entries.iter().find(|e| &e.key == key).map(|e| e.sales)
    }

    /// Convenience lookup for categorical groups
    pub fn get_label(&self, label: &str) -> Option<Decimal> {
        self.get(&GroupKey::Label(label.to_string()))
    }

    pub fn total(&self) -> Decimal {
        sum_amounts(self.entries.iter().map(|e| e.sales))
    }

    /// Each group's percentage of the grouped total, same order as `entries`.
    /// All zero when the total is zero.
    pub fn shares(&self) -> Vec<(GroupKey, f64)> {
        let total = self.total();
        self.entries
            .iter()
            .map(|e| (e.key.clone(), percent(e.sales, total)))
            .collect()
    }
}

/// Bucket the rows by `dimension` and sum Sales per bucket.
pub fn group_by(records: &[&SalesRecord], dimension: Dimension) -> GroupedSales {
    let mut entries: Vec<GroupEntry> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for record in records {
        let key = dimension.key_of(record);
        match index.get(&key) {
            Some(&i) => entries[i].sales += record.sales,
            None => {
                index.insert(key.clone(), entries.len());
                entries.push(GroupEntry {
                    key,
                    sales: record.sales,
                });
            }
        }
    }

    if dimension == Dimension::Date {
        // Stable, and keys are unique, so ties cannot occur
        entries.sort_by(|a, b| a.key.cmp(&b.key));
    }

    GroupedSales { dimension, entries }
}
