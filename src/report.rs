// Plain-text and JSON rendering of a DashboardView
// No charts: grouped totals are printed as aligned tables.

use crate::config::{DisplayConfig, OutputFormat};
use crate::dashboard::DashboardView;
use crate::metrics::GroupedSales;
use anyhow::Result;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Write;

pub fn render(view: &DashboardView, display: &DisplayConfig) -> Result<String> {
    match display.format {
        OutputFormat::Text => Ok(render_text(view, display)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(view)?),
    }
}

/// Amount with currency symbol and thousands separators, e.g. `-₹1,250.50`
pub fn format_amount(value: Decimal, symbol: &str, decimals: usize) -> String {
    let rounded = value
        .abs()
        .round_dp_with_strategy(decimals as u32, RoundingStrategy::MidpointAwayFromZero);
    let fixed = format!("{:.*}", decimals, rounded);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::new();
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    // -0.00 prints without a sign
    let negative = value.is_sign_negative() && !rounded.is_zero();
    let sign = if negative { "-" } else { "" };

    match frac_part {
        Some(frac) => format!("{}{}{}.{}", sign, symbol, grouped, frac),
        None => format!("{}{}{}", sign, symbol, grouped),
    }
}

pub fn render_text(view: &DashboardView, display: &DisplayConfig) -> String {
    let money = |v: Decimal| format_amount(v, &display.currency_symbol, display.decimals);
    let m = &view.metrics;
    let mut out = String::new();

    let _ = writeln!(out, "Sales Analytics ({})", view.filter.summary());
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out, "Total Sales:    {}", money(m.total_sales));
    let _ = writeln!(out, "Total Profit:   {}", money(m.total_profit));
    let _ = writeln!(out, "Total Orders:   {}", m.order_count);
    let _ = writeln!(out, "Profit Margin:  {:.1}%", m.profit_margin);
    let _ = writeln!(out, "MoM Growth:     {:+.1}%", m.month_over_month_growth);
    let _ = writeln!(out, "Top Region:     {}", m.top_region);

    write_table(&mut out, "Sales by Category", &view.by_category, &money, false);
    write_table(&mut out, "Sales Over Time", &view.by_date, &money, false);
    write_table(&mut out, "Region Contribution", &view.by_region, &money, true);

    out
}

fn write_table(
    out: &mut String,
    title: &str,
    grouped: &GroupedSales,
    money: &dyn Fn(Decimal) -> String,
    with_shares: bool,
) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "-".repeat(title.len()));

    if grouped.is_empty() {
        let _ = writeln!(out, "  (no data)");
        return;
    }

    let width = grouped
        .iter()
        .map(|e| e.key.to_string().chars().count())
        .max()
        .unwrap_or(0);
    let shares = grouped.shares();

    for (entry, (_, share)) in grouped.iter().zip(shares.iter()) {
        let label = entry.key.to_string();
        if with_shares {
            let _ = writeln!(
                out,
                "  {:<width$}  {:>16}  {:>5.1}%",
                label,
                money(entry.sales),
                share,
                width = width
            );
        } else {
            let _ = writeln!(out, "  {:<width$}  {:>16}", label, money(entry.sales), width = width);
        }
    }
}
