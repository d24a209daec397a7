use serde::{Deserialize, Serialize};
use statement_core::{MetricsError, MetricsResult, Numeric, StatementKind, StatementTable, StockSplit};
use std::str::FromStr;

use crate::prices::{AlignedPrices, PriceField};
use crate::scale::ScaleUnit;

pub const NET_TOTAL_ASSETS: &str = "net_total_assets";
pub const NET_CURRENT_ASSETS: &str = "net_current_assets";
pub const CURRENT_RATIO: &str = "current_ratio";

/// Full enrichment pipeline for one normalized statement:
/// balance-sheet derived rows (balance sheet only), market-cap rows, scaling,
/// then unscaled stock-price rows.
pub fn enrich(table: StatementTable, scale: ScaleUnit, prices: &AlignedPrices) -> MetricsResult<StatementTable> {
    let kind = table.kind();
    let table = match kind {
        StatementKind::BalanceSheet => with_balance_sheet_rows(table)?,
        _ => table,
    };
    let table = with_price_rows(table, prices, &PriceField::MARKETCAP)?;
    let table = scaled(table, scale);
    let table = with_price_rows(table, prices, &PriceField::STOCK)?;

    tracing::debug!(
        "Enriched {} with {} rows over {} periods (divisor {})",
        kind,
        table.rows().len(),
        table.periods().len(),
        scale.divisor()
    );
    Ok(table)
}

/// Add net total assets, net current assets and current ratio.
pub fn with_balance_sheet_rows(table: StatementTable) -> MetricsResult<StatementTable> {
    let total_assets = table.require_row("totalAssets")?;
    let total_liabilities = table.require_row("totalLiabilities")?;
    let current_assets = table.require_row("totalCurrentAssets")?;
    let current_liabilities = table.require_row("totalCurrentLiabilities")?;

    let net_total: Vec<Numeric> = total_assets
        .iter()
        .zip(total_liabilities)
        .map(|(&a, &l)| (a - l) * 100.0)
        .collect();
    let net_current: Vec<Numeric> = current_assets
        .iter()
        .zip(current_liabilities)
        .map(|(&a, &l)| (a - l) * 100.0)
        .collect();
    // An undefined ratio (zero or missing liabilities) is reported as 0
    let current_ratio: Vec<Numeric> = current_assets
        .iter()
        .zip(current_liabilities)
        .map(|(&a, &l)| Numeric::Value((a / l).or_zero()))
        .collect();

    table
        .with_row(NET_TOTAL_ASSETS, net_total)?
        .with_row(NET_CURRENT_ASSETS, net_current)?
        .with_row(CURRENT_RATIO, current_ratio)
}

/// Append the given price fields as rows, one value per period.
pub fn with_price_rows(
    table: StatementTable,
    prices: &AlignedPrices,
    fields: &[PriceField],
) -> MetricsResult<StatementTable> {
    fields.iter().try_fold(table, |table, field| {
        let values = table
            .periods()
            .iter()
            .map(|p| prices.for_period(*p).map(|pp| pp.get(*field)).unwrap_or(Numeric::Missing))
            .collect();
        table.with_row(field.row_label(), values)
    })
}

/// Divide every row currently in the table by the scale divisor.
pub fn scaled(table: StatementTable, scale: ScaleUnit) -> StatementTable {
    let divisor = scale.divisor() as f64;
    table.map_values(|v| v / divisor)
}

/// How split history is applied to an enriched income statement.
///
/// Only `PassThrough` is functional; split adjustment of historical prices
/// and market caps is not implemented, so `Apply` refuses to run whenever the
/// ticker has splits on record instead of silently producing unadjusted data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitAdjustment {
    #[default]
    PassThrough,
    Apply,
}

impl SplitAdjustment {
    pub fn adjust(&self, table: StatementTable, splits: &[StockSplit]) -> MetricsResult<StatementTable> {
        if splits.is_empty() {
            return Ok(table);
        }
        match self {
            SplitAdjustment::PassThrough => {
                tracing::warn!(
                    "{} stock splits on record; {} prices and market caps are not split-adjusted",
                    splits.len(),
                    table.kind()
                );
                Ok(table)
            }
            SplitAdjustment::Apply => Err(MetricsError::UnsupportedSplitAdjustment(splits.len())),
        }
    }
}

impl FromStr for SplitAdjustment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pass_through" | "passthrough" | "none" => Ok(SplitAdjustment::PassThrough),
            "apply" => Ok(SplitAdjustment::Apply),
            other => Err(format!("unknown split adjustment '{}'", other)),
        }
    }
}
