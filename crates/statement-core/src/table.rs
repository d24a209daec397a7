use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MetricsError, MetricsResult};
use crate::types::{format_amount, Numeric, StatementKind};

/// A single cell of a statement as delivered by the data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCell {
    Empty,
    Number(f64),
    Text(String),
}

impl From<f64> for RawCell {
    fn from(value: f64) -> Self {
        RawCell::Number(value)
    }
}

impl From<&str> for RawCell {
    fn from(value: &str) -> Self {
        RawCell::Text(value.to_string())
    }
}

/// A statement exactly as scraped: header row plus data rows.
///
/// When `index` is `None` the row labels are expected in the first column,
/// headed by the unnamed-index placeholder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStatement {
    pub columns: Vec<String>,
    #[serde(default)]
    pub index: Option<Vec<String>>,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawStatement {
    /// Statement whose first column holds the row labels.
    pub fn from_records(columns: Vec<String>, rows: Vec<Vec<RawCell>>) -> Self {
        Self { columns, index: None, rows }
    }

    /// Statement with explicit row labels; `columns` are the period headers only.
    pub fn with_index(index: Vec<String>, columns: Vec<String>, rows: Vec<Vec<RawCell>>) -> Self {
        Self { columns, index: Some(index), rows }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRow {
    pub label: String,
    pub values: Vec<Numeric>,
}

/// Numeric statement keyed by (row label, period).
///
/// Transformations consume the table and return a new one, so each
/// enrichment step is an explicit value-to-value function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedStatementTable")]
pub struct StatementTable {
    kind: StatementKind,
    periods: Vec<NaiveDate>,
    rows: Vec<StatementRow>,
}

#[derive(Deserialize)]
struct UncheckedStatementTable {
    kind: StatementKind,
    periods: Vec<NaiveDate>,
    rows: Vec<StatementRow>,
}

impl TryFrom<UncheckedStatementTable> for StatementTable {
    type Error = MetricsError;

    fn try_from(raw: UncheckedStatementTable) -> MetricsResult<Self> {
        raw.rows
            .into_iter()
            .try_fold(StatementTable::new(raw.kind, raw.periods), |table, row| {
                table.with_new_row(&row.label, row.values)
            })
    }
}

impl StatementTable {
    pub fn new(kind: StatementKind, periods: Vec<NaiveDate>) -> Self {
        Self { kind, periods, rows: Vec::new() }
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn periods(&self) -> &[NaiveDate] {
        &self.periods
    }

    pub fn rows(&self) -> &[StatementRow] {
        &self.rows
    }

    pub fn row_labels(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.label.as_str())
    }

    pub fn contains_row(&self, label: &str) -> bool {
        self.rows.iter().any(|r| r.label == label)
    }

    pub fn row(&self, label: &str) -> Option<&[Numeric]> {
        self.rows
            .iter()
            .find(|r| r.label == label)
            .map(|r| r.values.as_slice())
    }

    /// Like [`row`](Self::row) but a missing row is a data-shape error.
    pub fn require_row(&self, label: &str) -> MetricsResult<&[Numeric]> {
        self.row(label).ok_or_else(|| MetricsError::MissingRow {
            statement: self.kind,
            row: label.to_string(),
        })
    }

    pub fn value(&self, label: &str, period: NaiveDate) -> Option<Numeric> {
        let col = self.periods.iter().position(|p| *p == period)?;
        self.row(label).map(|values| values[col])
    }

    /// Set a row, replacing any existing row with the same label.
    pub fn with_row(mut self, label: &str, values: Vec<Numeric>) -> MetricsResult<Self> {
        if values.len() != self.periods.len() {
            return Err(MetricsError::RaggedRow {
                statement: self.kind,
                row: label.to_string(),
                expected: self.periods.len(),
                found: values.len(),
            });
        }
        match self.rows.iter_mut().find(|r| r.label == label) {
            Some(existing) => existing.values = values,
            None => self.rows.push(StatementRow { label: label.to_string(), values }),
        }
        Ok(self)
    }

    /// Add a row whose label must not already be present.
    pub fn with_new_row(self, label: &str, values: Vec<Numeric>) -> MetricsResult<Self> {
        if self.contains_row(label) {
            return Err(MetricsError::DuplicateRow {
                statement: self.kind,
                row: label.to_string(),
            });
        }
        self.with_row(label, values)
    }

    pub fn without_row(mut self, label: &str) -> MetricsResult<Self> {
        let before = self.rows.len();
        self.rows.retain(|r| r.label != label);
        if self.rows.len() == before {
            return Err(MetricsError::MissingRow {
                statement: self.kind,
                row: label.to_string(),
            });
        }
        Ok(self)
    }

    /// Apply `f` to every value of every row currently in the table.
    pub fn map_values(mut self, f: impl Fn(Numeric) -> Numeric) -> Self {
        for row in &mut self.rows {
            for v in &mut row.values {
                *v = f(*v);
            }
        }
        self
    }

    /// Reorder columns so periods ascend chronologically.
    pub fn sorted_by_period(mut self) -> Self {
        let mut order: Vec<usize> = (0..self.periods.len()).collect();
        order.sort_by_key(|&i| self.periods[i]);
        if order.iter().enumerate().all(|(pos, &i)| pos == i) {
            return self;
        }
        self.periods = order.iter().map(|&i| self.periods[i]).collect();
        for row in &mut self.rows {
            row.values = order.iter().map(|&i| row.values[i]).collect();
        }
        self
    }
}

impl fmt::Display for StatementTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self.rows.iter().map(|r| r.label.len()).max().unwrap_or(5).max(5);
        write!(f, "{:<width$}", "index", width = label_width)?;
        for period in &self.periods {
            write!(f, " {:>20}", period.format("%Y-%m-%d").to_string())?;
        }
        writeln!(f)?;
        for row in &self.rows {
            write!(f, "{:<width$}", row.label, width = label_width)?;
            for v in &row.values {
                write!(f, " {:>20}", v.to_string())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Derived ratios with periods as rows and metric names as columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedMetricTable")]
pub struct MetricTable {
    periods: Vec<NaiveDate>,
    metrics: Vec<String>,
    values: Vec<Vec<f64>>,
}

#[derive(Deserialize)]
struct UncheckedMetricTable {
    periods: Vec<NaiveDate>,
    metrics: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl TryFrom<UncheckedMetricTable> for MetricTable {
    type Error = MetricsError;

    fn try_from(raw: UncheckedMetricTable) -> MetricsResult<Self> {
        if raw.values.len() != raw.periods.len() {
            return Err(MetricsError::MetricShape {
                what: "period rows",
                expected: raw.periods.len(),
                found: raw.values.len(),
            });
        }
        if let Some(row) = raw.values.iter().find(|row| row.len() != raw.metrics.len()) {
            return Err(MetricsError::MetricShape {
                what: "values in a period row",
                expected: raw.metrics.len(),
                found: row.len(),
            });
        }
        Ok(Self { periods: raw.periods, metrics: raw.metrics, values: raw.values })
    }
}

impl MetricTable {
    /// Build from per-metric series (one value per period), transposing so that
    /// each period becomes a row.
    pub fn from_columns(periods: Vec<NaiveDate>, columns: Vec<(&str, Vec<f64>)>) -> Self {
        let metrics = columns.iter().map(|(name, _)| name.to_string()).collect();
        let values = (0..periods.len())
            .map(|p| columns.iter().map(|(_, series)| series.get(p).copied().unwrap_or(0.0)).collect())
            .collect();
        Self { periods, metrics, values }
    }

    pub fn empty() -> Self {
        Self { periods: Vec::new(), metrics: Vec::new(), values: Vec::new() }
    }

    pub fn periods(&self) -> &[NaiveDate] {
        &self.periods
    }

    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn get(&self, period: NaiveDate, metric: &str) -> Option<f64> {
        let row = self.periods.iter().position(|p| *p == period)?;
        let col = self.metrics.iter().position(|m| m == metric)?;
        Some(self.values[row][col])
    }

    pub fn row(&self, period: NaiveDate) -> Option<&[f64]> {
        let row = self.periods.iter().position(|p| *p == period)?;
        Some(&self.values[row])
    }

    pub fn column(&self, metric: &str) -> Option<Vec<f64>> {
        let col = self.metrics.iter().position(|m| m == metric)?;
        Some(self.values.iter().map(|row| row[col]).collect())
    }

    /// `{ "2023-12-31": { "metric": value, ... }, ... }`
    pub fn to_json(&self) -> serde_json::Value {
        let mut by_period = serde_json::Map::new();
        for (period, row) in self.periods.iter().zip(&self.values) {
            let entries: serde_json::Map<String, serde_json::Value> = self
                .metrics
                .iter()
                .zip(row)
                .map(|(m, v)| (m.clone(), serde_json::json!(v)))
                .collect();
            by_period.insert(period.format("%Y-%m-%d").to_string(), serde_json::Value::Object(entries));
        }
        serde_json::Value::Object(by_period)
    }
}

impl Default for MetricTable {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for MetricTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<10}", "period")?;
        for metric in &self.metrics {
            write!(f, " {:>w$}", metric, w = metric.len().max(12))?;
        }
        writeln!(f)?;
        for (period, row) in self.periods.iter().zip(&self.values) {
            write!(f, "{:<10}", period.format("%Y-%m-%d").to_string())?;
            for (metric, v) in self.metrics.iter().zip(row) {
                write!(f, " {:>w$}", format_amount(*v), w = metric.len().max(12))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, 12, 31).unwrap()
    }

    fn nums(values: &[f64]) -> Vec<Numeric> {
        values.iter().copied().map(Numeric::new).collect()
    }

    #[test]
    fn test_with_row_rejects_ragged_values() {
        let table = StatementTable::new(StatementKind::BalanceSheet, vec![period(2021), period(2022)]);
        let err = table.with_row("totalAssets", nums(&[1.0])).unwrap_err();
        assert!(matches!(err, MetricsError::RaggedRow { expected: 2, found: 1, .. }));
    }

    #[test]
    fn test_with_row_replaces_existing_label() {
        let table = StatementTable::new(StatementKind::CashFlow, vec![period(2022)])
            .with_row("a", nums(&[1.0]))
            .unwrap()
            .with_row("a", nums(&[2.0]))
            .unwrap();
        assert_eq!(table.rows().len(), 1);
        assert_eq!(table.row("a"), Some(&[Numeric::Value(2.0)][..]));
    }

    #[test]
    fn test_require_row_reports_statement_and_label() {
        let table = StatementTable::new(StatementKind::IncomeStatement, vec![period(2022)]);
        let err = table.require_row("totalRevenue").unwrap_err();
        assert_eq!(err.to_string(), "Missing row 'totalRevenue' in income statement");
    }

    #[test]
    fn test_sorted_by_period_moves_values_with_columns() {
        let table = StatementTable::new(StatementKind::BalanceSheet, vec![period(2023), period(2021), period(2022)])
            .with_row("x", nums(&[3.0, 1.0, 2.0]))
            .unwrap()
            .sorted_by_period();
        assert_eq!(table.periods(), &[period(2021), period(2022), period(2023)]);
        assert_eq!(table.row("x").unwrap(), nums(&[1.0, 2.0, 3.0]).as_slice());
        assert_eq!(table.value("x", period(2023)), Some(Numeric::Value(3.0)));
    }

    #[test]
    fn test_metric_table_is_transposed() {
        let table = MetricTable::from_columns(
            vec![period(2021), period(2022)],
            vec![("cash", vec![1.0, 2.0]), ("book", vec![10.0, 20.0])],
        );
        assert_eq!(table.row(period(2022)), Some(&[2.0, 20.0][..]));
        assert_eq!(table.get(period(2021), "book"), Some(10.0));
        assert_eq!(table.column("cash"), Some(vec![1.0, 2.0]));
        assert_eq!(table.get(period(2021), "unknown"), None);

        let json = table.to_json();
        assert_eq!(json["2022-12-31"]["book"], serde_json::json!(20.0));
    }

    #[test]
    fn test_with_new_row_rejects_duplicate_label() {
        let table = StatementTable::new(StatementKind::IncomeStatement, vec![period(2022)])
            .with_new_row("a", nums(&[1.0]))
            .unwrap();
        let err = table.with_new_row("a", nums(&[2.0])).unwrap_err();
        assert!(matches!(err, MetricsError::DuplicateRow { ref row, .. } if row == "a"));
    }

    #[test]
    fn test_statement_table_deserialize_checks_row_lengths() {
        let valid = r#"{"kind": "balance_sheet", "periods": ["2022-12-31", "2023-12-31"],
            "rows": [{"label": "totalAssets", "values": [1.0, null]}]}"#;
        let table: StatementTable = serde_json::from_str(valid).unwrap();
        assert_eq!(table.value("totalAssets", period(2023)), Some(Numeric::Missing));

        let ragged = r#"{"kind": "balance_sheet", "periods": ["2022-12-31", "2023-12-31"],
            "rows": [{"label": "totalAssets", "values": [1.0]}]}"#;
        let err = serde_json::from_str::<StatementTable>(ragged).unwrap_err();
        assert!(err.to_string().contains("has 1 values, expected 2"));
    }

    #[test]
    fn test_metric_table_deserialize_checks_shape() {
        let table = MetricTable::from_columns(vec![period(2022)], vec![("cash", vec![1.5])]);
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(serde_json::from_str::<MetricTable>(&json).unwrap(), table);

        let short_row = r#"{"periods": ["2022-12-31"], "metrics": ["cash", "book"], "values": [[1.0]]}"#;
        assert!(serde_json::from_str::<MetricTable>(short_row).is_err());

        let missing_row = r#"{"periods": ["2021-12-31", "2022-12-31"], "metrics": ["cash"], "values": [[1.0]]}"#;
        assert!(serde_json::from_str::<MetricTable>(missing_row).is_err());
    }
}
