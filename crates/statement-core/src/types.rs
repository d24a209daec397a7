use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

/// A statement value: either a finite number or explicitly missing.
///
/// Arithmetic propagates `Missing`, and any operation producing a non-finite
/// result (division by zero, NaN) collapses to `Missing`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Numeric {
    Value(f64),
    #[default]
    Missing,
}

impl Numeric {
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Numeric::Value(value)
        } else {
            Numeric::Missing
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Numeric::Value(v) => Some(*v),
            Numeric::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Numeric::Missing)
    }

    /// Collapse to a plain number, treating `Missing` as zero.
    pub fn or_zero(&self) -> f64 {
        self.value().unwrap_or(0.0)
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Numeric::new(value)
    }
}

impl From<Option<f64>> for Numeric {
    fn from(value: Option<f64>) -> Self {
        value.map(Numeric::new).unwrap_or(Numeric::Missing)
    }
}

impl From<Numeric> for Option<f64> {
    fn from(value: Numeric) -> Self {
        value.value()
    }
}

macro_rules! numeric_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait for Numeric {
            type Output = Numeric;

            fn $method(self, rhs: Numeric) -> Numeric {
                match (self, rhs) {
                    (Numeric::Value(a), Numeric::Value(b)) => Numeric::new(a $op b),
                    _ => Numeric::Missing,
                }
            }
        }

        impl $trait<f64> for Numeric {
            type Output = Numeric;

            fn $method(self, rhs: f64) -> Numeric {
                self $op Numeric::new(rhs)
            }
        }
    };
}

numeric_op!(Add, add, +);
numeric_op!(Sub, sub, -);
numeric_op!(Mul, mul, *);
numeric_op!(Div, div, /);

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Value(v) => f.write_str(&format_amount(*v)),
            Numeric::Missing => f.write_str("NaN"),
        }
    }
}

/// Render with two decimals and comma thousands separators (`1,234,567.89`).
pub fn format_amount(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Which of the three financial statements a table holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    IncomeStatement,
    BalanceSheet,
    CashFlow,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatementKind::IncomeStatement => "income statement",
            StatementKind::BalanceSheet => "balance sheet",
            StatementKind::CashFlow => "cash flow statement",
        };
        f.write_str(label)
    }
}

/// Daily price bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Date-ordered daily price history for one ticker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "UnorderedPriceSeries")]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

/// Wire shape of [`PriceSeries`]; bars may arrive in any order.
#[derive(Deserialize)]
struct UnorderedPriceSeries {
    bars: Vec<PriceBar>,
}

impl From<UnorderedPriceSeries> for PriceSeries {
    fn from(raw: UnorderedPriceSeries) -> Self {
        PriceSeries::new(raw.bars)
    }
}

impl From<Vec<PriceBar>> for PriceSeries {
    fn from(bars: Vec<PriceBar>) -> Self {
        PriceSeries::new(bars)
    }
}

impl PriceSeries {
    /// Builds a series, ordering bars by date.
    pub fn new(mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        Self { bars }
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// All bars with `start <= date <= end`. Empty when `start > end`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> &[PriceBar] {
        if start > end {
            return &[];
        }
        let from = self.bars.partition_point(|b| b.date < start);
        let to = self.bars.partition_point(|b| b.date <= end);
        &self.bars[from..to]
    }
}

/// A stock split event (`ratio` new shares per old share, e.g. 4.0 for 4:1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StockSplit {
    pub date: NaiveDate,
    pub ratio: f64,
}
