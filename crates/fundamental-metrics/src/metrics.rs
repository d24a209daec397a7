use serde::{Deserialize, Serialize};
use statement_core::{MetricTable, MetricsResult, Numeric, StatementTable};

use crate::prices::{PriceField, SHARES_OUTSTANDING};

/// (metric column, source row) pairs
type MetricDefs = &'static [(&'static str, &'static str)];

const PER_SHARE_BALANCE: MetricDefs = &[
    ("cash", "cashAndShortTermInvestments"),
    ("short_term_debt", "shortTermDebt"),
    ("long_term_debt", "longTermDebt"),
    ("book", "totalShareholderEquity"),
];
const PER_SHARE_CASH_FLOW: MetricDefs = &[
    ("dividends", "dividendPayout"),
    ("common_stock_dividend", "dividendPayoutCommonStock"),
    ("preferred_stock_dividends", "dividendPayoutPreferredStock"),
    ("share_buy_backs", "paymentsForRepurchaseOfCommonStock"),
    ("preferred_share_buy_backs", "paymentsForRepurchaseOfPreferredStock"),
];

const MARGINS: MetricDefs = &[
    ("gross_margin", "grossProfit"),
    ("operating_margin", "operatingIncome"),
    ("net_profit_margin", "netIncome"),
];

const OPERATING_EXPENSE_PARTS: MetricDefs = &[
    ("r&d", "researchAndDevelopment"),
    ("sg&a", "sellingGeneralAndAdministrative"),
];

const YIELDS_BALANCE: MetricDefs = &[
    ("cash", "cashAndShortTermInvestments"),
    ("short_term_debt", "shortTermDebt"),
    ("long_term_debt", "longTermDebt"),
];
const YIELDS_CASH_FLOW: MetricDefs = &[
    ("share_buy_backs", "paymentsForRepurchaseOfCommonStock"),
    ("preferred_share_buy_backs", "paymentsForRepurchaseOfPreferredStock"),
    ("dividends", "dividendPayoutCommonStock"),
    ("preferred_dividends", "dividendPayoutPreferredStock"),
];

/// The four derived tables for one asset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricTables {
    pub per_share: MetricTable,
    pub margins: MetricTable,
    pub operating_expenses_breakdown: MetricTable,
    pub yields: MetricTable,
}

impl MetricTables {
    /// Compute all four tables from enriched statements.
    pub fn compute(
        income_statement: &StatementTable,
        balance_sheet: &StatementTable,
        cash_flow: &StatementTable,
    ) -> MetricsResult<Self> {
        let tables = Self {
            per_share: per_share(balance_sheet, cash_flow)?,
            operating_expenses_breakdown: operating_expenses_breakdown(income_statement)?,
            margins: margins(income_statement)?,
            yields: yields(balance_sheet, cash_flow)?,
        };
        tracing::debug!("Computed metric tables over {} periods", tables.per_share.periods().len());
        Ok(tables)
    }
}

/// Element-wise `numerator / denominator * factor`.
///
/// Any period where the quotient is undefined (missing operand, zero
/// denominator) is reported as 0.
fn ratio(numerator: &[Numeric], denominator: &[Numeric], factor: f64) -> Vec<f64> {
    numerator
        .iter()
        .zip(denominator)
        .map(|(&n, &d)| ((n / d) * factor).or_zero())
        .collect()
}

fn ratios(
    defs: MetricDefs,
    source: &StatementTable,
    denominator: &[Numeric],
    factor: f64,
) -> MetricsResult<Vec<(&'static str, Vec<f64>)>> {
    let mut columns = Vec::with_capacity(defs.len());
    for (metric, row) in defs {
        columns.push((*metric, ratio(source.require_row(row)?, denominator, factor)));
    }
    Ok(columns)
}

/// Balance-sheet and cash-flow amounts divided by common shares outstanding.
pub fn per_share(balance_sheet: &StatementTable, cash_flow: &StatementTable) -> MetricsResult<MetricTable> {
    let shares = balance_sheet.require_row(SHARES_OUTSTANDING)?;
    let mut columns = ratios(PER_SHARE_BALANCE, balance_sheet, shares, 1.0)?;
    columns.extend(ratios(PER_SHARE_CASH_FLOW, cash_flow, shares, 1.0)?);
    Ok(MetricTable::from_columns(balance_sheet.periods().to_vec(), columns))
}

/// Gross, operating and net margins as a percentage of total revenue.
pub fn margins(income_statement: &StatementTable) -> MetricsResult<MetricTable> {
    let revenue = income_statement.require_row("totalRevenue")?;
    let columns = ratios(MARGINS, income_statement, revenue, 100.0)?;
    Ok(MetricTable::from_columns(income_statement.periods().to_vec(), columns))
}

/// R&D and SG&A as a percentage of total operating expenses.
pub fn operating_expenses_breakdown(income_statement: &StatementTable) -> MetricsResult<MetricTable> {
    let operating_expenses = income_statement.require_row("operatingExpenses")?;
    let columns = ratios(OPERATING_EXPENSE_PARTS, income_statement, operating_expenses, 100.0)?;
    Ok(MetricTable::from_columns(income_statement.periods().to_vec(), columns))
}

/// Cash, debt, buybacks and dividends as a percentage of average market cap.
pub fn yields(balance_sheet: &StatementTable, cash_flow: &StatementTable) -> MetricsResult<MetricTable> {
    let market_cap = balance_sheet.require_row(PriceField::MarketcapAverage.row_label())?;
    let mut columns = ratios(YIELDS_BALANCE, balance_sheet, market_cap, 100.0)?;
    columns.extend(ratios(YIELDS_CASH_FLOW, cash_flow, market_cap, 100.0)?);
    Ok(MetricTable::from_columns(balance_sheet.periods().to_vec(), columns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use statement_core::{MetricsError, StatementKind};

    fn periods() -> Vec<NaiveDate> {
        vec![
            NaiveDate::from_ymd_opt(2022, 12, 31).unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
        ]
    }

    fn table(kind: StatementKind, rows: &[(&str, [f64; 2])]) -> StatementTable {
        rows.iter().fold(StatementTable::new(kind, periods()), |t, (label, values)| {
            t.with_row(label, values.iter().copied().map(Numeric::new).collect())
                .unwrap()
        })
    }

    fn balance_sheet() -> StatementTable {
        table(
            StatementKind::BalanceSheet,
            &[
                (SHARES_OUTSTANDING, [100.0, 0.0]),
                ("cashAndShortTermInvestments", [500.0, 600.0]),
                ("shortTermDebt", [50.0, 60.0]),
                ("longTermDebt", [200.0, 220.0]),
                ("totalShareholderEquity", [1000.0, 1100.0]),
                ("marketcap_average", [0.0, 2000.0]),
            ],
        )
    }

    fn cash_flow() -> StatementTable {
        table(
            StatementKind::CashFlow,
            &[
                ("dividendPayout", [30.0, 40.0]),
                ("dividendPayoutCommonStock", [25.0, 30.0]),
                ("dividendPayoutPreferredStock", [5.0, 10.0]),
                ("paymentsForRepurchaseOfCommonStock", [80.0, 100.0]),
                ("paymentsForRepurchaseOfPreferredStock", [0.0, 0.0]),
            ],
        )
    }

    fn income_statement() -> StatementTable {
        table(
            StatementKind::IncomeStatement,
            &[
                ("totalRevenue", [1000.0, 0.0]),
                ("grossProfit", [400.0, 100.0]),
                ("operatingIncome", [150.0, 50.0]),
                ("netIncome", [100.0, 20.0]),
                ("operatingExpenses", [250.0, 200.0]),
                ("researchAndDevelopment", [100.0, 50.0]),
                ("sellingGeneralAndAdministrative", [150.0, 150.0]),
            ],
        )
    }

    #[test]
    fn test_per_share() {
        let t = per_share(&balance_sheet(), &cash_flow()).unwrap();
        let p = periods()[0];

        assert_relative_eq!(t.get(p, "cash").unwrap(), 5.0, epsilon = 1e-9);
        assert_relative_eq!(t.get(p, "book").unwrap(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(t.get(p, "dividends").unwrap(), 0.3, epsilon = 1e-9);
        assert_relative_eq!(t.get(p, "share_buy_backs").unwrap(), 0.8, epsilon = 1e-9);
        assert_eq!(t.metrics().len(), 9);
    }

    #[test]
    fn test_per_share_zero_shares_yields_zero() {
        let t = per_share(&balance_sheet(), &cash_flow()).unwrap();
        assert_eq!(t.row(periods()[1]).unwrap(), &[0.0; 9]);
    }

    #[test]
    fn test_margins() {
        let t = margins(&income_statement()).unwrap();
        let p = periods()[0];

        assert_relative_eq!(t.get(p, "gross_margin").unwrap(), 40.0, epsilon = 1e-9);
        assert_relative_eq!(t.get(p, "operating_margin").unwrap(), 15.0, epsilon = 1e-9);
        assert_relative_eq!(t.get(p, "net_profit_margin").unwrap(), 10.0, epsilon = 1e-9);
        // zero revenue
        assert_eq!(t.get(periods()[1], "gross_margin"), Some(0.0));
    }

    #[test]
    fn test_operating_expenses_breakdown() {
        let t = operating_expenses_breakdown(&income_statement()).unwrap();
        let p = periods()[1];

        assert_relative_eq!(t.get(p, "r&d").unwrap(), 25.0, epsilon = 1e-9);
        assert_relative_eq!(t.get(p, "sg&a").unwrap(), 75.0, epsilon = 1e-9);
    }

    #[test]
    fn test_yields() {
        let t = yields(&balance_sheet(), &cash_flow()).unwrap();
        let p = periods()[1];

        assert_relative_eq!(t.get(p, "cash").unwrap(), 30.0, epsilon = 1e-9);
        assert_relative_eq!(t.get(p, "long_term_debt").unwrap(), 11.0, epsilon = 1e-9);
        assert_relative_eq!(t.get(p, "dividends").unwrap(), 1.5, epsilon = 1e-9);
        assert_relative_eq!(t.get(p, "preferred_dividends").unwrap(), 0.5, epsilon = 1e-9);
        // first period has no market cap
        assert!(t.row(periods()[0]).unwrap().iter().all(|v| *v == 0.0));
        assert_eq!(
            t.metrics(),
            &[
                "cash",
                "short_term_debt",
                "long_term_debt",
                "share_buy_backs",
                "preferred_share_buy_backs",
                "dividends",
                "preferred_dividends"
            ]
        );
    }

    #[test]
    fn test_missing_source_row_is_a_shape_error() {
        let income = table(StatementKind::IncomeStatement, &[("totalRevenue", [1.0, 1.0])]);
        let err = margins(&income).unwrap_err();
        assert!(matches!(err, MetricsError::MissingRow { ref row, .. } if row == "grossProfit"));
    }

    #[test]
    fn test_missing_operand_yields_zero() {
        let income = StatementTable::new(StatementKind::IncomeStatement, periods())
            .with_row("totalRevenue", vec![Numeric::Value(100.0), Numeric::Missing])
            .unwrap()
            .with_row("grossProfit", vec![Numeric::Missing, Numeric::Value(10.0)])
            .unwrap()
            .with_row("operatingIncome", vec![Numeric::Value(1.0); 2])
            .unwrap()
            .with_row("netIncome", vec![Numeric::Value(1.0); 2])
            .unwrap();
        let t = margins(&income).unwrap();
        assert_eq!(t.column("gross_margin"), Some(vec![0.0, 0.0]));
    }
}
