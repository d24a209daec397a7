use statement_core::{
    DataSourceError, MarketDataSource, MetricTable, MetricsError, MetricsResult, RawStatement, StatementKind,
    StatementSource, StatementTable, StockSplit,
};

use crate::config::AssetConfig;
use crate::enrich::enrich;
use crate::metrics::MetricTables;
use crate::normalize::normalize;
use crate::prices::align_prices;
use crate::scale::ScaleUnit;

/// One ticker's enriched statements and derived metric tables.
///
/// Everything is recomputed by [`set_all_statements`](Asset::set_all_statements);
/// a failed call leaves the previously computed tables in place.
pub struct Asset<S: MarketDataSource> {
    ticker: String,
    config: AssetConfig,
    source: S,
    income_statement: Option<StatementTable>,
    balance_sheet: Option<StatementTable>,
    cash_flow: Option<StatementTable>,
    metrics: MetricTables,
}

impl<S: MarketDataSource> Asset<S> {
    pub fn new(ticker: &str, config: AssetConfig, source: S) -> Self {
        Self {
            ticker: ticker.trim().to_uppercase(),
            config,
            source,
            income_statement: None,
            balance_sheet: None,
            cash_flow: None,
            metrics: MetricTables::default(),
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn config(&self) -> &AssetConfig {
        &self.config
    }

    /// Normalize and enrich all three statements, then compute the metric tables.
    ///
    /// The balance sheet is processed first because share counts for market
    /// caps and per-share figures come from it.
    pub fn set_all_statements(
        &mut self,
        income_statement: &RawStatement,
        balance_sheet: &RawStatement,
        cash_flow: &RawStatement,
    ) -> MetricsResult<()> {
        let scale = ScaleUnit::resolve(&self.config.scale_unit)?;
        tracing::debug!("{}: scaling statements by {}", self.ticker, scale.divisor());

        let balance_sheet = normalize(StatementKind::BalanceSheet, balance_sheet)?;
        let income_statement = normalize(StatementKind::IncomeStatement, income_statement)?;
        let cash_flow = normalize(StatementKind::CashFlow, cash_flow)?;
        ensure_same_periods(&balance_sheet, &income_statement)?;
        ensure_same_periods(&balance_sheet, &cash_flow)?;

        // Share counts are read before scaling
        let price_history = self.source.get_price_history(&self.ticker)?;
        let prices = align_prices(balance_sheet.periods(), &price_history, &balance_sheet);

        let balance_sheet = enrich(balance_sheet, scale, &prices)?;

        let income_statement = enrich(income_statement, scale, &prices)?;
        let splits = self.split_history()?;
        let income_statement = self.config.split_adjustment.adjust(income_statement, &splits)?;

        let cash_flow = enrich(cash_flow, scale, &prices)?;

        let metrics = MetricTables::compute(&income_statement, &balance_sheet, &cash_flow)?;

        self.income_statement = Some(income_statement);
        self.balance_sheet = Some(balance_sheet);
        self.cash_flow = Some(cash_flow);
        self.metrics = metrics;

        tracing::info!(
            "{}: computed metrics for {} periods",
            self.ticker,
            self.metrics.per_share.periods().len()
        );
        Ok(())
    }

    /// Fetch all three raw statements and run [`set_all_statements`](Asset::set_all_statements).
    pub fn refresh(&mut self, statements: &impl StatementSource) -> MetricsResult<()> {
        let income_statement = statements.get_income_statement(&self.ticker)?;
        let balance_sheet = statements.get_balance_sheet(&self.ticker)?;
        let cash_flow = statements.get_cash_flow(&self.ticker)?;
        self.set_all_statements(&income_statement, &balance_sheet, &cash_flow)
    }

    fn split_history(&self) -> MetricsResult<Vec<StockSplit>> {
        match self.source.get_stock_splits(&self.ticker) {
            Ok(splits) => Ok(splits),
            Err(DataSourceError::NotFound { .. }) => {
                tracing::debug!("{}: no split history, assuming no splits", self.ticker);
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_income_statement(&self) -> Option<&StatementTable> {
        self.income_statement.as_ref()
    }

    pub fn get_balance_sheet(&self) -> Option<&StatementTable> {
        self.balance_sheet.as_ref()
    }

    pub fn get_cash_flow(&self) -> Option<&StatementTable> {
        self.cash_flow.as_ref()
    }

    pub fn metrics(&self) -> &MetricTables {
        &self.metrics
    }

    pub fn per_share(&self) -> &MetricTable {
        &self.metrics.per_share
    }

    pub fn margins(&self) -> &MetricTable {
        &self.metrics.margins
    }

    pub fn operating_expenses_breakdown(&self) -> &MetricTable {
        &self.metrics.operating_expenses_breakdown
    }

    pub fn yields(&self) -> &MetricTable {
        &self.metrics.yields
    }
}

fn ensure_same_periods(balance_sheet: &StatementTable, other: &StatementTable) -> MetricsResult<()> {
    if balance_sheet.periods() != other.periods() {
        return Err(MetricsError::PeriodMismatch { statement: other.kind() });
    }
    Ok(())
}
