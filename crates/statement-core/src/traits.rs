use crate::{DataSourceError, PriceSeries, RawStatement, StockSplit};

/// Price and corporate-action data for a ticker
pub trait MarketDataSource {
    fn get_price_history(&self, ticker: &str) -> Result<PriceSeries, DataSourceError>;

    /// Split history. `DataSourceError::NotFound` means the ticker never split.
    fn get_stock_splits(&self, ticker: &str) -> Result<Vec<StockSplit>, DataSourceError>;
}

/// Raw financial statements for a ticker
pub trait StatementSource {
    fn get_income_statement(&self, ticker: &str) -> Result<RawStatement, DataSourceError>;
    fn get_balance_sheet(&self, ticker: &str) -> Result<RawStatement, DataSourceError>;
    fn get_cash_flow(&self, ticker: &str) -> Result<RawStatement, DataSourceError>;
}
