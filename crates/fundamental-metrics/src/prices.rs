use chrono::NaiveDate;
use statement_core::{stats, Numeric, PriceSeries, StatementTable};

pub const SHARES_OUTSTANDING: &str = "commonStockSharesOutstanding";

/// The six per-period price figures injected into every enriched statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceField {
    MarketcapHigh,
    MarketcapLow,
    MarketcapAverage,
    StockHigh,
    StockLow,
    StockAverage,
}

impl PriceField {
    pub const MARKETCAP: [PriceField; 3] = [
        PriceField::MarketcapHigh,
        PriceField::MarketcapLow,
        PriceField::MarketcapAverage,
    ];
    pub const STOCK: [PriceField; 3] = [PriceField::StockHigh, PriceField::StockLow, PriceField::StockAverage];

    /// Row label used for this field in an enriched statement.
    pub fn row_label(&self) -> &'static str {
        match self {
            PriceField::MarketcapHigh => "marketcap_high",
            PriceField::MarketcapLow => "marketcap_low",
            PriceField::MarketcapAverage => "marketcap_average",
            PriceField::StockHigh => "stock_high",
            PriceField::StockLow => "stock_low",
            PriceField::StockAverage => "stock_average",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodPrices {
    pub period: NaiveDate,
    pub stock_high: Numeric,
    pub stock_low: Numeric,
    pub stock_average: Numeric,
    pub marketcap_high: Numeric,
    pub marketcap_low: Numeric,
    pub marketcap_average: Numeric,
}

impl PeriodPrices {
    fn zero(period: NaiveDate) -> Self {
        let zero = Numeric::Value(0.0);
        Self {
            period,
            stock_high: zero,
            stock_low: zero,
            stock_average: zero,
            marketcap_high: zero,
            marketcap_low: zero,
            marketcap_average: zero,
        }
    }

    pub fn get(&self, field: PriceField) -> Numeric {
        match field {
            PriceField::MarketcapHigh => self.marketcap_high,
            PriceField::MarketcapLow => self.marketcap_low,
            PriceField::MarketcapAverage => self.marketcap_average,
            PriceField::StockHigh => self.stock_high,
            PriceField::StockLow => self.stock_low,
            PriceField::StockAverage => self.stock_average,
        }
    }
}

/// Price statistics aligned to a statement's periods, in period order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedPrices {
    periods: Vec<PeriodPrices>,
}

impl AlignedPrices {
    pub fn periods(&self) -> &[PeriodPrices] {
        &self.periods
    }

    pub fn for_period(&self, period: NaiveDate) -> Option<&PeriodPrices> {
        self.periods.iter().find(|p| p.period == period)
    }

    /// One value per period for the given field.
    pub fn series(&self, field: PriceField) -> Vec<Numeric> {
        self.periods.iter().map(|p| p.get(field)).collect()
    }
}

/// Align daily prices to statement periods.
///
/// Period `i` covers every trading day in `[period[i-1], period[i]]`, both ends
/// inclusive. The first period has no previous boundary, so all of its figures
/// are 0 (no lookback). A window without trading days yields `Missing` price
/// statistics. Market caps use `commonStockSharesOutstanding` from
/// `balance_sheet`; when that row or its value is absent the market cap is 0.
pub fn align_prices(periods: &[NaiveDate], prices: &PriceSeries, balance_sheet: &StatementTable) -> AlignedPrices {
    let mut aligned = Vec::with_capacity(periods.len());

    for (i, &period) in periods.iter().enumerate() {
        if i == 0 {
            aligned.push(PeriodPrices::zero(period));
            continue;
        }

        let previous = periods[i - 1];
        let window = prices.between(previous, period);
        if window.is_empty() {
            tracing::warn!("No price data between {} and {}", previous, period);
        }

        let highs: Vec<f64> = window.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = window.iter().map(|b| b.low).collect();
        let closes: Vec<f64> = window.iter().map(|b| b.close).collect();

        let stock_high = Numeric::from(stats::max(&highs));
        let stock_low = Numeric::from(stats::min(&lows));
        let stock_average = Numeric::from(stats::mean(&closes));

        let market_cap = |price: Numeric| match balance_sheet.value(SHARES_OUTSTANDING, period) {
            Some(Numeric::Value(shares)) => price * shares,
            _ => Numeric::Value(0.0),
        };

        aligned.push(PeriodPrices {
            period,
            stock_high,
            stock_low,
            stock_average,
            marketcap_high: market_cap(stock_high),
            marketcap_low: market_cap(stock_low),
            marketcap_average: market_cap(stock_average),
        });
    }

    AlignedPrices { periods: aligned }
}
