//! Fundamental metrics
//!
//! Turns raw income statements, balance sheets and cash-flow statements into
//! enriched tables (market cap, price range, net assets, current ratio) and
//! four derived metric tables: per-share figures, margins, operating-expense
//! breakdown and yields.

pub mod asset;
pub mod config;
pub mod enrich;
pub mod metrics;
pub mod normalize;
pub mod prices;
pub mod scale;

pub use asset::Asset;
pub use config::AssetConfig;
pub use enrich::SplitAdjustment;
pub use metrics::MetricTables;
pub use prices::{align_prices, AlignedPrices, PeriodPrices, PriceField};
pub use scale::{resolve_scale, ScaleToken, ScaleUnit};
