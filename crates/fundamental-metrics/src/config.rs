use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

use crate::enrich::SplitAdjustment;
use crate::scale::{ScaleToken, ScaleUnit};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetConfig {
    // Unit the statement figures are divided into ("thousands", "M", 1000000, ...)
    #[serde(default)]
    pub scale_unit: ScaleToken,
    #[serde(default)]
    pub split_adjustment: SplitAdjustment,
}

impl AssetConfig {
    pub fn new(scale_unit: impl Into<ScaleToken>) -> Self {
        Self {
            scale_unit: scale_unit.into(),
            ..Self::default()
        }
    }

    pub fn with_split_adjustment(mut self, split_adjustment: SplitAdjustment) -> Self {
        self.split_adjustment = split_adjustment;
        self
    }

    /// Read `FUNDAMENTALS_SCALE_UNIT` and `FUNDAMENTALS_SPLIT_ADJUSTMENT`,
    /// falling back to thousands and pass-through.
    pub fn from_env() -> Result<Self> {
        let raw_scale = env::var("FUNDAMENTALS_SCALE_UNIT").unwrap_or_else(|_| "thousands".to_string());
        let raw_scale = raw_scale.trim();
        let scale_unit = match raw_scale.parse::<i64>() {
            Ok(n) => ScaleToken::Integer(n),
            Err(_) => ScaleToken::Text(raw_scale.to_string()),
        };
        ScaleUnit::resolve(&scale_unit).context("FUNDAMENTALS_SCALE_UNIT is not a known scale unit")?;

        let split_adjustment = env::var("FUNDAMENTALS_SPLIT_ADJUSTMENT")
            .unwrap_or_else(|_| "pass_through".to_string())
            .parse::<SplitAdjustment>()
            .map_err(|e| anyhow!(e))
            .context("FUNDAMENTALS_SPLIT_ADJUSTMENT is invalid")?;

        Ok(Self {
            scale_unit,
            split_adjustment,
        })
    }
}
