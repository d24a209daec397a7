use serde::{Deserialize, Serialize};
use statement_core::{MetricsError, MetricsResult};
use std::fmt;

const THOUSAND_LABELS: &[&str] = &[
    "Thousands", "thousands", "Thousand", "thousand", "T", "t", "Th", "th", "1000", "1,000",
];
const MILLION_LABELS: &[&str] = &[
    "Millions", "millions", "Million", "million", "M", "m", "Mi", "mi", "1000000", "1,000,000",
];
const BILLION_LABELS: &[&str] = &[
    "Billions", "billions", "Billion", "billion", "B", "b", "1000000000", "1,000,000,000",
];
const UNSCALED_LABELS: &[&str] = &["None", "no", "1", "0"];

/// The unit a statement's figures are expressed in, as written by the caller
/// (`"thousands"`, `"M"`, `1000000`, `null`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScaleToken {
    Integer(i64),
    Text(String),
    Null,
}

impl From<&str> for ScaleToken {
    fn from(value: &str) -> Self {
        ScaleToken::Text(value.to_string())
    }
}

impl From<String> for ScaleToken {
    fn from(value: String) -> Self {
        ScaleToken::Text(value)
    }
}

impl From<i64> for ScaleToken {
    fn from(value: i64) -> Self {
        ScaleToken::Integer(value)
    }
}

impl<T: Into<ScaleToken>> From<Option<T>> for ScaleToken {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ScaleToken::Null)
    }
}

impl Default for ScaleToken {
    fn default() -> Self {
        ScaleToken::Text("thousands".to_string())
    }
}

impl fmt::Display for ScaleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleToken::Integer(n) => write!(f, "{}", n),
            ScaleToken::Text(s) => write!(f, "{:?}", s),
            ScaleToken::Null => f.write_str("null"),
        }
    }
}

/// Canonical scale groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaleUnit {
    Thousand,
    Million,
    Billion,
    Unscaled,
}

impl ScaleUnit {
    /// Match a token against the four groups. Matching is exact: `"MILLIONS"`
    /// or `" m"` are not members of any group.
    pub fn resolve(token: &ScaleToken) -> MetricsResult<Self> {
        let unit = match token {
            ScaleToken::Integer(1_000) => Some(ScaleUnit::Thousand),
            ScaleToken::Integer(1_000_000) => Some(ScaleUnit::Million),
            ScaleToken::Integer(1_000_000_000) => Some(ScaleUnit::Billion),
            ScaleToken::Integer(0) | ScaleToken::Integer(1) | ScaleToken::Null => Some(ScaleUnit::Unscaled),
            ScaleToken::Integer(_) => None,
            ScaleToken::Text(label) => Self::from_label(label),
        };
        unit.ok_or_else(|| MetricsError::UnknownScaleUnit(token.to_string()))
    }

    fn from_label(label: &str) -> Option<Self> {
        [
            (THOUSAND_LABELS, ScaleUnit::Thousand),
            (MILLION_LABELS, ScaleUnit::Million),
            (BILLION_LABELS, ScaleUnit::Billion),
            (UNSCALED_LABELS, ScaleUnit::Unscaled),
        ]
        .into_iter()
        .find(|(labels, _)| labels.contains(&label))
        .map(|(_, unit)| unit)
    }

    pub fn divisor(&self) -> u64 {
        match self {
            ScaleUnit::Thousand => 1_000,
            ScaleUnit::Million => 1_000_000,
            ScaleUnit::Billion => 1_000_000_000,
            ScaleUnit::Unscaled => 1,
        }
    }
}

/// Resolve a scale token straight to its divisor.
pub fn resolve_scale(token: &ScaleToken) -> MetricsResult<u64> {
    ScaleUnit::resolve(token).map(|unit| unit.divisor())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_group(labels: &[&str], integers: &[i64], expected: u64) {
        for label in labels {
            assert_eq!(resolve_scale(&ScaleToken::from(*label)).unwrap(), expected, "label {:?}", label);
        }
        for n in integers {
            assert_eq!(resolve_scale(&ScaleToken::from(*n)).unwrap(), expected, "integer {}", n);
        }
    }

    #[test]
    fn test_thousand_group() {
        assert_group(THOUSAND_LABELS, &[1000], 1_000);
    }

    #[test]
    fn test_million_group() {
        assert_group(MILLION_LABELS, &[1_000_000], 1_000_000);
    }

    #[test]
    fn test_billion_group() {
        assert_group(BILLION_LABELS, &[1_000_000_000], 1_000_000_000);
    }

    #[test]
    fn test_unscaled_group() {
        assert_group(UNSCALED_LABELS, &[0, 1], 1);
        assert_eq!(resolve_scale(&ScaleToken::Null).unwrap(), 1);
        assert_eq!(resolve_scale(&ScaleToken::from(None::<&str>)).unwrap(), 1);
    }

    #[test]
    fn test_unknown_token_is_an_error() {
        for token in [ScaleToken::from("MILLIONS"), ScaleToken::from("k"), ScaleToken::from(42i64)] {
            let err = resolve_scale(&token).unwrap_err();
            assert!(matches!(err, MetricsError::UnknownScaleUnit(_)));
        }
    }

    #[test]
    fn test_token_deserializes_from_json_scalars() {
        let tokens: Vec<ScaleToken> = serde_json::from_str(r#"["M", 1000, null]"#).unwrap();
        assert_eq!(
            tokens,
            vec![ScaleToken::from("M"), ScaleToken::Integer(1000), ScaleToken::Null]
        );
    }

    #[test]
    fn test_default_is_thousands() {
        assert_eq!(ScaleUnit::resolve(&ScaleToken::default()).unwrap(), ScaleUnit::Thousand);
    }
}
