use crate::numeric;
use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fmt;

const INFO_ONLY_LABEL: &str = "info only";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricStatus {
    Pass,
    Fail,
    #[serde(rename = "Info Only")]
    InfoOnly,
}

impl fmt::Display for MetricStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("Pass"),
            Self::Fail => f.write_str("Fail"),
            Self::InfoOnly => f.write_str("Info Only"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    GreaterOrEqual,
    Greater,
}

/// Structured pass/fail policy derived once from a human-readable target such as
/// `">60%"` or `"≥3-4x"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetRule {
    Numeric { comparison: Comparison, bound: f64 },
    InfoOnly,
}

impl TargetRule {
    /// The first numeric literal in the label is the bound, so `">10-12%"` yields 10.
    /// The comparison glyph is cosmetic: parsed rules are always inclusive.
    pub fn parse(label: &str) -> anyhow::Result<Self> {
        let trimmed = label.trim();
        if trimmed.eq_ignore_ascii_case(INFO_ONLY_LABEL) {
            return Ok(Self::InfoOnly);
        }

        let Some(bound) = numeric::first_literal(trimmed) else {
            bail!("target {label:?} has no numeric threshold");
        };

        Ok(Self::Numeric {
            comparison: Comparison::GreaterOrEqual,
            bound,
        })
    }

    pub fn is_info_only(&self) -> bool {
        matches!(self, Self::InfoOnly)
    }
}

pub fn evaluate(info_only_metric: bool, consensus: Option<f64>, rule: &TargetRule) -> MetricStatus {
    let (comparison, bound) = match rule {
        _ if info_only_metric => return MetricStatus::InfoOnly,
        TargetRule::InfoOnly => return MetricStatus::InfoOnly,
        TargetRule::Numeric { comparison, bound } => (*comparison, *bound),
    };

    let Some(value) = consensus else {
        return MetricStatus::Fail;
    };

    let passed = match comparison {
        Comparison::GreaterOrEqual => value >= bound,
        Comparison::Greater => value > bound,
    };
    if passed {
        MetricStatus::Pass
    } else {
        MetricStatus::Fail
    }
}
