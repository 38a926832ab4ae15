use crate::threshold::TargetRule;
use anyhow::{ensure, Context};

/// A configured ratio. Built once at startup and shared read-only by every request.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDefinition {
    pub name: String,
    /// Provider ids in display order; readings keep this order.
    pub providers: Vec<String>,
    /// Original target text, kept for presentation only.
    pub target_label: String,
    pub rule: TargetRule,
    pub informational: bool,
}

impl MetricDefinition {
    pub fn new(
        name: impl Into<String>,
        providers: Vec<String>,
        target_label: impl Into<String>,
        informational: bool,
    ) -> anyhow::Result<Self> {
        let name = name.into().trim().to_string();
        ensure!(!name.is_empty(), "metric name must be non-empty");
        ensure!(
            !providers.is_empty(),
            "metric {name:?} must list at least one provider"
        );

        let target_label = target_label.into();
        let rule = TargetRule::parse(&target_label)
            .with_context(|| format!("invalid target for metric {name:?}"))?;

        Ok(Self {
            name,
            providers,
            target_label,
            rule,
            informational,
        })
    }

    /// Whether this metric can never contribute to the score.
    pub fn is_info_only(&self) -> bool {
        self.informational || self.rule.is_info_only()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rule_at_construction() {
        let def = MetricDefinition::new("ROIC", vec!["quickfs.roic".into()], ">10-12%", false)
            .unwrap();
        assert_eq!(def.target_label, ">10-12%");
        assert!(matches!(def.rule, TargetRule::Numeric { bound, .. } if bound == 10.0));
        assert!(!def.is_info_only());
    }

    #[test]
    fn info_only_target_marks_metric_informational() {
        let def = MetricDefinition::new("P/E Ratio", vec!["finviz.pe_ratio".into()], "Info Only", false)
            .unwrap();
        assert!(def.is_info_only());
    }

    #[test]
    fn rejects_bad_definitions() {
        assert!(MetricDefinition::new("", vec!["a".into()], ">1", false).is_err());
        assert!(MetricDefinition::new("X", vec![], ">1", false).is_err());
        assert!(MetricDefinition::new("X", vec!["a".into()], "soon", false).is_err());
    }
}
