use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::domain::combine_text;
use super::rules::{any_match, standard_rules, AlertSeverity, CompiledRules};

/// Risk score ceiling; severities add up to it and are clamped there.
pub const MAX_RISK_SCORE: u32 = 100;

/// Alerts raised for one ad plus the weighted risk they add up to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceAssessment {
    pub alerts: Vec<String>,
    pub risk_score: u8,
}

impl ComplianceAssessment {
    pub fn is_clear(&self) -> bool {
        self.alerts.is_empty()
    }
}

/// Flags copy patterns that ad platforms and consumer-protection rules restrict.
#[derive(Debug, Clone)]
pub struct ComplianceChecker {
    rules: Arc<CompiledRules>,
}

impl ComplianceChecker {
    pub fn new(rules: Arc<CompiledRules>) -> Self {
        Self { rules }
    }

    /// Labels whose triggers match `text`, in rule-table order without duplicates.
    pub fn detect_compliance_alerts(&self, text: &str) -> Vec<String> {
        self.matching(text)
            .into_iter()
            .map(|(label, _)| label.to_string())
            .collect()
    }

    /// Check headline and body together and weigh the result.
    pub fn assess(&self, main_text: &str, headline: &str) -> ComplianceAssessment {
        let text = combine_text(headline, main_text);
        let matched = self.matching(&text);

        let total: u32 = matched.iter().map(|(_, severity)| severity.weight()).sum();
        let risk_score = total.min(MAX_RISK_SCORE) as u8;

        ComplianceAssessment {
            alerts: matched
                .into_iter()
                .map(|(label, _)| label.to_string())
                .collect(),
            risk_score,
        }
    }

    fn matching<'a>(&'a self, text: &str) -> Vec<(&'a str, AlertSeverity)> {
        let mut matched: Vec<(&str, AlertSeverity)> = Vec::new();
        if text.trim().is_empty() {
            return matched;
        }

        for alert in &self.rules.alerts {
            if matched.iter().any(|(label, _)| *label == alert.label) {
                continue;
            }
            if any_match(&alert.matchers, text) {
                matched.push((alert.label.as_str(), alert.severity));
            }
        }

        matched
    }
}

/// Compliance alerts with the built-in rule book.
pub fn detect_compliance_alerts(text: &str) -> Vec<String> {
    match standard_rules() {
        Some(rules) => ComplianceChecker::new(rules).detect_compliance_alerts(text),
        None => Vec::new(),
    }
}
