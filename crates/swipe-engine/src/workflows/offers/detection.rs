use std::sync::Arc;

use super::domain::{DetectedFields, NOT_DETECTED};
use super::rules::{any_match, standard_rules, CompiledRules, FieldRole, RuleBook, RuleBookError};

/// Longest excerpt stored in a detected field.
pub const MAX_FIELD_CHARS: usize = 160;

const SEGMENT_BREAKS: [char; 6] = ['.', '!', '?', ';', '…', '\n'];

/// Heuristic detector mapping copy segments to persuasive roles.
#[derive(Debug, Clone)]
pub struct FieldDetector {
    rules: Arc<CompiledRules>,
}

impl FieldDetector {
    pub fn new(rules: Arc<CompiledRules>) -> Self {
        Self { rules }
    }

    pub fn from_rule_book(book: &RuleBook) -> Result<Self, RuleBookError> {
        Ok(Self::new(Arc::new(book.compile()?)))
    }

    /// Detect promise, mechanism, proof, and call-to-action segments.
    ///
    /// Each role takes the first segment, in text order, that matches any of its triggers.
    /// Roles are independent, so one segment can fill several of them.
    pub fn detect_fields(&self, text: &str) -> DetectedFields {
        let segments = split_segments(text);
        if segments.is_empty() {
            return DetectedFields::empty();
        }

        let pick = |role: FieldRole| {
            let matchers = self.rules.matchers_for(role);
            segments
                .iter()
                .find(|segment| any_match(matchers, segment))
                .map(|segment| cap_excerpt(segment))
                .unwrap_or_else(|| NOT_DETECTED.to_string())
        };

        DetectedFields {
            detected_promise: pick(FieldRole::Promise),
            detected_mechanism: pick(FieldRole::Mechanism),
            detected_proof: pick(FieldRole::Proof),
            detected_cta: pick(FieldRole::CallToAction),
        }
    }
}

/// Detect fields with the built-in rule book.
pub fn detect_fields(text: &str) -> DetectedFields {
    match standard_rules() {
        Some(rules) => FieldDetector::new(rules).detect_fields(text),
        None => DetectedFields::empty(),
    }
}

pub(crate) fn split_segments(text: &str) -> Vec<&str> {
    text.split(|c: char| SEGMENT_BREAKS.contains(&c) || c == '\r')
        .map(str::trim)
        .filter(|segment| segment.chars().any(char::is_alphanumeric))
        .collect()
}

fn cap_excerpt(segment: &str) -> String {
    let trimmed = segment.trim();
    if trimmed.chars().count() <= MAX_FIELD_CHARS {
        return trimmed.to_string();
    }

    let mut excerpt: String = trimmed.chars().take(MAX_FIELD_CHARS - 1).collect();
    let kept = excerpt.trim_end().len();
    excerpt.truncate(kept);
    excerpt.push('…');
    excerpt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_sentence_punctuation_and_newlines() {
        let segments = split_segments("Primeiro. Segundo!\nTerceiro? ... ; Quarto…Quinto");
        assert_eq!(
            segments,
            vec!["Primeiro", "Segundo", "Terceiro", "Quarto", "Quinto"]
        );
    }

    #[test]
    fn long_segments_are_capped_with_ellipsis() {
        let long = "palavra ".repeat(60);
        let excerpt = cap_excerpt(&long);
        assert!(excerpt.chars().count() <= MAX_FIELD_CHARS);
        assert!(excerpt.ends_with('…'));
    }

    #[test]
    fn short_segments_are_kept_verbatim() {
        assert_eq!(cap_excerpt("  Compre agora  "), "Compre agora");
    }
}
