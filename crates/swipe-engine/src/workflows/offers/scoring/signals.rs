use serde::{Deserialize, Serialize};

use super::super::domain::{is_detected, DetectedFields};
use super::super::rules::{any_match, CompiledRules};
use super::config::ScoringConfig;

/// Individual contributor to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    Promise,
    Mechanism,
    Proof,
    CallToAction,
    CopyLength,
    Numbers,
    Price,
    Guarantee,
    CorpusDensity,
    Compliance,
}

/// Discrete contribution to a score, kept so results can be audited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub points: i16,
    pub notes: String,
}

pub(crate) struct OfferSignals {
    pub components: Vec<ScoreComponent>,
    pub offer_score: u8,
}

pub(crate) fn score_offer(
    detected: &DetectedFields,
    text: &str,
    rules: &CompiledRules,
    config: &ScoringConfig,
) -> OfferSignals {
    let mut components = Vec::new();
    let mut total: u32 = 0;

    let roles = [
        (ScoreFactor::Promise, &detected.detected_promise, config.promise_points),
        (ScoreFactor::Mechanism, &detected.detected_mechanism, config.mechanism_points),
        (ScoreFactor::Proof, &detected.detected_proof, config.proof_points),
        (ScoreFactor::CallToAction, &detected.detected_cta, config.cta_points),
    ];
    for (factor, value, points) in roles {
        if is_detected(value) {
            components.push(ScoreComponent {
                factor,
                points: points as i16,
                notes: format!("detected: {value}"),
            });
            total += u32::from(points);
        }
    }

    let words = text.split_whitespace().count();
    let length_points = length_points(words, config);
    components.push(ScoreComponent {
        factor: ScoreFactor::CopyLength,
        points: length_points as i16,
        notes: format!("{words} word(s)"),
    });
    total += u32::from(length_points);

    if text.chars().any(|c| c.is_ascii_digit()) {
        components.push(ScoreComponent {
            factor: ScoreFactor::Numbers,
            points: config.number_points as i16,
            notes: "copy cites concrete numbers".to_string(),
        });
        total += u32::from(config.number_points);
    }

    if any_match(&rules.price, text) {
        components.push(ScoreComponent {
            factor: ScoreFactor::Price,
            points: config.price_points as i16,
            notes: "copy states a price or discount".to_string(),
        });
        total += u32::from(config.price_points);
    }

    if any_match(&rules.guarantee, text) {
        components.push(ScoreComponent {
            factor: ScoreFactor::Guarantee,
            points: config.guarantee_points as i16,
            notes: "copy offers a guarantee or refund".to_string(),
        });
        total += u32::from(config.guarantee_points);
    }

    OfferSignals {
        components,
        offer_score: total.min(100) as u8,
    }
}

fn length_points(words: usize, config: &ScoringConfig) -> u8 {
    if words < config.min_effective_words {
        0
    } else if words < config.short_copy_words {
        config.short_copy_points
    } else if words <= config.ideal_max_words {
        config.ideal_copy_points
    } else if words <= config.long_max_words {
        config.long_copy_points
    } else {
        config.overlong_copy_points
    }
}
