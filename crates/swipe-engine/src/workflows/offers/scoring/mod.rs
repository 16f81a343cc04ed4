mod config;
mod corpus;
mod signals;

pub use config::ScoringConfig;
pub use signals::{ScoreComponent, ScoreFactor};

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::compliance::ComplianceChecker;
use super::detection::FieldDetector;
use super::domain::{combine_text, AdDraft, AdId, ImportedAd, ScoreCard};
use super::rules::{standard_rules, CompiledRules, RuleBook, RuleBookError};
use corpus::{density_bonus, keyword_set, CorpusIndex};
use signals::score_offer;

/// Scores plus the components and corroborating ads that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub scores: ScoreCard,
    pub components: Vec<ScoreComponent>,
    pub corroborating_ads: Vec<AdId>,
}

/// Stateless engine combining intrinsic copy signals, compliance risk, and corpus density.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    rules: Arc<CompiledRules>,
    detector: FieldDetector,
    checker: ComplianceChecker,
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(rules: Arc<CompiledRules>, config: ScoringConfig) -> Self {
        Self {
            detector: FieldDetector::new(rules.clone()),
            checker: ComplianceChecker::new(rules.clone()),
            rules,
            config: config.sanitized(),
        }
    }

    pub fn from_rule_book(book: &RuleBook, config: ScoringConfig) -> Result<Self, RuleBookError> {
        Ok(Self::new(Arc::new(book.compile()?), config))
    }

    pub fn standard() -> Result<Self, RuleBookError> {
        Self::from_rule_book(&RuleBook::standard(), ScoringConfig::default())
    }

    pub fn detector(&self) -> &FieldDetector {
        &self.detector
    }

    pub fn checker(&self) -> &ComplianceChecker {
        &self.checker
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score one ad, partial or complete, against the corpus it will live in.
    ///
    /// Fields are re-detected from the current text rather than trusted from stored state.
    /// A corpus member carrying the same id as `ad` is ignored for the density term.
    pub fn calculate_scores(&self, ad: &AdDraft, corpus: &[ImportedAd]) -> ScoreCard {
        self.explain(ad, corpus).scores
    }

    /// Same as [`ScoringEngine::calculate_scores`] but keeps the audit trail.
    pub fn explain(&self, ad: &AdDraft, corpus: &[ImportedAd]) -> ScoreBreakdown {
        let index = self.index(corpus);
        self.score_text(
            ad.id.as_ref(),
            ad.main_text.as_deref().unwrap_or_default(),
            ad.headline.as_deref().unwrap_or_default(),
            &index,
        )
    }

    /// Re-detect fields and rescore a record in place.
    pub fn analyze(&self, ad: &mut ImportedAd, corpus: &[ImportedAd]) {
        let index = self.index(corpus);
        self.analyze_with_index(ad, &index);
    }

    /// Rescore the whole corpus against itself. Every record is scored against the same
    /// snapshot, so the result does not depend on iteration order.
    pub fn recalculate_all(&self, ads: Vec<ImportedAd>) -> Vec<ImportedAd> {
        let index = self.index(&ads);
        ads.into_iter()
            .map(|mut ad| {
                self.analyze_with_index(&mut ad, &index);
                ad
            })
            .collect()
    }

    fn analyze_with_index(&self, ad: &mut ImportedAd, index: &CorpusIndex) {
        ad.detected = self.detector.detect_fields(&ad.combined_text());
        let breakdown = self.score_text(Some(&ad.id), &ad.main_text, &ad.headline, index);
        ad.apply_scores(breakdown.scores);
    }

    fn index(&self, corpus: &[ImportedAd]) -> CorpusIndex {
        CorpusIndex::build(corpus, &self.config, |ad| {
            let text = ad.combined_text();
            let detected = self.detector.detect_fields(&text);
            let offer = score_offer(&detected, &text, &self.rules, &self.config);
            (self.keywords(&text), offer.offer_score)
        })
    }

    fn keywords(&self, text: &str) -> HashSet<String> {
        keyword_set(text, &self.rules.stopwords)
    }

    fn score_text(
        &self,
        id: Option<&AdId>,
        main_text: &str,
        headline: &str,
        index: &CorpusIndex,
    ) -> ScoreBreakdown {
        let text = combine_text(headline, main_text);
        let detected = self.detector.detect_fields(&text);
        let offer = score_offer(&detected, &text, &self.rules, &self.config);
        let assessment = self.checker.assess(main_text, headline);

        let keywords = self.keywords(&text);
        let matches = index.density_matches(id, &keywords, &self.config);
        let bonus = density_bonus(&matches, &self.config);
        let overall = (f32::from(offer.offer_score) + bonus).round().clamp(0.0, 100.0) as u8;

        tracing::trace!(
            corpus_size = index.len(),
            matches = matches.len(),
            offer_score = offer.offer_score,
            overall_score = overall,
            "scored ad"
        );

        let mut components = offer.components;
        if bonus > 0.0 {
            components.push(ScoreComponent {
                factor: ScoreFactor::CorpusDensity,
                points: bonus.round() as i16,
                notes: format!(
                    "{} corroborating ad(s) in corpus, best overlap {:.2}",
                    matches.len(),
                    matches
                        .iter()
                        .map(|matched| matched.similarity)
                        .fold(0.0_f32, f32::max)
                ),
            });
        }
        if !assessment.is_clear() {
            components.push(ScoreComponent {
                factor: ScoreFactor::Compliance,
                points: -(i16::from(assessment.risk_score)),
                notes: assessment.alerts.join(", "),
            });
        }

        ScoreBreakdown {
            scores: ScoreCard {
                overall_score: overall,
                offer_score: offer.offer_score,
                risk_score: assessment.risk_score,
                compliance_alerts: assessment.alerts,
            },
            components,
            corroborating_ads: matches.into_iter().map(|matched| matched.id).collect(),
        }
    }
}

/// Score with the built-in rule book and default weights.
pub fn calculate_scores(ad: &AdDraft, corpus: &[ImportedAd]) -> ScoreCard {
    match standard_rules() {
        Some(rules) => {
            ScoringEngine::new(rules, ScoringConfig::default()).calculate_scores(ad, corpus)
        }
        None => ScoreCard {
            overall_score: 0,
            offer_score: 0,
            risk_score: 0,
            compliance_alerts: Vec::new(),
        },
    }
}
