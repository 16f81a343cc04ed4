use serde::{Deserialize, Serialize};

/// Weights and thresholds used by the scoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub promise_points: u8,
    pub mechanism_points: u8,
    pub proof_points: u8,
    pub cta_points: u8,

    /// Word counts bounding the length bands: below the first the copy earns nothing.
    pub min_effective_words: usize,
    pub short_copy_words: usize,
    pub ideal_max_words: usize,
    pub long_max_words: usize,
    pub short_copy_points: u8,
    pub ideal_copy_points: u8,
    pub long_copy_points: u8,
    pub overlong_copy_points: u8,

    pub number_points: u8,
    pub price_points: u8,
    pub guarantee_points: u8,

    /// Minimum keyword overlap for another ad to count as the same pattern.
    pub similarity_threshold: f32,
    /// Intrinsic offer score another ad needs before it corroborates a pattern.
    pub validated_offer_score: u8,
    pub match_weight: f32,
    pub inactive_match_factor: f32,
    pub longevity_saturation_days: u32,
    pub max_density_bonus: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            promise_points: 20,
            mechanism_points: 15,
            proof_points: 15,
            cta_points: 10,
            min_effective_words: 8,
            short_copy_words: 20,
            ideal_max_words: 150,
            long_max_words: 400,
            short_copy_points: 5,
            ideal_copy_points: 15,
            long_copy_points: 10,
            overlong_copy_points: 5,
            number_points: 8,
            price_points: 7,
            guarantee_points: 10,
            similarity_threshold: 0.35,
            validated_offer_score: 60,
            match_weight: 8.0,
            inactive_match_factor: 0.5,
            longevity_saturation_days: 60,
            max_density_bonus: 25.0,
        }
    }
}

impl ScoringConfig {
    /// Replace non-finite or out-of-range float settings with their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if !self.similarity_threshold.is_finite()
            || self.similarity_threshold <= 0.0
            || self.similarity_threshold > 1.0
        {
            self.similarity_threshold = defaults.similarity_threshold;
        }
        if !self.match_weight.is_finite() || self.match_weight < 0.0 {
            self.match_weight = defaults.match_weight;
        }
        if !self.inactive_match_factor.is_finite()
            || !(0.0..=1.0).contains(&self.inactive_match_factor)
        {
            self.inactive_match_factor = defaults.inactive_match_factor;
        }
        if !self.max_density_bonus.is_finite() || self.max_density_bonus < 0.0 {
            self.max_density_bonus = defaults.max_density_bonus;
        }
        if self.longevity_saturation_days == 0 {
            self.longevity_saturation_days = defaults.longevity_saturation_days;
        }

        self
    }
}
