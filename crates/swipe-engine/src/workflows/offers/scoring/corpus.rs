use std::collections::{BTreeSet, HashMap, HashSet};

use super::super::domain::{AdId, AdStatus, ImportedAd};
use super::config::ScoringConfig;

/// Lowercased content words used for similarity, minus stopwords and bare numbers.
pub(crate) fn keyword_set(text: &str, stopwords: &HashSet<String>) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= 3)
        .filter(|token| !token.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_lowercase)
        .filter(|token| !stopwords.contains(token))
        .collect()
}

/// Jaccard overlap of two keyword sets; empty sets never match.
pub(crate) fn similarity(left: &HashSet<String>, right: &HashSet<String>) -> f32 {
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let shared = left.intersection(right).count();
    let union = left.len() + right.len() - shared;
    shared as f32 / union as f32
}

struct CorpusEntry {
    id: AdId,
    keywords: HashSet<String>,
    offer_score: u8,
    evidence_weight: f32,
}

/// Per-corpus precomputation: keywords and intrinsic offer score for every ad, plus an
/// inverted keyword index so only ads sharing vocabulary are compared.
pub(crate) struct CorpusIndex {
    entries: Vec<CorpusEntry>,
    postings: HashMap<String, Vec<usize>>,
}

/// How strongly one matched ad corroborates a pattern.
pub(crate) struct DensityMatch {
    pub id: AdId,
    pub similarity: f32,
    pub contribution: f32,
}

impl CorpusIndex {
    pub(crate) fn build<F>(corpus: &[ImportedAd], config: &ScoringConfig, mut profile: F) -> Self
    where
        F: FnMut(&ImportedAd) -> (HashSet<String>, u8),
    {
        let mut entries = Vec::with_capacity(corpus.len());
        let mut postings: HashMap<String, Vec<usize>> = HashMap::new();

        for (position, ad) in corpus.iter().enumerate() {
            let (keywords, offer_score) = profile(ad);
            for keyword in &keywords {
                postings.entry(keyword.clone()).or_default().push(position);
            }
            entries.push(CorpusEntry {
                id: ad.id.clone(),
                keywords,
                offer_score,
                evidence_weight: evidence_weight(ad, config),
            });
        }

        Self { entries, postings }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Matches that corroborate the subject's pattern. The subject itself is skipped by id;
    /// other ads with the same text still count.
    pub(crate) fn density_matches(
        &self,
        subject: Option<&AdId>,
        keywords: &HashSet<String>,
        config: &ScoringConfig,
    ) -> Vec<DensityMatch> {
        let candidates: BTreeSet<usize> = keywords
            .iter()
            .filter_map(|keyword| self.postings.get(keyword))
            .flatten()
            .copied()
            .collect();

        candidates
            .into_iter()
            .map(|position| &self.entries[position])
            .filter(|entry| Some(&entry.id) != subject)
            .filter(|entry| entry.offer_score >= config.validated_offer_score)
            .filter_map(|entry| {
                let similarity = similarity(keywords, &entry.keywords);
                if similarity < config.similarity_threshold {
                    return None;
                }
                Some(DensityMatch {
                    id: entry.id.clone(),
                    similarity,
                    contribution: similarity * config.match_weight * entry.evidence_weight,
                })
            })
            .collect()
    }
}

/// Sum of match contributions, capped at the configured maximum.
pub(crate) fn density_bonus(matches: &[DensityMatch], config: &ScoringConfig) -> f32 {
    let total: f32 = matches.iter().map(|matched| matched.contribution).sum();
    if total.is_finite() {
        total.clamp(0.0, config.max_density_bonus)
    } else {
        0.0
    }
}

/// Active, long-running ads are stronger evidence that a pattern scales.
fn evidence_weight(ad: &ImportedAd, config: &ScoringConfig) -> f32 {
    let activity = match ad.status {
        AdStatus::Active => 1.0,
        AdStatus::Inactive => config.inactive_match_factor,
    };
    let saturation = config.longevity_saturation_days.max(1) as f32;
    let days = ad.days_running().unwrap_or(0).max(0) as f32;
    let longevity = 1.0 + days.min(saturation) / saturation;
    activity * longevity
}
