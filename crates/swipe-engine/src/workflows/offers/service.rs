use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::domain::{AdDraft, AdEdit, AdId, AiReanalysis, DetectedFields, ImportedAd};
use super::ingest::partition_new;
use super::repository::{AdRepository, RepositoryError};
use super::scoring::{ScoreBreakdown, ScoringEngine};

/// Counts reported back after a bulk import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: Vec<AdId>,
    pub skipped_duplicates: usize,
    pub skipped_empty: usize,
}

/// Fields and alerts for free text, without touching the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnalysis {
    #[serde(flatten)]
    pub detected: DetectedFields,
    pub compliance_alerts: Vec<String>,
    pub risk_score: u8,
}

/// Service composing the ad repository and the scoring engine.
///
/// Every mutation that can shift corpus-relative scores ends with a full recompute and a
/// `save_ads`, all under one lock, so no caller observes a half-rescored corpus.
pub struct OfferResearchService<R> {
    repository: Arc<R>,
    engine: Arc<ScoringEngine>,
    corpus_lock: Mutex<()>,
}

impl<R> OfferResearchService<R>
where
    R: AdRepository + 'static,
{
    pub fn new(repository: Arc<R>, engine: ScoringEngine) -> Self {
        Self {
            repository,
            engine: Arc::new(engine),
            corpus_lock: Mutex::new(()),
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn list(&self) -> Result<Vec<ImportedAd>, OfferServiceError> {
        Ok(self.repository.get_ads()?)
    }

    pub fn get(&self, id: &AdId) -> Result<ImportedAd, OfferServiceError> {
        self.repository
            .find_ad(id)?
            .ok_or_else(|| RepositoryError::NotFound(id.clone()).into())
    }

    /// Ads the user pinned as references, in corpus order.
    pub fn references(&self) -> Result<Vec<ImportedAd>, OfferServiceError> {
        Ok(self
            .repository
            .get_ads()?
            .into_iter()
            .filter(|ad| ad.saved_as_reference)
            .collect())
    }

    /// Score breakdown for a stored ad against the current corpus.
    pub fn explain(&self, id: &AdId) -> Result<ScoreBreakdown, OfferServiceError> {
        let corpus = self.repository.get_ads()?;
        let ad = corpus
            .iter()
            .find(|ad| &ad.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
        Ok(self.engine.explain(&AdDraft::from(ad), &corpus))
    }

    pub fn detect(&self, text: &str) -> TextAnalysis {
        let assessment = self.engine.checker().assess(text, "");
        TextAnalysis {
            detected: self.engine.detector().detect_fields(text),
            compliance_alerts: assessment.alerts,
            risk_score: assessment.risk_score,
        }
    }

    /// Import one manually entered ad. The new ad can corroborate existing ones, so the
    /// whole corpus is rescored.
    pub fn import_ad(&self, draft: AdDraft) -> Result<ImportedAd, OfferServiceError> {
        let _guard = self.lock_corpus()?;

        let mut corpus = self.repository.get_ads()?;
        let id = draft.id.clone().unwrap_or_else(AdId::generate);
        if corpus.iter().any(|ad| ad.id == id) {
            return Err(RepositoryError::Conflict(id).into());
        }
        corpus.push(ImportedAd::from_draft(id.clone(), draft, Utc::now()));

        let saved = self.rescore_and_save(corpus)?;
        let ad = take_by_id(saved, &id)?;
        info!(ad_id = %ad.id, overall_score = ad.overall_score, "imported ad");
        Ok(ad)
    }

    /// Bulk ingest from an external search or export. Drafts repeating an existing
    /// advertiser + body pair are skipped; the whole corpus is rescored afterwards.
    pub fn import_batch(&self, drafts: Vec<AdDraft>) -> Result<ImportSummary, OfferServiceError> {
        let _guard = self.lock_corpus()?;

        let mut corpus = self.repository.get_ads()?;
        let outcome = partition_new(&corpus, drafts);
        let imported_at = Utc::now();

        let mut imported = Vec::with_capacity(outcome.fresh.len());
        for draft in outcome.fresh {
            let id = draft.id.clone().unwrap_or_else(AdId::generate);
            if corpus.iter().any(|ad| ad.id == id) {
                return Err(RepositoryError::Conflict(id).into());
            }
            imported.push(id.clone());
            corpus.push(ImportedAd::from_draft(id, draft, imported_at));
        }

        let summary = ImportSummary {
            imported,
            skipped_duplicates: outcome.duplicates.len(),
            skipped_empty: outcome.empty.len(),
        };

        if !summary.imported.is_empty() {
            self.rescore_and_save(corpus)?;
        }

        info!(
            imported = summary.imported.len(),
            skipped_duplicates = summary.skipped_duplicates,
            skipped_empty = summary.skipped_empty,
            "bulk import finished"
        );
        Ok(summary)
    }

    /// Apply user edits. Detected fields follow the text; scores are recomputed corpus-wide.
    pub fn edit_ad(&self, id: &AdId, edit: AdEdit) -> Result<ImportedAd, OfferServiceError> {
        let _guard = self.lock_corpus()?;

        let mut corpus = self.repository.get_ads()?;
        let ad = find_mut(&mut corpus, id)?;
        let text_changed = edit.apply_to(ad);
        debug!(ad_id = %id, text_changed, "edited ad");

        let saved = self.rescore_and_save(corpus)?;
        take_by_id(saved, id)
    }

    /// Merge a remote re-analysis into an ad and rescore the corpus.
    pub fn apply_ai_analysis(
        &self,
        id: &AdId,
        analysis: &AiReanalysis,
    ) -> Result<ImportedAd, OfferServiceError> {
        let _guard = self.lock_corpus()?;

        let mut corpus = self.repository.get_ads()?;
        find_mut(&mut corpus, id)?.merge_ai_analysis(analysis);

        let saved = self.rescore_and_save(corpus)?;
        take_by_id(saved, id)
    }

    /// Flip the reference flag. Scores are untouched.
    pub fn toggle_reference(&self, id: &AdId) -> Result<ImportedAd, OfferServiceError> {
        let _guard = self.lock_corpus()?;

        let mut ad = self
            .repository
            .find_ad(id)?
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
        ad.saved_as_reference = !ad.saved_as_reference;
        self.repository.update_ad(ad.clone())?;
        Ok(ad)
    }

    /// Remove one ad. Other records keep their scores until the next recompute.
    pub fn delete_ad(&self, id: &AdId) -> Result<(), OfferServiceError> {
        let _guard = self.lock_corpus()?;
        self.repository.delete_ad(id)?;
        info!(ad_id = %id, "deleted ad");
        Ok(())
    }

    /// Re-detect and rescore every ad against the current corpus, then persist them all.
    pub fn recalculate_all(&self) -> Result<Vec<ImportedAd>, OfferServiceError> {
        let _guard = self.lock_corpus()?;
        let corpus = self.repository.get_ads()?;
        let saved = self.rescore_and_save(corpus)?;
        info!(ads = saved.len(), "recalculated corpus scores");
        Ok(saved)
    }

    fn rescore_and_save(&self, corpus: Vec<ImportedAd>) -> Result<Vec<ImportedAd>, OfferServiceError> {
        let rescored = self.engine.recalculate_all(corpus);
        self.repository.save_ads(rescored.clone())?;
        Ok(rescored)
    }

    fn lock_corpus(&self) -> Result<MutexGuard<'_, ()>, OfferServiceError> {
        self.corpus_lock
            .lock()
            .map_err(|_| OfferServiceError::Unavailable("corpus lock poisoned".to_string()))
    }
}

fn find_mut<'a>(corpus: &'a mut [ImportedAd], id: &AdId) -> Result<&'a mut ImportedAd, OfferServiceError> {
    corpus
        .iter_mut()
        .find(|ad| &ad.id == id)
        .ok_or_else(|| RepositoryError::NotFound(id.clone()).into())
}

fn take_by_id(corpus: Vec<ImportedAd>, id: &AdId) -> Result<ImportedAd, OfferServiceError> {
    corpus
        .into_iter()
        .find(|ad| &ad.id == id)
        .ok_or_else(|| RepositoryError::NotFound(id.clone()).into())
}

/// Error raised by the offer research service.
#[derive(Debug, thiserror::Error)]
pub enum OfferServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("offer service unavailable: {0}")]
    Unavailable(String),
}
