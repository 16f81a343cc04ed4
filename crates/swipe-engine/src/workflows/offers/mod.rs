//! Swipe offer research: heuristic field detection, compliance checks, and corpus-relative
//! scoring over a repository of imported ads.

pub mod compliance;
pub mod detection;
pub mod domain;
pub mod ingest;
pub mod repository;
pub mod router;
pub mod rules;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use compliance::{detect_compliance_alerts, ComplianceAssessment, ComplianceChecker};
pub use detection::{detect_fields, FieldDetector, MAX_FIELD_CHARS};
pub use domain::{
    AdDraft, AdEdit, AdId, AdStatus, AiReanalysis, DetectedFields, ImportedAd, OfferCard,
    ScaleScore, ScoreCard, NOT_DETECTED,
};
pub use ingest::{DuplicateKey, IngestError};
pub use repository::{AdRepository, InMemoryAdRepository, JsonFileAdRepository, RepositoryError};
pub use router::offer_router;
pub use rules::{AlertSeverity, FieldRole, RuleBook, RuleBookError, Trigger};
pub use scoring::{
    calculate_scores, ScoreBreakdown, ScoreComponent, ScoreFactor, ScoringConfig, ScoringEngine,
};
pub use service::{ImportSummary, OfferResearchService, OfferServiceError, TextAnalysis};
