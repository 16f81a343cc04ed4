use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use swipe_engine::config::{ConfigError, StorageConfig};
use swipe_engine::error::AppError;
use swipe_engine::workflows::offers::{
    JsonFileAdRepository, OfferResearchService, RuleBook, ScoringConfig, ScoringEngine,
};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type FileBackedService = OfferResearchService<JsonFileAdRepository>;

/// Service over the configured JSON store, with rule and weight overrides applied.
pub(crate) fn build_service(storage: &StorageConfig) -> Result<FileBackedService, AppError> {
    let engine = build_engine(storage)?;
    let repository = Arc::new(JsonFileAdRepository::new(&storage.ads_path));
    info!(ads_path = %storage.ads_path.display(), "opened ad store");
    Ok(OfferResearchService::new(repository, engine))
}

pub(crate) fn build_engine(storage: &StorageConfig) -> Result<ScoringEngine, AppError> {
    let book = match &storage.rules_path {
        Some(path) => {
            info!(rules_path = %path.display(), "loading rule book override");
            RuleBook::from_path(path)?
        }
        None => RuleBook::standard(),
    };

    let scoring = match &storage.scoring_path {
        Some(path) => load_scoring_config(path)?,
        None => ScoringConfig::default(),
    };

    Ok(ScoringEngine::from_rule_book(&book, scoring)?)
}

fn load_scoring_config(path: &Path) -> Result<ScoringConfig, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidScoring {
        path: path.to_path_buf(),
        reason,
    };

    let raw = std::fs::read_to_string(path).map_err(|err| invalid(err.to_string()))?;
    serde_json::from_str(&raw).map_err(|err| invalid(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn storage(dir: &Path) -> StorageConfig {
        StorageConfig {
            ads_path: dir.join("ads.json"),
            rules_path: None,
            scoring_path: None,
        }
    }

    #[test]
    fn builds_service_with_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let service = build_service(&storage(dir.path())).expect("service builds");
        assert!(service.list().expect("empty store").is_empty());
        assert_eq!(service.engine().config(), &ScoringConfig::default());
    }

    #[test]
    fn applies_scoring_override() {
        let dir = tempfile::tempdir().expect("temp dir");
        let scoring_path = dir.path().join("scoring.json");
        std::fs::write(&scoring_path, r#"{ "max_density_bonus": 5.0 }"#).expect("write");

        let mut config = storage(dir.path());
        config.scoring_path = Some(scoring_path);

        let engine = build_engine(&config).expect("engine builds");
        assert_eq!(engine.config().max_density_bonus, 5.0);
    }

    #[test]
    fn reports_unreadable_overrides() {
        let dir = tempfile::tempdir().expect("temp dir");

        let mut config = storage(dir.path());
        config.scoring_path = Some(PathBuf::from("/definitely/not/here.json"));
        assert!(matches!(
            build_engine(&config),
            Err(AppError::Config(ConfigError::InvalidScoring { .. }))
        ));

        let rules_path = dir.path().join("rules.json");
        std::fs::write(&rules_path, "{}").expect("write");
        let mut config = storage(dir.path());
        config.rules_path = Some(rules_path);
        assert!(matches!(build_engine(&config), Err(AppError::Rules(_))));
    }
}
