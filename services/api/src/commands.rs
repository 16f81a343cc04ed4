use crate::infra::{build_service, FileBackedService};
use clap::Args;
use std::path::PathBuf;
use swipe_engine::config::StorageConfig;
use swipe_engine::error::AppError;
use swipe_engine::workflows::offers::ingest::{parse_csv_path, parse_json_path};
use swipe_engine::workflows::offers::{AdId, ImportSummary, ImportedAd, TextAnalysis};

const PROMISE_PREVIEW_CHARS: usize = 60;

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub(crate) struct ImportArgs {
    /// Ad-library CSV export (Page, Text, Headline, Link, Platform, Status, Country, Start Date)
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    /// JSON array of ad drafts
    #[arg(long)]
    pub(crate) json: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ListArgs {
    /// Only show ads pinned as references
    #[arg(long)]
    pub(crate) references: bool,
}

pub(crate) fn run_list(storage: &StorageConfig, args: ListArgs) -> Result<(), AppError> {
    let service = build_service(storage)?;
    let ads = if args.references {
        service.references()?
    } else {
        service.list()?
    };

    if ads.is_empty() {
        println!("No ads stored in {}", storage.ads_path.display());
        return Ok(());
    }

    println!("{} ad(s) in {}", ads.len(), storage.ads_path.display());
    for ad in &ads {
        println!("{}", render_ad_line(ad));
    }
    Ok(())
}

pub(crate) fn run_import(storage: &StorageConfig, args: ImportArgs) -> Result<(), AppError> {
    let drafts = match (args.csv, args.json) {
        (Some(path), _) => parse_csv_path(path)?,
        (None, Some(path)) => parse_json_path(path)?,
        (None, None) => Vec::new(),
    };

    let service = build_service(storage)?;
    let summary = service.import_batch(drafts)?;
    println!("{}", render_import_summary(&summary));
    Ok(())
}

pub(crate) fn run_recalculate(storage: &StorageConfig) -> Result<(), AppError> {
    let service = build_service(storage)?;
    let ads = service.recalculate_all()?;
    println!("Recalculated scores for {} ad(s)", ads.len());
    Ok(())
}

pub(crate) fn run_delete(storage: &StorageConfig, id: String) -> Result<(), AppError> {
    let service = build_service(storage)?;
    service.delete_ad(&AdId(id.clone()))?;
    println!("Deleted ad {id}");
    Ok(())
}

pub(crate) fn run_reference(storage: &StorageConfig, id: String) -> Result<(), AppError> {
    let service = build_service(storage)?;
    let ad = service.toggle_reference(&AdId(id))?;
    let state = if ad.saved_as_reference {
        "saved as reference"
    } else {
        "removed from references"
    };
    println!("Ad {} {state}", ad.id);
    Ok(())
}

pub(crate) fn run_explain(storage: &StorageConfig, id: String) -> Result<(), AppError> {
    let service = build_service(storage)?;
    let breakdown = service.explain(&AdId(id.clone()))?;

    println!(
        "Ad {id}: overall {} | offer {} | risk {}",
        breakdown.scores.overall_score, breakdown.scores.offer_score, breakdown.scores.risk_score
    );
    for component in &breakdown.components {
        println!(
            "  {:>+4}  {:?}: {}",
            component.points, component.factor, component.notes
        );
    }
    if !breakdown.corroborating_ads.is_empty() {
        let ids: Vec<_> = breakdown
            .corroborating_ads
            .iter()
            .map(AdId::as_str)
            .collect();
        println!("Corroborated by: {}", ids.join(", "));
    }
    Ok(())
}

pub(crate) fn run_detect(storage: &StorageConfig, text: String) -> Result<(), AppError> {
    let service: FileBackedService = build_service(storage)?;
    println!("{}", render_analysis(&service.detect(&text)));
    Ok(())
}

fn render_ad_line(ad: &ImportedAd) -> String {
    let marker = if ad.saved_as_reference { "*" } else { " " };
    let alerts = if ad.compliance_alerts.is_empty() {
        String::new()
    } else {
        format!(" [{}]", ad.compliance_alerts.join(", "))
    };
    format!(
        "{marker} {id}  score {score:>3}  risk {risk:>3}  {page} ({status}): {promise}{alerts}",
        id = ad.id,
        score = ad.display_score(),
        risk = ad.risk_score,
        page = ad.page_or_advertiser,
        status = ad.status.label(),
        promise = preview(&ad.detected.detected_promise),
    )
}

fn render_import_summary(summary: &ImportSummary) -> String {
    format!(
        "Imported {} ad(s); skipped {} duplicate(s) and {} empty row(s)",
        summary.imported.len(),
        summary.skipped_duplicates,
        summary.skipped_empty
    )
}

fn render_analysis(analysis: &TextAnalysis) -> String {
    let detected = &analysis.detected;
    let mut lines = vec![
        format!("Promise:   {}", detected.detected_promise),
        format!("Mechanism: {}", detected.detected_mechanism),
        format!("Proof:     {}", detected.detected_proof),
        format!("CTA:       {}", detected.detected_cta),
        format!("Risk:      {}", analysis.risk_score),
    ];
    for alert in &analysis.compliance_alerts {
        lines.push(format!("  ! {alert}"));
    }
    lines.join("\n")
}

fn preview(value: &str) -> String {
    if value.chars().count() <= PROMISE_PREVIEW_CHARS {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(PROMISE_PREVIEW_CHARS - 1).collect();
    cut.push('…');
    cut
}
