use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};

use super::domain::{AdDraft, AdStatus, ImportedAd};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read ad export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid ad CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid ad JSON data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Identity used to spot the same creative imported twice. The body is the main text, or
/// the headline for headline-only ads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DuplicateKey {
    advertiser: String,
    body: String,
}

impl DuplicateKey {
    pub fn new(page_or_advertiser: &str, body: &str) -> Self {
        Self {
            advertiser: normalize_text(page_or_advertiser),
            body: normalize_text(body),
        }
    }

    pub fn for_ad(ad: &ImportedAd) -> Self {
        Self::new(&ad.page_or_advertiser, body_of(&ad.main_text, &ad.headline))
    }

    pub fn for_draft(draft: &AdDraft) -> Self {
        Self::new(
            draft.page_or_advertiser.as_deref().unwrap_or_default(),
            body_of(
                draft.main_text.as_deref().unwrap_or_default(),
                draft.headline.as_deref().unwrap_or_default(),
            ),
        )
    }
}

fn body_of<'a>(main_text: &'a str, headline: &'a str) -> &'a str {
    if main_text.trim().is_empty() {
        headline
    } else {
        main_text
    }
}

pub(crate) fn normalize_text(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}', '\u{200c}', '\u{200d}'], "");
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Result of splitting a batch into fresh drafts and ones already known.
#[derive(Debug, Default)]
pub struct DedupOutcome {
    pub fresh: Vec<AdDraft>,
    pub duplicates: Vec<AdDraft>,
    pub empty: Vec<AdDraft>,
}

/// Drop drafts whose advertiser and body already exist in the corpus or earlier in the batch.
pub fn partition_new(existing: &[ImportedAd], drafts: Vec<AdDraft>) -> DedupOutcome {
    let mut seen: HashSet<DuplicateKey> = existing.iter().map(DuplicateKey::for_ad).collect();
    let mut outcome = DedupOutcome::default();

    for draft in drafts {
        if !draft.has_text() {
            outcome.empty.push(draft);
            continue;
        }
        if seen.insert(DuplicateKey::for_draft(&draft)) {
            outcome.fresh.push(draft);
        } else {
            outcome.duplicates.push(draft);
        }
    }

    outcome
}

/// Parse an ad-library style CSV export.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<AdDraft>, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut drafts = Vec::new();

    for record in csv_reader.deserialize::<AdRow>() {
        let row = record?;
        drafts.push(row.into_draft());
    }

    Ok(drafts)
}

pub fn parse_csv_path<P: AsRef<Path>>(path: P) -> Result<Vec<AdDraft>, IngestError> {
    let file = std::fs::File::open(path)?;
    parse_csv(file)
}

/// Parse a JSON array of drafts, as produced by external search results.
pub fn parse_json<R: Read>(reader: R) -> Result<Vec<AdDraft>, IngestError> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn parse_json_path<P: AsRef<Path>>(path: P) -> Result<Vec<AdDraft>, IngestError> {
    let file = std::fs::File::open(path)?;
    parse_json(std::io::BufReader::new(file))
}

#[derive(Debug, Deserialize)]
struct AdRow {
    #[serde(rename = "Page", alias = "Advertiser", default, deserialize_with = "empty_string_as_none")]
    page: Option<String>,
    #[serde(rename = "Text", alias = "Ad Text", default, deserialize_with = "empty_string_as_none")]
    text: Option<String>,
    #[serde(rename = "Headline", default, deserialize_with = "empty_string_as_none")]
    headline: Option<String>,
    #[serde(rename = "Link", alias = "URL", default, deserialize_with = "empty_string_as_none")]
    link: Option<String>,
    #[serde(rename = "Platform", default, deserialize_with = "empty_string_as_none")]
    platform: Option<String>,
    #[serde(rename = "Status", default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    #[serde(rename = "Country", default, deserialize_with = "empty_string_as_none")]
    country: Option<String>,
    #[serde(rename = "Start Date", default, deserialize_with = "empty_string_as_none")]
    start_date: Option<String>,
}

impl AdRow {
    fn into_draft(self) -> AdDraft {
        AdDraft {
            page_or_advertiser: self.page,
            main_text: self.text,
            headline: self.headline,
            link: self.link,
            platform: self.platform,
            status: self.status.as_deref().map(AdStatus::parse_lenient),
            country: self.country,
            start_date: self.start_date.as_deref().and_then(parse_date),
            ..AdDraft::default()
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    NaiveDate::parse_from_str(trimmed, "%d/%m/%Y").ok()
}
