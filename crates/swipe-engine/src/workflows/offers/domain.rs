use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder stored in detected fields when no segment matched.
pub const NOT_DETECTED: &str = "—";

/// Identifier wrapper for imported ads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdId(pub String);

impl AdId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AdId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AdId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Delivery state reported by the ad library the record was observed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdStatus {
    #[default]
    Active,
    Inactive,
}

impl AdStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AdStatus::Active => "active",
            AdStatus::Inactive => "inactive",
        }
    }

    /// Lenient parse used by CSV ingest; anything other than an inactive marker is active.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "inactive" | "inativo" | "inativa" | "paused" | "stopped" | "ended" => {
                AdStatus::Inactive
            }
            _ => AdStatus::Active,
        }
    }
}

/// Output of the field detector. Every field is either extracted text or [`NOT_DETECTED`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectedFields {
    pub detected_promise: String,
    pub detected_mechanism: String,
    pub detected_proof: String,
    #[serde(rename = "detectedCTA")]
    pub detected_cta: String,
}

impl DetectedFields {
    pub fn empty() -> Self {
        Self {
            detected_promise: NOT_DETECTED.to_string(),
            detected_mechanism: NOT_DETECTED.to_string(),
            detected_proof: NOT_DETECTED.to_string(),
            detected_cta: NOT_DETECTED.to_string(),
        }
    }

    /// Number of roles that resolved to real text.
    pub fn detected_count(&self) -> usize {
        [
            &self.detected_promise,
            &self.detected_mechanism,
            &self.detected_proof,
            &self.detected_cta,
        ]
        .iter()
        .filter(|value| is_detected(value))
        .count()
    }
}

impl Default for DetectedFields {
    fn default() -> Self {
        Self::empty()
    }
}

pub fn is_detected(value: &str) -> bool {
    !value.trim().is_empty() && value != NOT_DETECTED
}

/// Scores produced together by the scoring engine for one ad snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreCard {
    pub overall_score: u8,
    pub offer_score: u8,
    pub risk_score: u8,
    pub compliance_alerts: Vec<String>,
}

/// One observed advertisement together with its computed analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedAd {
    pub id: AdId,
    #[serde(default)]
    pub page_or_advertiser: String,
    #[serde(default)]
    pub main_text: String,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub status: AdStatus,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    pub imported_at: DateTime<Utc>,

    #[serde(flatten)]
    pub detected: DetectedFields,

    #[serde(default)]
    pub promise_summary: String,
    #[serde(default)]
    pub mechanism: String,
    #[serde(default)]
    pub proof: String,
    #[serde(default)]
    pub offer: String,
    #[serde(default)]
    pub inferred_audience: String,

    #[serde(default)]
    pub overall_score: u8,
    #[serde(default)]
    pub offer_score: u8,
    #[serde(default)]
    pub risk_score: u8,
    #[serde(default)]
    pub compliance_alerts: Vec<String>,

    #[serde(default)]
    pub saved_as_reference: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_scale_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub niche_id: Option<String>,
}

impl ImportedAd {
    /// Materialize a draft into a record. Detected fields and scores start empty; callers
    /// run the scoring engine before persisting.
    pub fn from_draft(id: AdId, draft: AdDraft, imported_at: DateTime<Utc>) -> Self {
        Self {
            id,
            page_or_advertiser: draft.page_or_advertiser.unwrap_or_default(),
            main_text: draft.main_text.unwrap_or_default(),
            headline: draft.headline.unwrap_or_default(),
            link: draft.link.unwrap_or_default(),
            platform: draft.platform.unwrap_or_default(),
            status: draft.status.unwrap_or_default(),
            country: draft.country.unwrap_or_default(),
            start_date: draft.start_date,
            imported_at: draft.imported_at.unwrap_or(imported_at),
            detected: DetectedFields::empty(),
            promise_summary: draft.promise_summary.unwrap_or_default(),
            mechanism: draft.mechanism.unwrap_or_default(),
            proof: draft.proof.unwrap_or_default(),
            offer: draft.offer.unwrap_or_default(),
            inferred_audience: draft.inferred_audience.unwrap_or_default(),
            overall_score: 0,
            offer_score: 0,
            risk_score: 0,
            compliance_alerts: Vec::new(),
            saved_as_reference: draft.saved_as_reference.unwrap_or(false),
            ai_scale_score: draft.ai_scale_score.map(|score| score.min(100)),
            niche_id: draft.niche_id,
        }
    }

    /// Write the whole score card at once so the three scores never drift apart.
    pub fn apply_scores(&mut self, scores: ScoreCard) {
        self.overall_score = scores.overall_score;
        self.offer_score = scores.offer_score;
        self.risk_score = scores.risk_score;
        self.compliance_alerts = scores.compliance_alerts;
    }

    pub fn score_card(&self) -> ScoreCard {
        ScoreCard {
            overall_score: self.overall_score,
            offer_score: self.offer_score,
            risk_score: self.risk_score,
            compliance_alerts: self.compliance_alerts.clone(),
        }
    }

    /// Score shown to users: the AI scale score when supplied, otherwise the heuristic one.
    pub fn display_score(&self) -> u8 {
        self.ai_scale_score.unwrap_or(self.overall_score)
    }

    /// Body and headline joined the way the detector and checker read them.
    pub fn combined_text(&self) -> String {
        combine_text(&self.headline, &self.main_text)
    }

    /// Days between the first delivery date and the import timestamp.
    pub fn days_running(&self) -> Option<i64> {
        self.start_date
            .map(|start| (self.imported_at.date_naive() - start).num_days().max(0))
    }

    /// Merge a remote re-analysis. Blank values never overwrite existing analysis.
    pub fn merge_ai_analysis(&mut self, analysis: &AiReanalysis) {
        let card = &analysis.offer_card;
        merge_field(&mut self.promise_summary, &card.promise);
        merge_field(&mut self.mechanism, &card.mechanism);
        merge_field(&mut self.proof, &join_non_blank(&card.proof, "; "));
        merge_field(&mut self.offer, &card.format);
        merge_field(&mut self.inferred_audience, &join_non_blank(&card.angle, ", "));
        self.ai_scale_score = Some(clamp_external_score(analysis.scale_score.score_0_100));
    }
}

fn merge_field(target: &mut String, incoming: &str) {
    let trimmed = incoming.trim();
    if !trimmed.is_empty() {
        *target = trimmed.to_string();
    }
}

fn join_non_blank(values: &[String], separator: &str) -> String {
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

fn clamp_external_score(score: f64) -> u8 {
    if score.is_finite() {
        score.round().clamp(0.0, 100.0) as u8
    } else {
        0
    }
}

pub(crate) fn combine_text(headline: &str, main_text: &str) -> String {
    let headline = headline.trim();
    let main_text = main_text.trim();
    match (headline.is_empty(), main_text.is_empty()) {
        (true, true) => String::new(),
        (true, false) => main_text.to_string(),
        (false, true) => headline.to_string(),
        (false, false) => format!("{headline}\n{main_text}"),
    }
}

/// Partial ad accepted by import paths and the scoring engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdDraft {
    pub id: Option<AdId>,
    pub page_or_advertiser: Option<String>,
    pub main_text: Option<String>,
    pub headline: Option<String>,
    pub link: Option<String>,
    pub platform: Option<String>,
    pub status: Option<AdStatus>,
    pub country: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub imported_at: Option<DateTime<Utc>>,
    pub promise_summary: Option<String>,
    pub mechanism: Option<String>,
    pub proof: Option<String>,
    pub offer: Option<String>,
    pub inferred_audience: Option<String>,
    pub saved_as_reference: Option<bool>,
    pub ai_scale_score: Option<u8>,
    pub niche_id: Option<String>,
}

impl AdDraft {
    pub fn with_text(main_text: impl Into<String>) -> Self {
        Self {
            main_text: Some(main_text.into()),
            ..Self::default()
        }
    }

    pub fn combined_text(&self) -> String {
        combine_text(
            self.headline.as_deref().unwrap_or_default(),
            self.main_text.as_deref().unwrap_or_default(),
        )
    }

    pub fn has_text(&self) -> bool {
        !self.combined_text().is_empty()
    }
}

impl From<&ImportedAd> for AdDraft {
    fn from(ad: &ImportedAd) -> Self {
        Self {
            id: Some(ad.id.clone()),
            page_or_advertiser: Some(ad.page_or_advertiser.clone()),
            main_text: Some(ad.main_text.clone()),
            headline: Some(ad.headline.clone()),
            link: Some(ad.link.clone()),
            platform: Some(ad.platform.clone()),
            status: Some(ad.status),
            country: Some(ad.country.clone()),
            start_date: ad.start_date,
            imported_at: Some(ad.imported_at),
            promise_summary: Some(ad.promise_summary.clone()),
            mechanism: Some(ad.mechanism.clone()),
            proof: Some(ad.proof.clone()),
            offer: Some(ad.offer.clone()),
            inferred_audience: Some(ad.inferred_audience.clone()),
            saved_as_reference: Some(ad.saved_as_reference),
            ai_scale_score: ad.ai_scale_score,
            niche_id: ad.niche_id.clone(),
        }
    }
}

/// User edits applied to an existing record. Absent fields stay untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdEdit {
    pub page_or_advertiser: Option<String>,
    pub main_text: Option<String>,
    pub headline: Option<String>,
    pub link: Option<String>,
    pub platform: Option<String>,
    pub status: Option<AdStatus>,
    pub country: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub promise_summary: Option<String>,
    pub mechanism: Option<String>,
    pub proof: Option<String>,
    pub offer: Option<String>,
    pub inferred_audience: Option<String>,
    pub niche_id: Option<String>,
}

impl AdEdit {
    /// Apply the edit, returning whether the scored text changed.
    pub fn apply_to(self, ad: &mut ImportedAd) -> bool {
        let before = ad.combined_text();

        let assign = |target: &mut String, value: Option<String>| {
            if let Some(value) = value {
                *target = value;
            }
        };

        assign(&mut ad.page_or_advertiser, self.page_or_advertiser);
        assign(&mut ad.main_text, self.main_text);
        assign(&mut ad.headline, self.headline);
        assign(&mut ad.link, self.link);
        assign(&mut ad.platform, self.platform);
        assign(&mut ad.country, self.country);
        assign(&mut ad.promise_summary, self.promise_summary);
        assign(&mut ad.mechanism, self.mechanism);
        assign(&mut ad.proof, self.proof);
        assign(&mut ad.offer, self.offer);
        assign(&mut ad.inferred_audience, self.inferred_audience);
        if let Some(status) = self.status {
            ad.status = status;
        }
        if self.start_date.is_some() {
            ad.start_date = self.start_date;
        }
        if self.niche_id.is_some() {
            ad.niche_id = self.niche_id;
        }

        ad.combined_text() != before
    }
}

/// Structured offer summary returned by the remote re-analysis collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfferCard {
    pub promise: String,
    pub mechanism: String,
    pub proof: Vec<String>,
    pub angle: Vec<String>,
    pub format: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleScore {
    pub score_0_100: f64,
}

/// Payload merged into an ad after a remote re-analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiReanalysis {
    pub offer_card: OfferCard,
    pub scale_score: ScaleScore,
}
