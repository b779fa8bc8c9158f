//! Core domain types for the precall briefing pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PrecallError, Result};

// ---------------------------------------------------------------------------
// BriefingRequest
// ---------------------------------------------------------------------------

/// Incoming pipeline request, as handed over by the boundary layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefingRequest {
    /// Company domain, e.g. `example.com`. An explicit `http://`/`https://`
    /// scheme is allowed and preserved.
    pub company_domain: String,
    /// Lead context identifier from marketing campaigns.
    pub context_id: String,
    /// Unique lead identifier.
    pub lead_id: String,
}

impl BriefingRequest {
    /// Validate and normalize the request.
    ///
    /// The domain is trimmed and lowercased and must contain a `'.'` once
    /// any explicit scheme is stripped; `context_id` and `lead_id` must be
    /// non-empty. This is the only validation class that rejects a request
    /// before the pipeline starts.
    pub fn normalized(&self) -> Result<BriefingRequest> {
        let domain = self.company_domain.trim().to_lowercase();
        let bare = bare_domain(&domain);
        if bare.len() < 3 || !bare.contains('.') {
            return Err(PrecallError::validation(format!(
                "invalid company domain: {:?}",
                self.company_domain
            )));
        }

        let context_id = self.context_id.trim();
        if context_id.is_empty() {
            return Err(PrecallError::validation("context_id must not be empty"));
        }

        let lead_id = self.lead_id.trim();
        if lead_id.is_empty() {
            return Err(PrecallError::validation("lead_id must not be empty"));
        }

        Ok(BriefingRequest {
            company_domain: domain,
            context_id: context_id.to_string(),
            lead_id: lead_id.to_string(),
        })
    }
}

/// Strip an explicit HTTP(S) scheme from a domain string.
pub fn bare_domain(domain: &str) -> &str {
    domain
        .strip_prefix("https://")
        .or_else(|| domain.strip_prefix("http://"))
        .unwrap_or(domain)
}

// ---------------------------------------------------------------------------
// IntelligenceSnapshot
// ---------------------------------------------------------------------------

/// Combined website-text + headlines result for one domain at one point in
/// time. Created fresh per request and discarded after synthesis.
#[derive(Debug, Clone, Default)]
pub struct IntelligenceSnapshot {
    /// Sanitized website text, bounded by the configured character budget.
    pub page_text: String,
    /// News headlines; a failed headline fetch degrades to a placeholder
    /// entry rather than emptying the list.
    pub headlines: Vec<String>,
    /// Set only when the page-text source failed outright.
    pub fetch_error: Option<String>,
}

impl IntelligenceSnapshot {
    /// Whether the snapshot carries enough signal to be worth a model call.
    pub fn is_valid(&self) -> bool {
        self.fetch_error.is_none() && !self.page_text.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// ContextRecord
// ---------------------------------------------------------------------------

/// A static marketing/campaign metadata entry, looked up by `context_id`.
/// Opaque to the pipeline; absence is not fatal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextRecord(pub serde_json::Map<String, serde_json::Value>);

impl ContextRecord {
    /// An empty record, used when lookup finds nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render the record as readable key-value text for prompt embedding.
    pub fn to_pretty_text(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| "{}".into())
    }
}

// ---------------------------------------------------------------------------
// BriefingDocument
// ---------------------------------------------------------------------------

/// A potential prospect objection paired with a suggested handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objection {
    pub objection: String,
    pub response: String,
}

/// The fixed five-field briefing consumed by a sales representative.
///
/// All five semantic fields are always present in any value returned to
/// callers, even on failure; `error` marks degraded (fallback) output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BriefingDocument {
    /// Concise business overview, industry, and key characteristics.
    pub company_profile: String,
    /// Recent developments, news, or changes.
    pub key_updates: Vec<String>,
    /// Specific value proposition based on the lead context.
    pub lead_angle: String,
    /// Suggested opening questions (target 3–4).
    pub conversation_starters: Vec<String>,
    /// Likely objections with suggested responses.
    pub potential_objections: Vec<Objection>,
    /// Set when the document is degraded fallback content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// LeadRecord
// ---------------------------------------------------------------------------

/// Lead lifecycle status. One-way: `New` → `BriefingGenerated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadStatus {
    New,
    BriefingGenerated,
}

/// A lead entry owned exclusively by the lead record store.
/// `lead_id` is the uniqueness invariant; writes are upserts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadRecord {
    pub lead_id: String,
    pub display_name: String,
    pub company_name: String,
    /// Serialized [`BriefingDocument`].
    pub briefing: String,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// BriefingResponse
// ---------------------------------------------------------------------------

/// Payload-level outcome of a completed pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    /// The briefing was synthesized from live intelligence.
    Success,
    /// The pipeline completed but the briefing is degraded fallback content.
    Error,
}

/// Processing metadata attached to every response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub processing_time_seconds: f64,
    pub record_store_updated: bool,
    pub context_found: bool,
    pub intelligence_valid: bool,
    /// Cause of degradation, when the briefing is fallback content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The response handed back to the boundary layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefingResponse {
    pub status: ResponseStatus,
    pub message: String,
    pub briefing: BriefingDocument,
    pub metadata: ResponseMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(domain: &str) -> BriefingRequest {
        BriefingRequest {
            company_domain: domain.into(),
            context_id: "ctx_1".into(),
            lead_id: "lead_1".into(),
        }
    }

    #[test]
    fn normalization_lowercases_and_trims() {
        let req = request("  Example.COM ");
        let normalized = req.normalized().expect("valid");
        assert_eq!(normalized.company_domain, "example.com");
    }

    #[test]
    fn normalization_preserves_explicit_scheme() {
        let req = request("http://example.com");
        let normalized = req.normalized().expect("valid");
        assert_eq!(normalized.company_domain, "http://example.com");
    }

    #[test]
    fn domain_without_dot_rejected() {
        let err = request("localhost").normalized().unwrap_err();
        assert!(err.to_string().contains("invalid company domain"));

        // The dot requirement applies to the scheme-stripped form
        assert!(request("https://nodot").normalized().is_err());
    }

    #[test]
    fn empty_ids_rejected() {
        let mut req = request("example.com");
        req.lead_id = "  ".into();
        assert!(req.normalized().is_err());

        let mut req = request("example.com");
        req.context_id = String::new();
        assert!(req.normalized().is_err());
    }

    #[test]
    fn snapshot_validity_rules() {
        let valid = IntelligenceSnapshot {
            page_text: "We sell widgets".into(),
            headlines: vec!["Widgets Inc raises round".into()],
            fetch_error: None,
        };
        assert!(valid.is_valid());

        // Headline failures never invalidate the snapshot
        let news_failed = IntelligenceSnapshot {
            page_text: "We sell widgets".into(),
            headlines: vec!["Error fetching news: timeout".into()],
            fetch_error: None,
        };
        assert!(news_failed.is_valid());

        let no_text = IntelligenceSnapshot {
            page_text: "   ".into(),
            headlines: vec![],
            fetch_error: None,
        };
        assert!(!no_text.is_valid());

        let failed = IntelligenceSnapshot {
            page_text: String::new(),
            headlines: vec![],
            fetch_error: Some("HTTP 500".into()),
        };
        assert!(!failed.is_valid());
    }

    #[test]
    fn briefing_document_roundtrip() {
        let doc = BriefingDocument {
            company_profile: "Mid-market widget maker".into(),
            key_updates: vec!["Opened new plant".into()],
            lead_angle: "Reduce production downtime".into(),
            conversation_starters: vec!["How do you track outages today?".into()],
            potential_objections: vec![Objection {
                objection: "Too expensive".into(),
                response: "Walk through the ROI model".into(),
            }],
            error: None,
        };

        let json = serde_json::to_string(&doc).expect("serialize");
        // Clean documents omit the error tag entirely
        assert!(!json.contains("\"error\""));

        let parsed: BriefingDocument = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, doc);
    }

    #[test]
    fn lead_record_roundtrip() {
        let record = LeadRecord {
            lead_id: "lead_42".into(),
            display_name: "Unknown Lead".into(),
            company_name: "Unknown Company".into(),
            briefing: "{}".into(),
            status: LeadStatus::BriefingGenerated,
            created_at: Utc::now(),
            last_updated_at: Utc::now(),
        };

        let json = serde_json::to_string_pretty(&record).expect("serialize");
        assert!(json.contains("BriefingGenerated"));
        let parsed: LeadRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.lead_id, "lead_42");
        assert_eq!(parsed.status, LeadStatus::BriefingGenerated);
    }

    #[test]
    fn response_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ResponseStatus::Success).unwrap(),
            "\"success\""
        );
        assert_eq!(
            serde_json::to_string(&ResponseStatus::Error).unwrap(),
            "\"error\""
        );
    }

    #[test]
    fn context_record_pretty_text() {
        let mut map = serde_json::Map::new();
        map.insert("campaign".into(), serde_json::json!("pos_q3"));
        let record = ContextRecord(map);
        let text = record.to_pretty_text();
        assert!(text.contains("campaign"));
        assert!(text.contains("pos_q3"));

        assert_eq!(ContextRecord::empty().to_pretty_text(), "{}");
    }
}
