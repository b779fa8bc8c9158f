//! Lead record store with two interchangeable backends.
//!
//! The backend is selected once at startup from configuration; callers see
//! only [`LeadStore::upsert`]. Persistence faults are logged and folded
//! into the boolean result — a failed write never fails the request that
//! produced the briefing.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use tracing::{error, info, warn};

use precall_shared::{
    BriefingDocument, CrmConfig, LeadRecord, LeadStatus, PrecallError, Result, StoreSection,
};

/// User-Agent string for CRM requests.
const USER_AGENT: &str = concat!("precall/", env!("CARGO_PKG_VERSION"));

/// Per-call timeout for CRM updates, in seconds.
const CRM_TIMEOUT_SECS: u64 = 10;

/// Placeholder identity for records created by upsert before the lead is
/// enriched from any other source.
const UNKNOWN_LEAD: &str = "Unknown Lead";
const UNKNOWN_COMPANY: &str = "Unknown Company";

// ---------------------------------------------------------------------------
// LeadStore
// ---------------------------------------------------------------------------

/// The configured lead store backend. Selected once at startup, not
/// re-branched per call.
pub enum LeadStore {
    Local(LocalLeadStore),
    Crm(CrmLeadStore),
}

impl LeadStore {
    /// Select the backend: remote CRM when configured, local file otherwise.
    pub fn from_config(store: &StoreSection, crm: Option<CrmConfig>) -> Result<Self> {
        match crm {
            Some(crm) => {
                info!(instance = %crm.instance_url, "lead store backend: remote CRM");
                Ok(Self::Crm(CrmLeadStore::new(&crm)?))
            }
            None => {
                info!(path = %store.leads_path, "lead store backend: local file");
                Ok(Self::Local(LocalLeadStore::new(&store.leads_path)))
            }
        }
    }

    /// Upsert the briefing against `lead_id`. Returns whether the write
    /// succeeded.
    pub async fn upsert(&self, lead_id: &str, briefing: &BriefingDocument) -> bool {
        match self {
            Self::Local(store) => store.upsert(lead_id, briefing),
            Self::Crm(store) => store.upsert(lead_id, briefing).await,
        }
    }
}

// ---------------------------------------------------------------------------
// LocalLeadStore
// ---------------------------------------------------------------------------

/// Flat JSON file store: read the whole collection, mutate, write it back.
///
/// Not safe under concurrent writers (last-writer-wins); acceptable while
/// the store is single-process. A production replacement needs a write
/// lock or transactional append.
pub struct LocalLeadStore {
    path: PathBuf,
}

impl LocalLeadStore {
    /// Create a store writing to the given JSON file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the full record collection. Absent or corrupt files start empty.
    pub fn read_records(&self) -> Vec<LeadRecord> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            // Absent file: the first upsert creates it
            Err(_) => return Vec::new(),
        };

        match serde_json::from_str(&content) {
            Ok(records) => records,
            Err(e) => {
                warn!(path = ?self.path, error = %e, "lead store unreadable, starting empty");
                Vec::new()
            }
        }
    }

    /// Create-if-absent, else mutate in place, keyed by `lead_id`.
    pub fn upsert(&self, lead_id: &str, briefing: &BriefingDocument) -> bool {
        let briefing_json = match serde_json::to_string(briefing) {
            Ok(json) => json,
            Err(e) => {
                error!(lead_id, error = %e, "briefing serialization failed");
                return false;
            }
        };

        let mut records = self.read_records();
        let now = Utc::now();

        match records.iter_mut().find(|record| record.lead_id == lead_id) {
            Some(record) => {
                record.briefing = briefing_json;
                record.status = LeadStatus::BriefingGenerated;
                record.last_updated_at = now;
                info!(lead_id, "updated existing lead record");
            }
            None => {
                records.push(LeadRecord {
                    lead_id: lead_id.to_string(),
                    display_name: UNKNOWN_LEAD.into(),
                    company_name: UNKNOWN_COMPANY.into(),
                    briefing: briefing_json,
                    status: LeadStatus::BriefingGenerated,
                    created_at: now,
                    last_updated_at: now,
                });
                info!(lead_id, "created new lead record");
            }
        }

        self.write_records(&records)
    }

    fn write_records(&self, records: &[LeadRecord]) -> bool {
        let content = match serde_json::to_string_pretty(records) {
            Ok(content) => content,
            Err(e) => {
                error!(error = %e, "lead collection serialization failed");
                return false;
            }
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    error!(path = ?parent, error = %e, "lead store directory creation failed");
                    return false;
                }
            }
        }

        match std::fs::write(&self.path, content) {
            Ok(()) => {
                info!(total = records.len(), "lead store written");
                true
            }
            Err(e) => {
                error!(path = ?self.path, error = %e, "lead store write failed");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// CrmLeadStore
// ---------------------------------------------------------------------------

/// Remote CRM backend: one authenticated field-update call per upsert
/// against the lead object identified by `lead_id`.
pub struct CrmLeadStore {
    http: Client,
    instance_url: String,
    api_token: String,
}

impl CrmLeadStore {
    /// Create a store for the configured CRM instance.
    pub fn new(config: &CrmConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(CRM_TIMEOUT_SECS))
            .build()
            .map_err(|e| PrecallError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            instance_url: config.instance_url.clone(),
            api_token: config.api_token.clone(),
        })
    }

    /// Update the briefing field on the remote lead. Any remote failure is
    /// caught and reported as `false`.
    pub async fn upsert(&self, lead_id: &str, briefing: &BriefingDocument) -> bool {
        let briefing_json = match serde_json::to_string(briefing) {
            Ok(json) => json,
            Err(e) => {
                error!(lead_id, error = %e, "briefing serialization failed");
                return false;
            }
        };

        let url = format!(
            "{}/services/data/v59.0/sobjects/Lead/{lead_id}",
            self.instance_url
        );

        let result = self
            .http
            .patch(&url)
            .bearer_auth(&self.api_token)
            .json(&serde_json::json!({ "AI_Briefing__c": briefing_json }))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                info!(lead_id, "updated CRM lead record");
                true
            }
            Ok(response) => {
                warn!(lead_id, status = %response.status(), "CRM update rejected");
                false
            }
            Err(e) => {
                warn!(lead_id, error = %e, "CRM update failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use precall_shared::Objection;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("precall-leads-{}-{name}.json", std::process::id()))
    }

    fn briefing() -> BriefingDocument {
        BriefingDocument {
            company_profile: "Widget maker".into(),
            key_updates: vec!["Raised a round".into()],
            lead_angle: "Cut downtime".into(),
            conversation_starters: vec!["How do you track outages?".into()],
            potential_objections: vec![Objection {
                objection: "Budget frozen".into(),
                response: "Offer phased rollout".into(),
            }],
            error: None,
        }
    }

    #[test]
    fn absent_file_creates_fresh_store() {
        let path = temp_path("fresh");
        let _ = std::fs::remove_file(&path);

        let store = LocalLeadStore::new(&path);
        assert!(store.upsert("lead_1", &briefing()));

        let records = store.read_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].lead_id, "lead_1");
        assert_eq!(records[0].display_name, "Unknown Lead");
        assert_eq!(records[0].status, LeadStatus::BriefingGenerated);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn upsert_is_idempotent_per_lead_id() {
        let path = temp_path("idempotent");
        let _ = std::fs::remove_file(&path);

        let store = LocalLeadStore::new(&path);
        assert!(store.upsert("lead_1", &briefing()));

        let first = store.read_records();
        let created_at = first[0].created_at;
        let first_updated = first[0].last_updated_at;

        let mut second_doc = briefing();
        second_doc.lead_angle = "New angle entirely".into();
        assert!(store.upsert("lead_1", &second_doc));

        let records = store.read_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].created_at, created_at);
        assert!(records[0].last_updated_at >= first_updated);
        assert!(records[0].briefing.contains("New angle entirely"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn distinct_lead_ids_append() {
        let path = temp_path("distinct");
        let _ = std::fs::remove_file(&path);

        let store = LocalLeadStore::new(&path);
        assert!(store.upsert("lead_1", &briefing()));
        assert!(store.upsert("lead_2", &briefing()));

        assert_eq!(store.read_records().len(), 2);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn briefing_round_trips_through_record() {
        let path = temp_path("roundtrip");
        let _ = std::fs::remove_file(&path);

        let store = LocalLeadStore::new(&path);
        let doc = briefing();
        assert!(store.upsert("lead_1", &doc));

        let records = store.read_records();
        let parsed: BriefingDocument = serde_json::from_str(&records[0].briefing).unwrap();
        assert_eq!(parsed, doc);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn corrupt_file_starts_empty_and_recovers() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "### not json ###").unwrap();

        let store = LocalLeadStore::new(&path);
        assert!(store.upsert("lead_1", &briefing()));
        assert_eq!(store.read_records().len(), 1);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn crm_success_returns_true() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/services/data/v59.0/sobjects/Lead/lead_7"))
            .and(header("authorization", "Bearer crm-token"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let store = CrmLeadStore::new(&CrmConfig {
            instance_url: server.uri(),
            api_token: "crm-token".into(),
        })
        .unwrap();

        assert!(store.upsert("lead_7", &briefing()).await);
    }

    #[tokio::test]
    async fn crm_rejection_returns_false() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let store = CrmLeadStore::new(&CrmConfig {
            instance_url: server.uri(),
            api_token: "crm-token".into(),
        })
        .unwrap();

        assert!(!store.upsert("lead_7", &briefing()).await);
    }

    #[tokio::test]
    async fn crm_unreachable_returns_false() {
        let store = CrmLeadStore::new(&CrmConfig {
            instance_url: "http://127.0.0.1:1".into(),
            api_token: "crm-token".into(),
        })
        .unwrap();

        assert!(!store.upsert("lead_7", &briefing()).await);
    }
}
