//! End-to-end briefing pipeline:
//! request → intelligence → context → synthesis → upsert → response.

use std::time::Instant;

use tracing::{info, instrument, warn};

use precall_intel::IntelligenceGatherer;
use precall_shared::{
    AppConfig, BriefingDocument, BriefingRequest, BriefingResponse, CompletionConfig, CrmConfig,
    FetchConfig, NewsConfig, PrecallError, ResponseMetadata, ResponseStatus, Result,
};
use precall_store::{ContextStore, LeadStore};
use precall_synth::BriefingSynthesizer;

/// Orchestrates the briefing pipeline and owns the component lifecycles.
pub struct BriefingPipeline {
    gatherer: IntelligenceGatherer,
    context: ContextStore,
    synthesizer: BriefingSynthesizer,
    leads: LeadStore,
}

impl BriefingPipeline {
    /// Assemble a pipeline from pre-built components. Used by tests to
    /// substitute any component.
    pub fn new(
        gatherer: IntelligenceGatherer,
        context: ContextStore,
        synthesizer: BriefingSynthesizer,
        leads: LeadStore,
    ) -> Self {
        Self {
            gatherer,
            context,
            synthesizer,
            leads,
        }
    }

    /// Composition root: build every component from resolved configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let gatherer =
            IntelligenceGatherer::from_config(&FetchConfig::from(config), &NewsConfig::from(config))?;
        let context = ContextStore::new(&config.store.context_path);
        let synthesizer = BriefingSynthesizer::from_config(&CompletionConfig::from(config))?;
        let leads = LeadStore::from_config(&config.store, CrmConfig::from_app(config))?;

        Ok(Self::new(gatherer, context, synthesizer, leads))
    }

    /// Run the pipeline for one request.
    ///
    /// Only request validation and invalid intelligence surface as `Err`
    /// (the boundary layer maps those to a hard client error). Every other
    /// fault is already folded into values by the components, so the
    /// remaining steps cannot fail: synthesis always yields a usable
    /// document and persistence reports a boolean carried in metadata.
    #[instrument(skip_all, fields(lead_id = %request.lead_id))]
    pub async fn generate(&self, request: &BriefingRequest) -> Result<BriefingResponse> {
        let request = request.normalized()?;
        let start = Instant::now();
        info!(domain = %request.company_domain, "processing briefing request");

        // Intelligence — the only post-validation abort point. Aborting here
        // avoids spending a model call on no signal; nothing is written.
        let snapshot = self.gatherer.gather(&request.company_domain).await;
        if !snapshot.is_valid() {
            let cause = snapshot
                .fetch_error
                .clone()
                .unwrap_or_else(|| "no usable website content".into());
            return Err(PrecallError::Intelligence(format!(
                "failed to gather company intelligence: {cause}"
            )));
        }

        // Context — a miss is logged and carried forward as an empty record.
        let (context, context_error) = self.context.lookup(&request.context_id);
        if let Some(error) = &context_error {
            warn!(error = %error, "context lookup degraded, continuing with empty context");
        }

        // Synthesis — total by contract, always yields a five-field document.
        let briefing = self.synthesizer.synthesize(&snapshot, &context).await;

        // Persistence — surfaced in metadata, never treated as pipeline failure.
        let record_store_updated = self.leads.upsert(&request.lead_id, &briefing).await;

        let processing_time_seconds = start.elapsed().as_secs_f64();
        info!(
            elapsed_secs = processing_time_seconds,
            degraded = briefing.error.is_some(),
            record_store_updated,
            "briefing request complete"
        );

        Ok(compose_response(
            &request,
            briefing,
            processing_time_seconds,
            record_store_updated,
            context_error.is_none(),
        ))
    }
}

/// Shape the response. A degraded (fallback) briefing keeps the success
/// payload shape but flags the outcome and carries the cause in metadata.
fn compose_response(
    request: &BriefingRequest,
    briefing: BriefingDocument,
    processing_time_seconds: f64,
    record_store_updated: bool,
    context_found: bool,
) -> BriefingResponse {
    let (status, message, error) = match &briefing.error {
        Some(cause) => (
            ResponseStatus::Error,
            format!(
                "Briefing generation encountered issues for lead {}",
                request.lead_id
            ),
            Some(cause.clone()),
        ),
        None => (
            ResponseStatus::Success,
            format!("Successfully generated briefing for lead {}", request.lead_id),
            None,
        ),
    };

    BriefingResponse {
        status,
        message,
        briefing,
        metadata: ResponseMetadata {
            processing_time_seconds,
            record_store_updated,
            context_found,
            intelligence_valid: true,
            error,
        },
    }
}
