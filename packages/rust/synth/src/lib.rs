//! Briefing synthesis under a strict output contract.
//!
//! Turns an intelligence snapshot plus a context record into a
//! [`BriefingDocument`] via one JSON-mode completion call, with a bounded
//! retry on contract violations and a deterministic fallback document on
//! every other failure. From the orchestrator's point of view synthesis is
//! total: it always yields a usable five-field document.

pub mod client;
mod coerce;

pub use client::CompletionClient;

use tracing::{error, info, instrument, warn};

use precall_shared::{
    BriefingDocument, CompletionConfig, ContextRecord, IntelligenceSnapshot, Objection, Result,
};

/// Attempts per synthesis: one call plus one retry on a contract violation.
const MAX_ATTEMPTS: usize = 2;

/// Error tag for the missing-credential path, distinguishable from
/// transport faults.
pub const NOT_CONFIGURED: &str = "completion backend not configured";

/// System instruction: names the five required fields, mandates a bare JSON
/// object reply, and states the sales-preparation use case.
const SYSTEM_PROMPT: &str = r#"You are an expert B2B sales intelligence assistant. Generate concise pre-call briefings that help sales representatives prepare for prospect conversations.

CRITICAL: Your response MUST be a single valid JSON object. Do not include any markdown, explanations, or text outside the JSON structure.

Required JSON structure:
{
    "company_profile": "String - Concise business overview, industry, and key characteristics",
    "key_updates": ["Array of strings - Recent developments, news, or changes"],
    "lead_angle": "String - Specific value proposition based on lead context",
    "conversation_starters": [
        "String - Question 1",
        "String - Question 2",
        "String - Question 3"
    ],
    "potential_objections": [
        {
            "objection": "String - Common objection",
            "response": "String - How to handle it"
        }
    ]
}

Focus on actionable insights that enable more effective prospect conversations.
Be specific, professional, and sales-oriented in your analysis.
Ensure all JSON strings are properly escaped and the response is valid JSON."#;

// ---------------------------------------------------------------------------
// BriefingSynthesizer
// ---------------------------------------------------------------------------

/// Synthesizes briefing documents through the completion backend.
pub struct BriefingSynthesizer {
    client: Option<CompletionClient>,
}

impl BriefingSynthesizer {
    /// Assemble a synthesizer from a pre-built client (or `None` for the
    /// unconfigured path).
    pub fn new(client: Option<CompletionClient>) -> Self {
        Self { client }
    }

    /// Build the synthesizer from runtime config. With no resolved API key
    /// the synthesizer skips network calls entirely.
    pub fn from_config(config: &CompletionConfig) -> Result<Self> {
        Ok(Self::new(CompletionClient::from_config(config)?))
    }

    /// Turn a snapshot + context into a briefing document.
    ///
    /// Contract violations in the reply are retried once; invocation errors
    /// (network, auth, quota) and retry exhaustion yield the deterministic
    /// fallback document with `error` set to the cause. A raw error never
    /// escapes this method.
    #[instrument(skip_all)]
    pub async fn synthesize(
        &self,
        snapshot: &IntelligenceSnapshot,
        context: &ContextRecord,
    ) -> BriefingDocument {
        let Some(client) = &self.client else {
            warn!("completion backend not configured, returning fallback briefing");
            return fallback_document(NOT_CONFIGURED);
        };

        let user_prompt = build_user_prompt(snapshot, context);
        let mut last_error = String::new();

        for attempt in 1..=MAX_ATTEMPTS {
            let raw = match client.complete(SYSTEM_PROMPT, &user_prompt).await {
                Ok(raw) => raw,
                Err(e) => {
                    error!(attempt, error = %e, "completion call failed");
                    return fallback_document(&e.to_string());
                }
            };

            match coerce::decode_document(&raw) {
                Ok(doc) => {
                    info!(attempt, "briefing synthesized");
                    return doc;
                }
                Err(e) => {
                    warn!(attempt, error = %e, "model reply violated the output contract");
                    last_error = e.to_string();
                }
            }
        }

        error!(error = %last_error, "synthesis attempts exhausted, returning fallback briefing");
        fallback_document(&last_error)
    }
}

/// Build the user message embedding page text, bulleted headlines, and the
/// context record as readable key-value text.
fn build_user_prompt(snapshot: &IntelligenceSnapshot, context: &ContextRecord) -> String {
    let news_block = snapshot
        .headlines
        .iter()
        .map(|headline| format!("- {headline}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Generate a pre-call briefing based on this information:\n\n\
         COMPANY WEBSITE CONTENT:\n{}\n\n\
         RECENT NEWS & UPDATES:\n{}\n\n\
         LEAD CONTEXT & CAMPAIGN DATA:\n{}\n\n\
         Provide a comprehensive JSON briefing for the sales representative.",
        snapshot.page_text,
        news_block,
        context.to_pretty_text(),
    )
}

/// The deterministic fallback document: generic but plausible content in
/// all five fields, with `error` set to the underlying cause.
pub fn fallback_document(cause: &str) -> BriefingDocument {
    BriefingDocument {
        company_profile: "Unable to generate a full briefing due to technical issues. \
                          Manual research recommended for this lead."
            .into(),
        key_updates: vec![
            "Briefing generation encountered technical difficulties".into(),
            "Manual lead research advised".into(),
        ],
        lead_angle: "Proceed with standard qualification approach while technical issues \
                     are resolved"
            .into(),
        conversation_starters: vec![
            "Tell me about your current business challenges".into(),
            "What solutions are you currently evaluating?".into(),
            "What's your timeline for implementing new solutions?".into(),
        ],
        potential_objections: vec![
            Objection {
                objection: "Not interested in demos right now".into(),
                response: "I understand timing is important. Can we schedule a brief \
                           10-minute call to understand your needs better?"
                    .into(),
            },
            Objection {
                objection: "We're happy with our current solution".into(),
                response: "That's great to hear. I'd love to learn what's working well \
                           and see if we can add additional value."
                    .into(),
            },
        ],
        error: Some(cause.to_string()),
    }
}
