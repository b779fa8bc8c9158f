//! Output-contract enforcement for model replies.
//!
//! Strict schema decode first; on mismatch, field-by-field best-effort
//! coercion with documented fallback values. A required field that is
//! absent (or null) cannot be coerced — that is a contract violation the
//! caller may retry. Silently malformed data never passes this boundary.

use serde_json::Value;

use precall_shared::{BriefingDocument, Objection, PrecallError, Result};

/// Default handling text when the model returns a bare objection string.
const DEFAULT_OBJECTION_RESPONSE: &str = "Address this concern";

/// The five required document fields.
const REQUIRED_FIELDS: [&str; 5] = [
    "company_profile",
    "key_updates",
    "lead_angle",
    "conversation_starters",
    "potential_objections",
];

/// Decode a raw model reply into a briefing document.
pub(crate) fn decode_document(raw: &str) -> Result<BriefingDocument> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| PrecallError::parse(format!("model reply is not valid JSON: {e}")))?;

    // Strict decode first — a well-behaved reply needs no coercion.
    if let Ok(mut doc) = serde_json::from_value::<BriefingDocument>(value.clone()) {
        // The error tag is ours to set, never the model's.
        doc.error = None;
        return Ok(doc);
    }

    coerce_document(value)
}

/// Best-effort reshape of a structurally valid but mistyped reply.
fn coerce_document(value: Value) -> Result<BriefingDocument> {
    let Value::Object(map) = value else {
        return Err(PrecallError::parse("model reply is not a JSON object"));
    };

    for field in REQUIRED_FIELDS {
        match map.get(field) {
            None | Some(Value::Null) => {
                return Err(PrecallError::parse(format!(
                    "model reply missing required field `{field}`"
                )));
            }
            Some(_) => {}
        }
    }

    Ok(BriefingDocument {
        company_profile: coerce_text(&map["company_profile"]),
        key_updates: coerce_text_list(&map["key_updates"]),
        lead_angle: coerce_text(&map["lead_angle"]),
        conversation_starters: coerce_text_list(&map["conversation_starters"]),
        potential_objections: coerce_objections(&map["potential_objections"]),
        error: None,
    })
}

/// Coerce any value to text. Structured values (e.g. a profile object)
/// are flattened to their JSON rendering.
fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Coerce a value to a list of strings, wrapping scalars as a
/// single-element list.
fn coerce_text_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(coerce_text).collect(),
        other => vec![coerce_text(other)],
    }
}

/// Coerce a value to objection pairs. Bare strings become a pair with the
/// generic default response.
fn coerce_objections(value: &Value) -> Vec<Objection> {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Object(entry) if entry.contains_key("objection") => Objection {
                objection: coerce_text(&entry["objection"]),
                response: entry
                    .get("response")
                    .map(coerce_text)
                    .unwrap_or_else(|| DEFAULT_OBJECTION_RESPONSE.to_string()),
            },
            other => Objection {
                objection: coerce_text(other),
                response: DEFAULT_OBJECTION_RESPONSE.to_string(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn well_formed_reply() -> String {
        serde_json::json!({
            "company_profile": "Regional POS provider",
            "key_updates": ["Launched loyalty module"],
            "lead_angle": "Reduce checkout queues",
            "conversation_starters": ["How long are peak-hour queues today?"],
            "potential_objections": [
                {"objection": "Already using a POS", "response": "Compare switching costs"}
            ]
        })
        .to_string()
    }

    #[test]
    fn strict_decode_passes_through() {
        let doc = decode_document(&well_formed_reply()).expect("decode");
        assert_eq!(doc.company_profile, "Regional POS provider");
        assert_eq!(doc.potential_objections[0].objection, "Already using a POS");
        assert!(doc.error.is_none());
    }

    #[test]
    fn model_supplied_error_tag_is_discarded() {
        let mut value: serde_json::Value =
            serde_json::from_str(&well_formed_reply()).unwrap();
        value["error"] = serde_json::json!("model should not set this");
        let doc = decode_document(&value.to_string()).expect("decode");
        assert!(doc.error.is_none());
    }

    #[test]
    fn scalar_in_sequence_slot_is_wrapped() {
        let reply = serde_json::json!({
            "company_profile": "Acme",
            "key_updates": "Single update as a string",
            "lead_angle": "Angle",
            "conversation_starters": ["Q1"],
            "potential_objections": []
        })
        .to_string();

        let doc = decode_document(&reply).expect("decode");
        assert_eq!(doc.key_updates, vec!["Single update as a string".to_string()]);
    }

    #[test]
    fn bare_objection_strings_are_reshaped() {
        let reply = serde_json::json!({
            "company_profile": "Acme",
            "key_updates": [],
            "lead_angle": "Angle",
            "conversation_starters": ["Q1"],
            "potential_objections": ["Too expensive", {"objection": "No time"}]
        })
        .to_string();

        let doc = decode_document(&reply).expect("decode");
        assert_eq!(doc.potential_objections.len(), 2);
        assert_eq!(doc.potential_objections[0].objection, "Too expensive");
        assert_eq!(doc.potential_objections[0].response, DEFAULT_OBJECTION_RESPONSE);
        assert_eq!(doc.potential_objections[1].objection, "No time");
        assert_eq!(doc.potential_objections[1].response, DEFAULT_OBJECTION_RESPONSE);
    }

    #[test]
    fn single_objection_string_becomes_one_pair() {
        let reply = serde_json::json!({
            "company_profile": "Acme",
            "key_updates": [],
            "lead_angle": "Angle",
            "conversation_starters": ["Q1"],
            "potential_objections": "We are under contract"
        })
        .to_string();

        let doc = decode_document(&reply).expect("decode");
        assert_eq!(doc.potential_objections.len(), 1);
        assert_eq!(doc.potential_objections[0].objection, "We are under contract");
    }

    #[test]
    fn structured_profile_is_flattened_to_text() {
        let reply = serde_json::json!({
            "company_profile": {"industry": "retail", "size": "mid-market"},
            "key_updates": ["U1"],
            "lead_angle": "Angle",
            "conversation_starters": ["Q1"],
            "potential_objections": []
        })
        .to_string();

        let doc = decode_document(&reply).expect("decode");
        assert!(doc.company_profile.contains("retail"));
        assert!(doc.company_profile.contains("mid-market"));
    }

    #[test]
    fn missing_field_is_contract_violation() {
        let reply = serde_json::json!({
            "company_profile": "Acme",
            "key_updates": [],
            "lead_angle": "Angle",
            "conversation_starters": ["Q1"]
        })
        .to_string();

        let err = decode_document(&reply).unwrap_err();
        assert!(err.to_string().contains("potential_objections"));
    }

    #[test]
    fn null_field_is_contract_violation() {
        let reply = serde_json::json!({
            "company_profile": null,
            "key_updates": [],
            "lead_angle": "Angle",
            "conversation_starters": ["Q1"],
            "potential_objections": []
        })
        .to_string();

        assert!(decode_document(&reply).is_err());
    }

    #[test]
    fn non_object_reply_rejected() {
        assert!(decode_document("not json at all").is_err());
        assert!(decode_document("[1, 2, 3]").is_err());
        assert!(decode_document("\"just a string\"").is_err());
    }
}
