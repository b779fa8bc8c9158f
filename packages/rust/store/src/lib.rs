//! Context lookup and lead record persistence for the precall pipeline.
//!
//! This crate provides:
//! - [`ContextStore`] — read-only lookup of campaign/lead context records
//! - [`LeadStore`] — briefing upserts keyed by lead id, backed by either
//!   a local flat JSON file ([`LocalLeadStore`]) or a remote CRM
//!   ([`CrmLeadStore`]), selected once at startup

pub mod context;
pub mod leads;

pub use context::ContextStore;
pub use leads::{CrmLeadStore, LeadStore, LocalLeadStore};
