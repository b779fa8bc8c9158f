//! Shared types, error model, and configuration for the precall pipeline.
//!
//! This crate is the foundation depended on by all other precall crates.
//! It provides:
//! - [`PrecallError`] — the unified error type
//! - Domain types ([`BriefingRequest`], [`IntelligenceSnapshot`],
//!   [`BriefingDocument`], [`LeadRecord`], ...)
//! - Configuration ([`AppConfig`], runtime config structs, config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CompletionConfig, CompletionSection, CrmConfig, CrmSection, DefaultsConfig,
    FetchConfig, NewsConfig, NewsSection, StoreSection, config_dir, config_file_path, init_config,
    load_config, load_config_from, resolve_env,
};
pub use error::{PrecallError, Result};
pub use types::{
    BriefingDocument, BriefingRequest, BriefingResponse, ContextRecord, IntelligenceSnapshot,
    LeadRecord, LeadStatus, Objection, ResponseMetadata, ResponseStatus, bare_domain,
};
