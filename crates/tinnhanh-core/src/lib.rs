//! # tinnhanh-core
//!
//! Shared vocabulary of the drafting assistant:
//! - Article domain types (topics, lengths, configs, generated articles, change records)
//! - Abbreviation entries and their branded identifiers
//! - The [`TextGenerator`](provider::TextGenerator) contract every generative backend implements
//! - Structured-output schema descriptors
//! - Credential handling (`ApiKey`, [`CredentialProvider`](security::CredentialProvider))
//! - The error taxonomy of the generative boundary

#![deny(unsafe_code)]

pub mod article;
pub mod errors;
pub mod ids;
pub mod provider;
pub mod schema;
pub mod security;

pub use article::{
    AbbreviationEntry, ArticleConfig, ChangeRecord, GeneratedArticle, Length, RewriteLength,
    Topic, UnknownVariant,
};
pub use errors::ClientError;
pub use ids::EntryId;
pub use provider::{
    CompletionOptions, TextGenerator, DEFAULT_ARTICLE_MODEL, DEFAULT_REFINE_MODEL,
};
pub use schema::{FieldKind, ResponseSchema, SchemaField};
pub use security::{ApiKey, CredentialProvider, EnvCredentials, NoCredentials, StaticCredentials};
