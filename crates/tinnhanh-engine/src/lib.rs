//! # tinnhanh-engine
//!
//! The drafting pipelines. Dictionary expansion is deterministic and
//! infallible; everything that talks to a [`TextGenerator`] goes through
//! [`refine`], [`generate`] or [`rewrite`], which classify failures into
//! [`DraftError`].
//!
//! [`TextGenerator`]: tinnhanh_core::TextGenerator

#![deny(unsafe_code)]

pub mod dictionary;
pub mod error;
mod payload;
pub mod prompts;
pub mod refine;
pub mod rewrite;
pub mod rewriter;
pub mod session;
pub mod synthesis;
pub mod tokens;

pub use dictionary::{AbbreviationDictionary, SharedDictionary};
pub use error::DraftError;
pub use refine::{refine, refine_with_model, RefineOutcome};
pub use rewrite::{rewrite, rewrite_with_model};
pub use rewriter::{expand, Expansion};
pub use session::{split_editable_text, DraftSession, ModelSelection};
pub use synthesis::{generate, generate_with_model};
pub use tokens::{detect_token_changes, enforce_month_convention, extract_tokens};
