//! Refine pipeline: dictionary expansion, then an AI pass for spelling and
//! time/date formatting, then a report of what changed.

use serde::Serialize;
use tracing::{info, instrument, warn};

use tinnhanh_core::article::ChangeRecord;
use tinnhanh_core::provider::{CompletionOptions, TextGenerator};

use crate::dictionary::AbbreviationDictionary;
use crate::prompts;
use crate::rewriter::expand;
use crate::tokens::detect_token_changes;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RefineOutcome {
    pub text: String,
    /// Dictionary changes first, then time/date token changes.
    pub changes: Vec<ChangeRecord>,
    /// False when the AI pass failed and `text` is only the dictionary output.
    pub ai_applied: bool,
}

/// Refine `raw_text` with the generator's default model.
pub async fn refine(
    generator: &dyn TextGenerator,
    raw_text: &str,
    dictionary: &AbbreviationDictionary,
) -> RefineOutcome {
    refine_with_model(generator, raw_text, dictionary, None).await
}

/// Never fails: if the AI pass errors or returns blank text, the dictionary
/// expansion and its changes are returned with `ai_applied = false`.
#[instrument(skip_all, fields(chars = raw_text.chars().count(), entries = dictionary.len()))]
pub async fn refine_with_model(
    generator: &dyn TextGenerator,
    raw_text: &str,
    dictionary: &AbbreviationDictionary,
    model: Option<&str>,
) -> RefineOutcome {
    let expansion = expand(raw_text, dictionary);

    let options = CompletionOptions::default()
        .with_system_instruction(prompts::refine_instruction())
        .with_model(model);

    let refined = match generator
        .complete(&prompts::refine_prompt(&expansion.text), &options)
        .await
    {
        Ok(text) if !text.trim().is_empty() => text.trim().to_owned(),
        Ok(_) => {
            warn!("refine returned blank text, keeping dictionary output");
            return dictionary_only(expansion.text, expansion.changes);
        }
        Err(e) => {
            warn!(error = %e, kind = e.error_kind(), "refine AI pass failed, keeping dictionary output");
            return dictionary_only(expansion.text, expansion.changes);
        }
    };

    let token_changes = detect_token_changes(&expansion.text, &refined);
    info!(
        dictionary_changes = expansion.changes.len(),
        token_changes = token_changes.len(),
        "brief refined"
    );

    let mut changes = expansion.changes;
    changes.extend(token_changes);
    RefineOutcome {
        text: refined,
        changes,
        ai_applied: true,
    }
}

fn dictionary_only(text: String, changes: Vec<ChangeRecord>) -> RefineOutcome {
    RefineOutcome {
        text,
        changes,
        ai_applied: false,
    }
}
