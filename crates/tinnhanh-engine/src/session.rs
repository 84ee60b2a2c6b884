//! Drafting session: the brief, the refine report and the current article for
//! one journalist, with a busy flag so only one generator call is in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tinnhanh_core::article::{
    ArticleConfig, ChangeRecord, GeneratedArticle, Length, RewriteLength, Topic,
};
use tinnhanh_core::provider::TextGenerator;

use crate::dictionary::SharedDictionary;
use crate::error::DraftError;
use crate::refine::{refine_with_model, RefineOutcome};
use crate::rewrite::rewrite_with_model;
use crate::synthesis::generate_with_model;

/// Per-step model overrides. `None` uses the generator's default model.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSelection {
    pub refine: Option<String>,
    pub article: Option<String>,
}

#[derive(Debug, Default)]
struct DraftState {
    brief: String,
    changes: Vec<ChangeRecord>,
    article: Option<GeneratedArticle>,
}

/// Clears the busy flag when the pipeline call ends, including on drop of
/// an abandoned future.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, DraftError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| DraftError::Busy)?;
        Ok(Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct DraftSession {
    generator: Arc<dyn TextGenerator>,
    dictionary: SharedDictionary,
    models: ModelSelection,
    state: Mutex<DraftState>,
    busy: AtomicBool,
}

impl DraftSession {
    pub fn new(generator: Arc<dyn TextGenerator>, dictionary: SharedDictionary) -> Self {
        Self {
            generator,
            dictionary,
            models: ModelSelection::default(),
            state: Mutex::new(DraftState::default()),
            busy: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_models(mut self, models: ModelSelection) -> Self {
        self.models = models;
        self
    }

    pub fn dictionary(&self) -> &SharedDictionary {
        &self.dictionary
    }

    pub fn models(&self) -> &ModelSelection {
        &self.models
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn set_brief(&self, brief: impl Into<String>) {
        self.state.lock().brief = brief.into();
    }

    pub fn brief(&self) -> String {
        self.state.lock().brief.clone()
    }

    /// Changes reported by the last successful refine.
    pub fn changes(&self) -> Vec<ChangeRecord> {
        self.state.lock().changes.clone()
    }

    pub fn article(&self) -> Option<GeneratedArticle> {
        self.state.lock().article.clone()
    }

    /// Replace the current article. A blank title or content is rejected and
    /// the current article is kept.
    pub fn set_article(&self, article: GeneratedArticle) -> Result<(), DraftError> {
        ensure_non_blank(&article.title, &article.content)?;
        self.state.lock().article = Some(article);
        Ok(())
    }

    /// Refine the current brief in place.
    pub async fn refine_brief(&self) -> Result<RefineOutcome, DraftError> {
        let _busy = BusyGuard::acquire(&self.busy)?;
        let brief = self.non_blank_brief()?;
        let dictionary = self.dictionary.snapshot();

        let outcome = refine_with_model(
            self.generator.as_ref(),
            &brief,
            &dictionary,
            self.models.refine.as_deref(),
        )
        .await;

        let mut state = self.state.lock();
        state.brief.clone_from(&outcome.text);
        state.changes.clone_from(&outcome.changes);
        Ok(outcome)
    }

    /// Write a new article from the current brief. The previous article is
    /// kept if generation fails.
    pub async fn generate_article(
        &self,
        topic: Topic,
        length: Length,
        config: &ArticleConfig,
    ) -> Result<GeneratedArticle, DraftError> {
        let _busy = BusyGuard::acquire(&self.busy)?;
        let brief = self.non_blank_brief()?;

        let article = generate_with_model(
            self.generator.as_ref(),
            topic,
            length,
            &brief,
            config,
            self.models.article.as_deref(),
        )
        .await?;

        self.state.lock().article = Some(article.clone());
        Ok(article)
    }

    /// Rewrite the current article. On failure the current article is left
    /// untouched.
    pub async fn rewrite_article(
        &self,
        target_length: RewriteLength,
        custom_instruction: Option<&str>,
    ) -> Result<GeneratedArticle, DraftError> {
        let _busy = BusyGuard::acquire(&self.busy)?;
        let current = self.article().ok_or(DraftError::NoArticle)?;

        let revised = rewrite_with_model(
            self.generator.as_ref(),
            &current,
            target_length,
            custom_instruction,
            self.models.article.as_deref(),
        )
        .await?;

        self.state.lock().article = Some(revised.clone());
        Ok(revised)
    }

    /// The current article as one editable block: title, a blank line, content.
    pub fn editable_text(&self) -> Option<String> {
        self.state
            .lock()
            .article
            .as_ref()
            .map(|a| format!("{}\n\n{}", a.title, a.content))
    }

    /// Replace title and content from an edited block, keeping the tags.
    /// Fails with [`DraftError::BlankArticle`] if either part is blank.
    pub fn set_editable_text(&self, text: &str) -> Result<(), DraftError> {
        let (title, content) = split_editable_text(text);
        ensure_non_blank(&title, &content)?;
        let mut state = self.state.lock();
        match state.article.as_mut() {
            Some(article) => {
                article.title = title;
                article.content = content;
            }
            None => state.article = Some(GeneratedArticle::new(title, content, Vec::new())),
        }
        Ok(())
    }

    pub fn reset(&self) {
        *self.state.lock() = DraftState::default();
        debug!("draft session reset");
    }

    fn non_blank_brief(&self) -> Result<String, DraftError> {
        let brief = self.brief();
        if brief.trim().is_empty() {
            return Err(DraftError::BlankBrief);
        }
        Ok(brief)
    }
}

fn ensure_non_blank(title: &str, content: &str) -> Result<(), DraftError> {
    if title.trim().is_empty() || content.trim().is_empty() {
        return Err(DraftError::BlankArticle);
    }
    Ok(())
}

/// Split an edited block into `(title, content)` at the first newline.
/// Without a newline the whole text is the title.
pub fn split_editable_text(text: &str) -> (String, String) {
    let text = text.trim();
    match text.split_once('\n') {
        Some((title, content)) => (title.trim().to_owned(), content.trim().to_owned()),
        None => (text.to_owned(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use serde_json::json;
    use tinnhanh_core::errors::ClientError;
    use tinnhanh_llm::{MockGenerator, MockReply};

    use super::*;
    use crate::dictionary::AbbreviationDictionary;

    fn cax_dictionary() -> SharedDictionary {
        let mut d = AbbreviationDictionary::new();
        let _ = d.add("Cax", "Công an xã");
        d.into()
    }

    fn session(generator: &Arc<MockGenerator>) -> DraftSession {
        DraftSession::new(generator.clone(), cax_dictionary())
    }

    fn article_reply(title: &str, content: &str) -> MockReply {
        MockReply::json(&json!({"title": title, "content": content, "tags": ["Vụ việc"]}))
    }

    #[tokio::test]
    async fn refine_replaces_brief_and_records_changes() {
        let generator = Arc::new(MockGenerator::always(MockReply::text(
            "Công an xã tiếp nhận tin báo.",
        )));
        let session = session(&generator);
        session.set_brief("Cax tiếp nhận tin báo");

        let outcome = session.refine_brief().await.unwrap();
        assert!(outcome.ai_applied);
        assert_eq!(session.brief(), "Công an xã tiếp nhận tin báo.");
        assert_eq!(session.changes(), vec![ChangeRecord::new("Cax", "Công an xã")]);
    }

    #[tokio::test]
    async fn refine_sees_dictionary_edits() {
        let generator = Arc::new(MockGenerator::always(MockReply::Error(
            ClientError::transport("offline"),
        )));
        let session = session(&generator);
        let _ = session.dictionary().add("ĐT", "đối tượng");
        session.set_brief("Cax bắt ĐT");

        let outcome = session.refine_brief().await.unwrap();
        assert!(!outcome.ai_applied);
        assert_eq!(outcome.text, "Công an xã bắt đối tượng");
    }

    #[tokio::test]
    async fn blank_brief_is_rejected_without_a_call() {
        let generator = Arc::new(MockGenerator::always(MockReply::text("x")));
        let session = session(&generator);
        session.set_brief("   ");

        assert_eq!(session.refine_brief().await.unwrap_err(), DraftError::BlankBrief);
        assert_eq!(
            session
                .generate_article(Topic::Incident, Length::Short, &ArticleConfig::default())
                .await
                .unwrap_err(),
            DraftError::BlankBrief
        );
        assert_eq!(generator.call_count(), 0);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn generate_uses_article_model() {
        let generator = Arc::new(MockGenerator::new(vec![article_reply("T", "C")]));
        let session = session(&generator).with_models(ModelSelection {
            refine: Some("gemini-3-flash-preview".into()),
            article: Some("gemini-3-pro-preview".into()),
        });
        session.set_brief("Cax tiếp nhận tin báo");

        let article = session
            .generate_article(Topic::Incident, Length::Short, &ArticleConfig::default())
            .await
            .unwrap();
        assert_eq!(session.article(), Some(article));
        assert_eq!(generator.last_call().unwrap().model, "gemini-3-pro-preview");
    }

    #[tokio::test]
    async fn rewrite_without_article_fails() {
        let generator = Arc::new(MockGenerator::always(article_reply("T", "C")));
        let session = session(&generator);
        assert_eq!(
            session
                .rewrite_article(RewriteLength::Shorter, None)
                .await
                .unwrap_err(),
            DraftError::NoArticle
        );
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn failed_rewrite_keeps_article() {
        let generator = Arc::new(MockGenerator::new(vec![MockReply::text("not json")]));
        let session = session(&generator);
        let original = GeneratedArticle::new("Tiêu đề", "Nội dung", vec!["Vụ việc".into()]);
        session.set_article(original.clone()).unwrap();

        assert_matches!(
            session.rewrite_article(RewriteLength::Longer, None).await,
            Err(DraftError::RewriteFailed(_))
        );
        assert_eq!(session.article(), Some(original));
    }

    #[tokio::test]
    async fn edited_text_is_rewritten() {
        let generator = Arc::new(MockGenerator::new(vec![MockReply::json(&json!({
            "title": "Tiêu đề mới", "content": "Nội dung mới"
        }))]));
        let session = session(&generator);
        session
            .set_article(GeneratedArticle::new("Cũ", "Cũ", vec!["Vụ việc".into()]))
            .unwrap();
        session
            .set_editable_text("Tiêu đề sửa\n\nNội dung sửa\nDòng hai")
            .unwrap();

        let revised = session
            .rewrite_article(RewriteLength::Equivalent, Some("giữ giọng văn"))
            .await
            .unwrap();
        let prompt = generator.last_call().unwrap().prompt;
        assert!(prompt.contains("Tiêu đề: Tiêu đề sửa"));
        assert!(prompt.contains("Nội dung sửa\nDòng hai"));
        assert_eq!(revised.tags, vec!["Vụ việc"]);
        assert_eq!(session.editable_text().unwrap(), "Tiêu đề mới\n\nNội dung mới");
    }

    #[tokio::test(start_paused = true)]
    async fn second_call_while_busy_is_rejected() {
        let generator = Arc::new(MockGenerator::new(vec![
            MockReply::delayed(Duration::from_secs(5), article_reply("T", "C")),
            article_reply("T2", "C2"),
        ]));
        let session = session(&generator);
        session.set_brief("Cax tiếp nhận tin báo");
        let config = ArticleConfig::default();

        let (first, second) = tokio::join!(
            session.generate_article(Topic::Incident, Length::Short, &config),
            session.refine_brief(),
        );
        assert_eq!(first.unwrap().title, "T");
        assert_eq!(second.unwrap_err(), DraftError::Busy);
        assert!(!session.is_busy());

        let again = session
            .generate_article(Topic::Incident, Length::Short, &config)
            .await
            .unwrap();
        assert_eq!(again.title, "T2");
    }

    #[tokio::test]
    async fn reset_clears_state() {
        let generator = Arc::new(MockGenerator::always(MockReply::text("x")));
        let session = session(&generator);
        session.set_brief("Cax");
        session.set_article(GeneratedArticle::new("T", "C", vec![])).unwrap();
        session.reset();

        assert_eq!(session.brief(), "");
        assert!(session.changes().is_empty());
        assert!(session.article().is_none());
        assert!(session.editable_text().is_none());
        assert_eq!(session.dictionary().len(), 1);
    }

    #[test]
    fn split_editable_text_cases() {
        assert_eq!(
            split_editable_text("  Tiêu đề \n\n Nội dung\nhai  "),
            ("Tiêu đề".to_string(), "Nội dung\nhai".to_string())
        );
        assert_eq!(
            split_editable_text("Chỉ tiêu đề"),
            ("Chỉ tiêu đề".to_string(), String::new())
        );
        assert_eq!(split_editable_text(""), (String::new(), String::new()));
    }

    #[test]
    fn set_editable_text_without_article_creates_one() {
        let generator = Arc::new(MockGenerator::always(MockReply::text("x")));
        let session = session(&generator);
        session.set_editable_text("T\nC").unwrap();
        assert_eq!(session.article(), Some(GeneratedArticle::new("T", "C", vec![])));
    }

    #[tokio::test]
    async fn blank_article_is_rejected_and_never_rewritten() {
        let generator = Arc::new(MockGenerator::always(article_reply("T", "C")));
        let session = session(&generator);

        for text in ["", "   ", "Chỉ tiêu đề", "\n\nChỉ nội dung"] {
            assert_eq!(session.set_editable_text(text), Err(DraftError::BlankArticle));
        }
        assert_eq!(
            session.set_article(GeneratedArticle::new(" ", "C", vec![])),
            Err(DraftError::BlankArticle)
        );
        assert!(session.article().is_none());
        assert_eq!(
            session
                .rewrite_article(RewriteLength::Shorter, None)
                .await
                .unwrap_err(),
            DraftError::NoArticle
        );
        assert_eq!(generator.call_count(), 0);

        let kept = GeneratedArticle::new("Tiêu đề", "Nội dung", vec!["Vụ việc".into()]);
        session.set_article(kept.clone()).unwrap();
        assert_eq!(session.set_editable_text("Tiêu đề mới\n  "), Err(DraftError::BlankArticle));
        assert_eq!(session.article(), Some(kept));
    }
}
