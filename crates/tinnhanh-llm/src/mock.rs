use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use tinnhanh_core::errors::ClientError;
use tinnhanh_core::provider::{CompletionOptions, TextGenerator};
use tinnhanh_core::security::CredentialProvider;

/// Pre-programmed replies for deterministic testing without API calls.
#[derive(Clone, Debug)]
pub enum MockReply {
    /// Return this text.
    Text(String),
    /// Fail with this error.
    Error(ClientError),
    /// Wait a duration, then yield the inner reply.
    Delay(Duration, Box<MockReply>),
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Serialize `value` as the reply text.
    pub fn json(value: &serde_json::Value) -> Self {
        Self::Text(value.to_string())
    }

    pub fn delayed(delay: Duration, inner: MockReply) -> Self {
        Self::Delay(delay, Box::new(inner))
    }
}

/// What a call to [`MockGenerator::complete`] received.
#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub prompt: String,
    pub system_instruction: Option<String>,
    pub model: String,
    pub structured: bool,
}

/// Generator that returns scripted replies in order.
///
/// When the script runs out, the fallback reply (if any) is repeated;
/// otherwise the call fails with an upstream error.
pub struct MockGenerator {
    model: String,
    replies: Mutex<VecDeque<MockReply>>,
    fallback: Option<MockReply>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    calls: Mutex<Vec<RecordedCall>>,
    call_count: AtomicUsize,
}

impl MockGenerator {
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            model: "mock-model".to_string(),
            replies: Mutex::new(replies.into()),
            fallback: None,
            credentials: None,
            calls: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Answer every call with `reply`.
    pub fn always(reply: MockReply) -> Self {
        Self::new(Vec::new()).with_fallback(reply)
    }

    #[must_use]
    pub fn with_fallback(mut self, reply: MockReply) -> Self {
        self.fallback = Some(reply);
        self
    }

    /// Fail with [`ClientError::CredentialMissing`] whenever `credentials`
    /// yields no key. Such calls are not recorded.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Number of calls that reached the script.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls.lock().last().cloned()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, ClientError> {
        if let Some(credentials) = &self.credentials {
            if !credentials.is_available() {
                return Err(ClientError::CredentialMissing);
            }
        }

        let idx = self.call_count.fetch_add(1, Ordering::Relaxed);
        self.calls.lock().push(RecordedCall {
            prompt: prompt.to_string(),
            system_instruction: options.system_instruction.clone(),
            model: options.model.clone().unwrap_or_else(|| self.model.clone()),
            structured: options.schema.is_some(),
        });

        let scripted = self.replies.lock().pop_front();
        let Some(mut reply) = scripted.or_else(|| self.fallback.clone()) else {
            return Err(ClientError::transport(format!(
                "MockGenerator: no reply configured for call {idx}"
            )));
        };

        loop {
            match reply {
                MockReply::Text(text) => return Ok(text),
                MockReply::Error(err) => return Err(err),
                MockReply::Delay(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
            }
        }
    }
}
