pub mod gemini;
pub mod mock;
pub mod models;

pub use gemini::{GeminiClient, GeminiConfig};
pub use mock::{MockGenerator, MockReply, RecordedCall};
pub use models::{find_model, GeminiModelInfo, DEFAULT_ARTICLE_MODEL, DEFAULT_REFINE_MODEL};
