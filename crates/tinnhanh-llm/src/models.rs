pub use tinnhanh_core::provider::{DEFAULT_ARTICLE_MODEL, DEFAULT_REFINE_MODEL};

/// Static capabilities of a Gemini model.
#[derive(Clone, Debug)]
pub struct GeminiModelInfo {
    pub name: &'static str,
    pub max_output: u32,
}

/// Output cap when a model is not in the registry.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;

pub static GEMINI_3_PRO: GeminiModelInfo = GeminiModelInfo {
    name: "gemini-3-pro-preview",
    max_output: 65_536,
};

pub static GEMINI_3_FLASH: GeminiModelInfo = GeminiModelInfo {
    name: "gemini-3-flash-preview",
    max_output: 65_536,
};

pub static GEMINI_2_5_PRO: GeminiModelInfo = GeminiModelInfo {
    name: "gemini-2.5-pro",
    max_output: 65_536,
};

pub static GEMINI_2_5_FLASH: GeminiModelInfo = GeminiModelInfo {
    name: "gemini-2.5-flash",
    max_output: 65_536,
};

pub static ALL_MODELS: &[&GeminiModelInfo] = &[
    &GEMINI_3_PRO,
    &GEMINI_3_FLASH,
    &GEMINI_2_5_PRO,
    &GEMINI_2_5_FLASH,
];

pub fn find_model(name: &str) -> Option<&'static GeminiModelInfo> {
    ALL_MODELS.iter().find(|m| m.name == name).copied()
}

/// Gemini 3 models only accept `temperature = 1.0`.
pub fn is_gemini_3_model(model: &str) -> bool {
    model.contains("gemini-3")
}

/// Output token cap for `model`.
pub fn max_output_for(model: &str) -> u32 {
    find_model(model).map_or(DEFAULT_MAX_OUTPUT_TOKENS, |m| m.max_output)
}
