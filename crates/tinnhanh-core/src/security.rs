use secrecy::SecretString;

/// Wraps an API key with secrecy protection (zeroized on drop, redacted in Debug).
#[derive(Clone)]
pub struct ApiKey(pub SecretString);

impl ApiKey {
    /// Build a key from raw input, trimming whitespace. Blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(SecretString::from(trimmed.to_owned())))
        }
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// Supplies the access token for the generative backend.
///
/// The pipelines only ever ask whether a token exists and fetch it; where it
/// is stored is the implementor's business.
pub trait CredentialProvider: Send + Sync {
    fn get(&self) -> Option<ApiKey>;

    fn is_available(&self) -> bool {
        self.get().is_some()
    }
}

/// A fixed, explicitly supplied key.
#[derive(Clone, Debug)]
pub struct StaticCredentials(Option<ApiKey>);

impl StaticCredentials {
    pub fn new(raw: &str) -> Self {
        Self(ApiKey::parse(raw))
    }
}

impl CredentialProvider for StaticCredentials {
    fn get(&self) -> Option<ApiKey> {
        self.0.clone()
    }
}

/// Never yields a key.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn get(&self) -> Option<ApiKey> {
        None
    }
}

/// Reads the key from the environment on every call, so a key exported
/// after startup is picked up.
///
/// Lookup order: [`env_vars::GEMINI_API_KEY`], then [`env_vars::API_KEY`].
/// Blank values are skipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvCredentials;

impl CredentialProvider for EnvCredentials {
    fn get(&self) -> Option<ApiKey> {
        resolve_from(|name| std::env::var(name).ok())
    }
}

/// First non-blank key among [`env_vars::LOOKUP_ORDER`] according to `lookup`.
pub fn resolve_from(lookup: impl Fn(&str) -> Option<String>) -> Option<ApiKey> {
    env_vars::LOOKUP_ORDER
        .iter()
        .find_map(|name| lookup(name).as_deref().and_then(ApiKey::parse))
}

/// Environment variable names for the Gemini key.
pub mod env_vars {
    pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
    pub const API_KEY: &str = "API_KEY";

    pub const LOOKUP_ORDER: [&str; 2] = [GEMINI_API_KEY, API_KEY];
}
