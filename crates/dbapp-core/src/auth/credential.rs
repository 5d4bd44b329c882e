/// Number of leading characters shown when a token is logged
const PREVIEW_CHARS: usize = 8;

/// A bearer token. Validity is only ever established by a live probe.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }

    /// Header value for `Authorization`.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// A loggable prefix of the token.
    pub fn preview(&self) -> String {
        let prefix: String = self.0.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", prefix)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Credential").field(&self.preview()).finish()
    }
}
