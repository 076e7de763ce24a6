/// One throttling rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRule {
    /// Scope name prefixed to every key, such as `public_submit`.
    pub category: String,
    /// Attempts allowed per window.
    pub max_attempts: i32,
    /// Window length in seconds.
    pub window_seconds: i64,
}

impl RateLimitRule {
    /// Creates a rule.
    #[must_use]
    pub fn new(category: impl Into<String>, max_attempts: i32, window_seconds: i64) -> Self {
        Self {
            category: category.into(),
            max_attempts,
            window_seconds,
        }
    }

    /// Default rule for anonymous form submissions: 30 per 10 minutes.
    #[must_use]
    pub fn public_submit() -> Self {
        Self::new("public_submit", 30, 600)
    }
}
