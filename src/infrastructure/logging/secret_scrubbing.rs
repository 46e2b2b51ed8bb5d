use regex::Regex;
use std::fmt;

/// Redacts credentials from text shown to users or written to logs
///
/// Remote error bodies are echoed verbatim in [`ApiError`](crate::domain::ApiError)
/// messages, and some deployments reflect request headers back, so anything
/// printed from an error goes through here first.
#[derive(Clone)]
pub struct SecretScrubber {
    token_pattern: Regex,
    bearer_pattern: Regex,
    password_pattern: Regex,
    known_secrets: Vec<String>,
}

impl SecretScrubber {
    /// Create a scrubber with the generic credential patterns
    pub fn new() -> Self {
        Self {
            // Match generic tokens
            token_pattern: Regex::new(
                r#"["']?(?:auth_token|api_key|apikey|token|secret)["']?\s*[:=]\s*["']?([a-zA-Z0-9_.-]{20,})["']?"#,
            )
            .expect("token pattern is a valid regex"),
            // Match Bearer tokens in Authorization headers
            bearer_pattern: Regex::new(r"Bearer\s+[a-zA-Z0-9_.~+/-]+=*")
                .expect("bearer pattern is a valid regex"),
            password_pattern: Regex::new(r#"["']?password["']?\s*[:=]\s*["']?([^"'\s,}]+)["']?"#)
                .expect("password pattern is a valid regex"),
            known_secrets: Vec::new(),
        }
    }

    /// Also redact every literal occurrence of `secret`
    #[must_use]
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        if !secret.is_empty() {
            self.known_secrets.push(secret);
        }
        self
    }

    /// Scrub a message of sensitive data
    pub fn scrub(&self, message: &str) -> String {
        let mut scrubbed = message.to_string();
        for secret in &self.known_secrets {
            scrubbed = scrubbed.replace(secret.as_str(), "[REDACTED]");
        }
        scrubbed = self
            .bearer_pattern
            .replace_all(&scrubbed, "Bearer [TOKEN_REDACTED]")
            .to_string();
        scrubbed = self
            .token_pattern
            .replace_all(&scrubbed, |caps: &regex::Captures| {
                let full_match = &caps[0];
                if let Some(colon_pos) = full_match.find(':') {
                    format!("{}:[REDACTED]", &full_match[..colon_pos])
                } else if let Some(eq_pos) = full_match.find('=') {
                    format!("{}=[REDACTED]", &full_match[..eq_pos])
                } else {
                    "[REDACTED]".to_string()
                }
            })
            .to_string();
        self.password_pattern
            .replace_all(&scrubbed, "password=[REDACTED]")
            .to_string()
    }
}

impl Default for SecretScrubber {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SecretScrubber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretScrubber")
            .field("known_secrets", &self.known_secrets.len())
            .finish()
    }
}
