use std::fmt;

use thiserror::Error;

/// AI translation providers understood by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Provider {
    #[default]
    Groq,
    Gemini,
    OpenAi,
}

pub const ALL_PROVIDERS: [Provider; 3] = [Provider::Groq, Provider::Gemini, Provider::OpenAi];

const MIN_KEY_LENGTH: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown provider '{value}'")]
pub struct UnknownProvider {
    pub value: String,
}

impl Provider {
    /// Wire name used in requests and in the settings file.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Groq => "Groq",
            Self::Gemini => "Gemini",
            Self::OpenAi => "OpenAI",
        }
    }

    pub fn parse(value: &str) -> Result<Self, UnknownProvider> {
        match value.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAi),
            _ => Err(UnknownProvider {
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pre-flight key format check mirroring the server's own validation. An
/// empty key is acceptable here (it clears the stored key); the server stays
/// authoritative for everything else.
pub fn key_format_issue(provider: Provider, key: &str) -> Option<String> {
    if key.is_empty() {
        return None;
    }

    if key.len() < MIN_KEY_LENGTH {
        return Some(format!(
            "{} keys are at least {MIN_KEY_LENGTH} characters",
            provider.label()
        ));
    }

    match provider {
        Provider::Groq if !key.starts_with("gsk_") => {
            Some("Groq keys start with 'gsk_'".to_string())
        }
        Provider::OpenAi if !key.starts_with("sk-") => {
            Some("OpenAI keys start with 'sk-'".to_string())
        }
        _ => None,
    }
}

/// Shortened form for display, matching what the backend returns from
/// its key listing endpoint.
pub fn mask_key(key: &str) -> String {
    if key.len() < 8 {
        return String::new();
    }
    format!("{}...{}", &key[..4], &key[key.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_wire_names_case_insensitively() {
        assert_eq!(Provider::parse("groq"), Ok(Provider::Groq));
        assert_eq!(Provider::parse("Gemini"), Ok(Provider::Gemini));
        assert_eq!(Provider::parse(" openai "), Ok(Provider::OpenAi));
    }

    #[test]
    fn parse_rejects_unknown_names() {
        let error = Provider::parse("claude").expect_err("should fail");
        assert_eq!(error.value, "claude");
    }

    #[test]
    fn wire_names_round_trip() {
        for provider in ALL_PROVIDERS {
            assert_eq!(Provider::parse(provider.as_str()), Ok(provider));
        }
    }

    #[test]
    fn key_format_allows_empty_key() {
        assert_eq!(key_format_issue(Provider::Groq, ""), None);
    }

    #[test]
    fn key_format_rejects_short_keys() {
        let issue = key_format_issue(Provider::Gemini, "short").expect("issue");
        assert!(issue.contains("at least 20"));
    }

    #[test]
    fn key_format_checks_provider_prefixes() {
        assert!(key_format_issue(Provider::Groq, "gsk_aaaaaaaaaaaaaaaaaaaa").is_none());
        assert!(key_format_issue(Provider::Groq, "sk-aaaaaaaaaaaaaaaaaaaaa").is_some());
        assert!(key_format_issue(Provider::OpenAi, "sk-aaaaaaaaaaaaaaaaaaaaa").is_none());
        assert!(key_format_issue(Provider::OpenAi, "gsk_aaaaaaaaaaaaaaaaaaaa").is_some());
        assert!(key_format_issue(Provider::Gemini, "AIzaSyAaaaaaaaaaaaaaaaaa").is_none());
    }

    #[test]
    fn mask_key_hides_the_middle() {
        assert_eq!(mask_key("gsk_abcdefghijklmnop"), "gsk_...mnop");
        assert_eq!(mask_key("short"), "");
    }
}
