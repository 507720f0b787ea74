//! LLM provider tags.

use std::str::FromStr;

use lantern_core::error::{LanternError, Result};
use serde::{Deserialize, Serialize};

/// The providers the backend can route a chat or summarize call to.
///
/// The tag travels as a lowercase string in the `llm` form field; anything
/// else is rejected client-side before a request goes out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Groq,
    Gemini,
    OpenAi,
}

impl LlmProvider {
    /// All providers, in the order the user is offered them.
    pub const ALL: [LlmProvider; 3] = [LlmProvider::Groq, LlmProvider::Gemini, LlmProvider::OpenAi];

    /// The wire tag sent in the `llm` form field.
    pub fn tag(&self) -> &'static str {
        match self {
            LlmProvider::Groq => "groq",
            LlmProvider::Gemini => "gemini",
            LlmProvider::OpenAi => "openai",
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for LlmProvider {
    type Err = LanternError;

    /// Parses a provider tag.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for anything other than groq, gemini, openai.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "groq" => Ok(LlmProvider::Groq),
            "gemini" => Ok(LlmProvider::Gemini),
            "openai" => Ok(LlmProvider::OpenAi),
            other => Err(LanternError::invalid_input(format!(
                "unknown LLM provider tag '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tags() {
        assert_eq!("groq".parse::<LlmProvider>().unwrap(), LlmProvider::Groq);
        assert_eq!("Gemini".parse::<LlmProvider>().unwrap(), LlmProvider::Gemini);
        assert_eq!(" openai ".parse::<LlmProvider>().unwrap(), LlmProvider::OpenAi);
    }

    #[test]
    fn test_parse_unknown_tag_rejected() {
        let err = "mistral".parse::<LlmProvider>().unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_display_round_trips() {
        for provider in LlmProvider::ALL {
            assert_eq!(provider.to_string().parse::<LlmProvider>().unwrap(), provider);
        }
    }

    #[test]
    fn test_serializes_lowercase() {
        let json = serde_json::to_string(&LlmProvider::OpenAi).unwrap();
        assert_eq!(json, "\"openai\"");
    }
}
