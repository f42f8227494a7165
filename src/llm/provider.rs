//! LLM providers — the closed set of backends that can write AppleScript.
//!
//! The active provider is chosen once from `Settings`; each provider has its
//! own credential field and its own adapter module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SettingsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[serde(rename = "openai")]
    OpenAi,
    Gemini,
    #[serde(alias = "anthropic")]
    Claude,
    Ollama,
}

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::OpenAi,
        Provider::Gemini,
        Provider::Claude,
        Provider::Ollama,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
            Provider::Claude => "claude",
            Provider::Ollama => "ollama",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Gemini => "Gemini",
            Provider::Claude => "Claude",
            Provider::Ollama => "Ollama",
        }
    }

    /// Environment variable holding this provider's key, if it uses one.
    pub fn env_key(self) -> Option<&'static str> {
        match self {
            Provider::OpenAi => Some("OPENAI_API_KEY"),
            Provider::Gemini => Some("GEMINI_API_KEY"),
            Provider::Claude => Some("ANTHROPIC_API_KEY"),
            Provider::Ollama => None,
        }
    }

    pub fn requires_key(self) -> bool {
        self.env_key().is_some()
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Provider {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "gemini" => Ok(Provider::Gemini),
            "claude" | "anthropic" => Ok(Provider::Claude),
            "ollama" | "local" => Ok(Provider::Ollama),
            other => Err(SettingsError::UnknownProvider(other.to_string())),
        }
    }
}

/// Provider metadata for the `providers` listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    #[serde(skip)]
    pub provider: Provider,
    pub id: &'static str,
    pub name: &'static str,
    pub env_key: Option<&'static str>,
    pub model: &'static str,
}

/// All known providers and their display info.
pub fn all_providers() -> Vec<ProviderInfo> {
    vec![
        ProviderInfo {
            provider: Provider::OpenAi,
            id: "openai",
            name: "OpenAI GPT-4o",
            env_key: Provider::OpenAi.env_key(),
            model: super::openai::MODEL,
        },
        ProviderInfo {
            provider: Provider::Gemini,
            id: "gemini",
            name: "Google Gemini Flash",
            env_key: Provider::Gemini.env_key(),
            model: super::gemini::MODEL,
        },
        ProviderInfo {
            provider: Provider::Claude,
            id: "claude",
            name: "Anthropic Claude Sonnet",
            env_key: Provider::Claude.env_key(),
            model: super::anthropic::MODEL,
        },
        ProviderInfo {
            provider: Provider::Ollama,
            id: "ollama",
            name: "Ollama (local, no key)",
            env_key: None,
            model: super::ollama::DEFAULT_MODEL,
        },
    ]
}
