//! Settings — provider selection and credentials.
//!
//! Built once at startup and handed to the AI client and pipeline; nothing
//! downstream reads the environment.
//!
//! Sources, lowest priority first:
//! 1. `<config_dir>/ask-excel/config.json`
//! 2. Environment (`LLM_PROVIDER`, `OPENAI_API_KEY`, `GEMINI_API_KEY`,
//!    `ANTHROPIC_API_KEY`, `OLLAMA_HOST`, `OLLAMA_MODEL`), including any
//!    `.env.local` / `.env` loaded by `load_dotenv`
//! 3. OS keychain, only for keys still missing

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::SettingsError;
use crate::llm::{Provider, OLLAMA_DEFAULT_HOST, OLLAMA_DEFAULT_MODEL};

pub const APP_DIR: &str = "ask-excel";
pub const KEYRING_SERVICE: &str = "ask-excel";
const CONFIG_FILE: &str = "config.json";

/// Order used when no provider is chosen explicitly.
const AUTO_DETECT_ORDER: [Provider; 3] = [Provider::Claude, Provider::OpenAi, Provider::Gemini];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub provider: Provider,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub claude_api_key: Option<String>,
    pub ollama_host: String,
    pub ollama_model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: Provider::Claude,
            openai_api_key: None,
            gemini_api_key: None,
            claude_api_key: None,
            ollama_host: OLLAMA_DEFAULT_HOST.to_string(),
            ollama_model: OLLAMA_DEFAULT_MODEL.to_string(),
        }
    }
}

/// On-disk shape of `config.json`. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    pub ai_provider: Option<Provider>,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub claude_api_key: Option<String>,
    pub ollama_host: Option<String>,
    pub ollama_model: Option<String>,
}

impl ConfigFile {
    /// Missing file reads as empty; a malformed one is an error.
    pub fn read(path: &Path) -> Result<Self, SettingsError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| SettingsError::Parse {
                path: path.display().to_string(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(SettingsError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}

/// Default config file location.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(CONFIG_FILE)
}

/// Load `.env.local`, else `.env`, from the working directory.
pub fn load_dotenv() {
    for env_file in [".env.local", ".env"] {
        let path = Path::new(env_file);
        if path.exists() {
            match dotenvy::from_path(path) {
                Ok(_) => log::info!("[SETTINGS] Loaded {}", path.display()),
                Err(e) => log::warn!("[SETTINGS] Failed to load {}: {}", path.display(), e),
            }
            break;
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Settings {
    /// Resolve settings from config file, environment and keychain.
    pub fn load() -> Result<Self, SettingsError> {
        let file = ConfigFile::read(&config_path())?;
        let explicit = file.ai_provider.is_some()
            || std::env::var("LLM_PROVIDER").is_ok_and(|p| !p.trim().is_empty());
        let mut settings = Self::resolve(file, |name| std::env::var(name).ok())?;
        settings.fill_from_keychain();
        if !explicit {
            // Keychain keys can change which provider auto-detection picks.
            settings.provider = settings.detect_provider();
        }
        log::info!("[SETTINGS] Active provider: {}", settings.provider);
        Ok(settings)
    }

    /// Merge a config file with environment lookups.
    ///
    /// `env` is injected so resolution can be tested without touching the
    /// process environment.
    pub fn resolve(
        file: ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SettingsError> {
        let defaults = Self::default();
        let mut settings = Self {
            provider: defaults.provider,
            openai_api_key: non_empty(env("OPENAI_API_KEY")).or(non_empty(file.openai_api_key)),
            gemini_api_key: non_empty(env("GEMINI_API_KEY")).or(non_empty(file.gemini_api_key)),
            claude_api_key: non_empty(env("ANTHROPIC_API_KEY")).or(non_empty(file.claude_api_key)),
            ollama_host: non_empty(env("OLLAMA_HOST"))
                .or(non_empty(file.ollama_host))
                .unwrap_or(defaults.ollama_host),
            ollama_model: non_empty(env("OLLAMA_MODEL"))
                .or(non_empty(file.ollama_model))
                .unwrap_or(defaults.ollama_model),
        };

        let explicit = match non_empty(env("LLM_PROVIDER")) {
            Some(p) => Some(p.parse::<Provider>()?),
            None => file.ai_provider,
        };
        settings.provider = match explicit {
            Some(p) => {
                log::info!("[SETTINGS] Provider override: {}", p);
                p
            }
            None => settings.detect_provider(),
        };
        Ok(settings)
    }

    /// First provider with a key wins; Claude otherwise.
    fn detect_provider(&self) -> Provider {
        AUTO_DETECT_ORDER
            .into_iter()
            .find(|p| self.api_key(*p).is_some())
            .unwrap_or(Provider::Claude)
    }

    pub fn api_key(&self, provider: Provider) -> Option<&str> {
        let key = match provider {
            Provider::OpenAi => self.openai_api_key.as_deref(),
            Provider::Gemini => self.gemini_api_key.as_deref(),
            Provider::Claude => self.claude_api_key.as_deref(),
            Provider::Ollama => None,
        };
        key.filter(|k| !k.trim().is_empty())
    }

    fn api_key_slot(&mut self, provider: Provider) -> Option<&mut Option<String>> {
        match provider {
            Provider::OpenAi => Some(&mut self.openai_api_key),
            Provider::Gemini => Some(&mut self.gemini_api_key),
            Provider::Claude => Some(&mut self.claude_api_key),
            Provider::Ollama => None,
        }
    }

    /// True when the provider can be called: it has a key or needs none.
    pub fn is_configured(&self, provider: Provider) -> bool {
        !provider.requires_key() || self.api_key(provider).is_some()
    }

    /// Fill missing keys from the OS keychain. Keychain errors are ignored.
    fn fill_from_keychain(&mut self) {
        for provider in Provider::ALL.into_iter().filter(|p| p.requires_key()) {
            let Some(slot) = self.api_key_slot(provider) else {
                continue;
            };
            if slot.as_deref().is_some_and(|k| !k.trim().is_empty()) {
                continue;
            }
            if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, provider.id()) {
                if let Ok(key) = entry.get_password() {
                    if !key.is_empty() {
                        log::info!("[SETTINGS] Loaded {} key from OS keychain", provider);
                        *slot = Some(key);
                    }
                }
            }
        }
    }
}

/// Save an API key to the OS keychain.
pub fn save_api_key(provider: Provider, api_key: &str) -> Result<(), SettingsError> {
    if !provider.requires_key() {
        log::info!("[SETTINGS] {} does not use an API key", provider);
        return Ok(());
    }
    let entry = keyring::Entry::new(KEYRING_SERVICE, provider.id())?;
    entry.set_password(api_key)?;
    log::info!(
        "[SETTINGS] API key saved for {} ({} chars)",
        provider,
        api_key.len()
    );
    Ok(())
}
