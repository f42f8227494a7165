//! Error taxonomy for the instruction pipeline.
//!
//! Each layer has its own error enum; `PipelineError` is what callers of the
//! orchestrator see. Every variant renders as a message a user can act on.

use crate::excel::errors::Permission;
use crate::llm::provider::Provider;
use thiserror::Error;

/// Failures from an LLM provider call.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("Add {} API key in settings (ask-excel set-key {} <key>)", .0.display_name(), .0.id())]
    CredentialMissing(Provider),

    #[error("{} error: {status}", .provider.display_name())]
    Http { provider: Provider, status: u16 },

    #[error("{} returned a response without any text", .0.display_name())]
    MalformedResponse(Provider),

    #[error("{} request failed: {reason}", .provider.display_name())]
    Request { provider: Provider, reason: String },
}

/// Failures from running a script against Excel, after classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("{}", .0.instructions())]
    PermissionDenied(Permission),

    #[error("Range or cell not found. Check that the sheet has data and ranges exist.")]
    RangeOrCellNotFound,

    #[error("Microsoft Excel is not running. Please open Excel first.")]
    ApplicationUnreachable,

    #[error("AppleScript error: {0}")]
    Unclassified(String),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to write history: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("History lock poisoned")]
    Poisoned,
}

/// Terminal failure classification for one instruction.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    CredentialMissing(AiError),

    #[error("{name} error: {status}", name = .provider.display_name())]
    ProviderHttp { provider: Provider, status: u16 },

    #[error("{0}")]
    MalformedProviderResponse(AiError),

    #[error("{0}")]
    ProviderRequest(AiError),

    #[error("AI did not generate valid AppleScript")]
    InvalidGeneratedScript,

    #[error("Microsoft Excel is not running. Please open Excel first.")]
    ApplicationUnreachable,

    #[error("{}", .0.instructions())]
    PermissionDenied(Permission),

    #[error("Range or cell not found. Check that the sheet has data and ranges exist.")]
    RangeOrCellNotFound,

    #[error("Script reported failure: {0}")]
    ScriptReported(String),

    #[error("AppleScript error: {0}")]
    UnclassifiedExecution(String),
}

impl From<AiError> for PipelineError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::CredentialMissing(_) => Self::CredentialMissing(err),
            AiError::Http { provider, status } => Self::ProviderHttp { provider, status },
            AiError::MalformedResponse(_) => Self::MalformedProviderResponse(err),
            AiError::Request { .. } => Self::ProviderRequest(err),
        }
    }
}

impl From<ExecutionError> for PipelineError {
    fn from(err: ExecutionError) -> Self {
        match err {
            ExecutionError::PermissionDenied(p) => Self::PermissionDenied(p),
            ExecutionError::RangeOrCellNotFound => Self::RangeOrCellNotFound,
            ExecutionError::ApplicationUnreachable => Self::ApplicationUnreachable,
            ExecutionError::Unclassified(msg) => Self::UnclassifiedExecution(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_embeds_status() {
        let err: PipelineError = AiError::Http {
            provider: Provider::OpenAi,
            status: 429,
        }
        .into();
        assert!(matches!(err, PipelineError::ProviderHttp { status: 429, .. }));
        assert_eq!(err.to_string(), "OpenAI error: 429");
    }

    #[test]
    fn missing_credential_names_provider() {
        let err: PipelineError = AiError::CredentialMissing(Provider::Gemini).into();
        assert!(matches!(err, PipelineError::CredentialMissing(_)));
        assert!(err.to_string().contains("Gemini"));
    }

    #[test]
    fn permission_message_names_the_pane() {
        let err: PipelineError = ExecutionError::PermissionDenied(Permission::Accessibility).into();
        assert!(err.to_string().contains("Accessibility"));
    }
}
