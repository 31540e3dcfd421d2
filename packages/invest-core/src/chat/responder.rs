//! Query responders and the factory that picks one.

use super::huggingface::HuggingFaceResponder;
use super::openai::OpenAiResponder;
use super::tools::PortfolioTools;
use crate::config::non_blank;
use std::fmt;
use std::time::Duration;
use tokio::runtime::Runtime;

/// Reply of the stub responder when no agent is configured.
pub const UNAVAILABLE_MESSAGE: &str = "Chat agent unavailable or failed to initialize. \
     Ensure OPENAI_API_KEY or HUGGINGFACEHUB_API_TOKEN is set and valid.";

const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_HF_MODEL: &str = "meta-llama/Llama-3.1-8B-Instruct";

/// Upper bound on one answer, tool rounds included.
pub(crate) const RESPONSE_TIMEOUT: Duration = Duration::from_secs(120);

/// Failures at the responder boundary.
#[derive(Debug, thiserror::Error)]
pub enum ResponderError {
    #[error("Missing credentials: {0} is not set")]
    MissingCredentials(String),

    #[error("Failed to initialize responder: {0}")]
    Init(String),

    #[error("Agent request failed: {0}")]
    Agent(String),

    #[error("No answer within {} s", .0.as_secs())]
    Timeout(Duration),
}

/// Wrap an agent failure. Provider errors can carry full URLs; query
/// strings are kept out of logs.
pub(crate) fn agent_error(e: impl fmt::Display) -> ResponderError {
    let msg = e.to_string();
    let sanitized = match msg.find('?') {
        Some(idx) => format!("{}?<query redacted>", &msg[..idx]),
        None => msg,
    };
    ResponderError::Agent(sanitized)
}

/// Anything that answers a free-text question with free text.
pub trait QueryResponder {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    fn respond(&self, query: &str) -> Result<String, ResponderError>;
}

/// Answers every query with [`UNAVAILABLE_MESSAGE`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StubResponder;

impl QueryResponder for StubResponder {
    fn name(&self) -> &str {
        "stub"
    }

    fn respond(&self, _query: &str) -> Result<String, ResponderError> {
        Ok(UNAVAILABLE_MESSAGE.to_string())
    }
}

/// Which responder a configuration selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponderKind {
    OpenAi,
    HuggingFace,
    Stub,
}

impl fmt::Display for ResponderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResponderKind::OpenAi => "openai",
            ResponderKind::HuggingFace => "huggingface",
            ResponderKind::Stub => "stub",
        })
    }
}

/// Credentials and endpoints available to the responder factory.
#[derive(Clone)]
pub struct ResponderConfig {
    pub openai_api_key: Option<String>,
    /// Overrides the provider's default endpoint.
    pub openai_base_url: Option<String>,
    pub openai_model: String,
    pub huggingface_token: Option<String>,
    pub huggingface_base_url: Option<String>,
    pub huggingface_model: String,
}

impl ResponderConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| non_blank(lookup(key));
        let defaults = Self::default();

        Self {
            openai_api_key: var("OPENAI_API_KEY"),
            openai_base_url: var("OPENAI_BASE_URL"),
            openai_model: var("INVEST_OPENAI_MODEL").unwrap_or(defaults.openai_model),
            huggingface_token: var("HUGGINGFACEHUB_API_TOKEN"),
            huggingface_base_url: var("INVEST_HF_BASE_URL"),
            huggingface_model: var("INVEST_HF_MODEL").unwrap_or(defaults.huggingface_model),
        }
    }

    /// OpenAI wins over Hugging Face; with neither credential the stub is used.
    pub fn kind(&self) -> ResponderKind {
        if self.openai_api_key.is_some() {
            ResponderKind::OpenAi
        } else if self.huggingface_token.is_some() {
            ResponderKind::HuggingFace
        } else {
            ResponderKind::Stub
        }
    }
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: None,
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            huggingface_token: None,
            huggingface_base_url: None,
            huggingface_model: DEFAULT_HF_MODEL.to_string(),
        }
    }
}

impl fmt::Debug for ResponderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |secret: &Option<String>| secret.as_ref().map(|_| "<redacted>");
        f.debug_struct("ResponderConfig")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("huggingface_token", &redact(&self.huggingface_token))
            .field("huggingface_base_url", &self.huggingface_base_url)
            .field("huggingface_model", &self.huggingface_model)
            .finish()
    }
}

/// Build the responder selected by `config`.
///
/// Construction failures are returned to the caller; nothing is swapped
/// behind its back. Callers that want chat to keep working can fall back to
/// [`StubResponder`] themselves.
pub fn build_responder(
    config: &ResponderConfig,
    tools: PortfolioTools,
) -> Result<Box<dyn QueryResponder>, ResponderError> {
    let responder: Box<dyn QueryResponder> = match config.kind() {
        ResponderKind::OpenAi => Box::new(OpenAiResponder::new(config, tools)?),
        ResponderKind::HuggingFace => Box::new(HuggingFaceResponder::new(config, tools)?),
        ResponderKind::Stub => Box::new(StubResponder),
    };
    tracing::debug!(responder = responder.name(), "query responder ready");
    Ok(responder)
}

/// Current-thread runtime the agents are driven on.
pub(crate) fn agent_runtime() -> Result<Runtime, ResponderError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ResponderError::Init(format!("Failed to create runtime: {e}")))
}
