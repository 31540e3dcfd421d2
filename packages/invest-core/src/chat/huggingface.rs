//! Hugging Face chat model through rig's provider.
//!
//! Hosted open models are not trusted to call tools, so the portfolio facts
//! are computed up front and placed in the preamble.

use super::responder::{
    agent_error, agent_runtime, QueryResponder, ResponderConfig, ResponderError, RESPONSE_TIMEOUT,
};
use super::tools::{tool_text, PortfolioTools, DEFAULT_EXPOSURE_PERIOD, DEFAULT_RETURN_PERIOD};
use reqwest::Client as HttpClient;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::huggingface;
use tokio::runtime::Runtime;

const TEMPERATURE: f64 = 0.7;
const MAX_NEW_TOKENS: u64 = 256;

pub struct HuggingFaceResponder {
    runtime: Runtime,
    client: huggingface::Client<HttpClient>,
    model: String,
    tools: PortfolioTools,
}

impl HuggingFaceResponder {
    pub fn new(config: &ResponderConfig, tools: PortfolioTools) -> Result<Self, ResponderError> {
        let token = config.huggingface_token.clone().ok_or_else(|| {
            ResponderError::MissingCredentials("HUGGINGFACEHUB_API_TOKEN".to_string())
        })?;

        let mut builder = huggingface::Client::<HttpClient>::builder().api_key(&token);
        if let Some(url) = &config.huggingface_base_url {
            builder = builder.base_url(url);
        }
        let client = builder
            .build()
            .map_err(|e| ResponderError::Init(e.to_string()))?;

        Ok(Self {
            runtime: agent_runtime()?,
            client,
            model: config.huggingface_model.clone(),
            tools,
        })
    }

    /// Runs before entering the runtime; price fetches block on their own.
    fn facts(&self) -> [String; 2] {
        [
            tool_text("total_return", self.tools.total_return(DEFAULT_RETURN_PERIOD)),
            tool_text("exposure", self.tools.exposure(DEFAULT_EXPOSURE_PERIOD)),
        ]
    }
}

impl QueryResponder for HuggingFaceResponder {
    fn name(&self) -> &str {
        "huggingface"
    }

    fn respond(&self, query: &str) -> Result<String, ResponderError> {
        let preamble = build_preamble(&self.facts());
        let agent = self
            .client
            .agent(&self.model)
            .preamble(&preamble)
            .temperature(TEMPERATURE)
            .max_tokens(MAX_NEW_TOKENS)
            .build();

        tracing::debug!(model = %self.model, "prompting Hugging Face model");
        let answer = self
            .runtime
            .block_on(async {
                tokio::time::timeout(RESPONSE_TIMEOUT, agent.prompt(query.trim())).await
            })
            .map_err(|_| ResponderError::Timeout(RESPONSE_TIMEOUT))?
            .map_err(agent_error)?;

        Ok(answer.trim().to_string())
    }
}

fn build_preamble(facts: &[String]) -> String {
    let mut preamble = String::from(
        "You are a personal investment assistant. \
         Answer from these portfolio facts only.\nPortfolio facts:\n",
    );
    for fact in facts {
        preamble.push_str("- ");
        preamble.push_str(fact);
        preamble.push('\n');
    }
    preamble
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holdings::HoldingsStore;
    use crate::prices::StaticPriceSource;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_build_preamble() {
        let facts = [
            "Total return over 1y: 8.00%".to_string(),
            "Exposure: AAPL: 100.0%".to_string(),
        ];
        let preamble = build_preamble(&facts);

        assert!(preamble.starts_with("You are a personal investment assistant."));
        assert!(preamble.contains("- Total return over 1y: 8.00%\n"));
        assert!(preamble.ends_with("- Exposure: AAPL: 100.0%\n"));
    }

    #[test]
    fn test_facts_carry_tool_errors() {
        let dir = TempDir::new().unwrap();
        let tools = PortfolioTools::new(
            HoldingsStore::with_path(dir.path().join("holdings.json")),
            Arc::new(StaticPriceSource::default()),
        );
        let config = ResponderConfig {
            huggingface_token: Some("hf_test".to_string()),
            ..ResponderConfig::default()
        };

        let responder = HuggingFaceResponder::new(&config, tools).unwrap();
        let facts = responder.facts();
        assert!(facts.iter().all(|fact| fact.starts_with("Error: ")));
    }

    #[test]
    fn test_requires_token() {
        let config = ResponderConfig::default();
        let tools = PortfolioTools::new(
            HoldingsStore::with_path("unused-holdings.json"),
            Arc::new(StaticPriceSource::default()),
        );

        assert!(matches!(
            HuggingFaceResponder::new(&config, tools),
            Err(ResponderError::MissingCredentials(_))
        ));
    }
}
