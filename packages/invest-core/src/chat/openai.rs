//! Tool-calling agent on the OpenAI chat completions API, built with rig.

use super::agent_tools::{ExposureTool, IrrTool, TotalReturnTool};
use super::responder::{
    agent_error, agent_runtime, QueryResponder, ResponderConfig, ResponderError, RESPONSE_TIMEOUT,
};
use super::tools::PortfolioTools;
use reqwest::Client as HttpClient;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::openai;
use tokio::runtime::Runtime;

/// Upper bound on model turns per query, tool rounds included.
const MAX_TURNS: usize = 4;

const PREAMBLE: &str = "You are a personal investment assistant. \
    Use the provided tools for every portfolio figure and never do the arithmetic yourself. \
    Answer briefly.";

pub struct OpenAiResponder {
    runtime: Runtime,
    client: openai::CompletionsClient<HttpClient>,
    model: String,
    tools: PortfolioTools,
}

impl OpenAiResponder {
    pub fn new(config: &ResponderConfig, tools: PortfolioTools) -> Result<Self, ResponderError> {
        let key = config
            .openai_api_key
            .clone()
            .ok_or_else(|| ResponderError::MissingCredentials("OPENAI_API_KEY".to_string()))?;

        // Completions API rather than Responses: tool rounds replay cleanly
        let mut builder = openai::CompletionsClient::<HttpClient>::builder().api_key(&key);
        if let Some(url) = &config.openai_base_url {
            builder = builder.base_url(url);
        }
        let client = builder
            .build()
            .map_err(|e| ResponderError::Init(e.to_string()))?;

        Ok(Self {
            runtime: agent_runtime()?,
            client,
            model: config.openai_model.clone(),
            tools,
        })
    }
}

impl QueryResponder for OpenAiResponder {
    fn name(&self) -> &str {
        "openai"
    }

    fn respond(&self, query: &str) -> Result<String, ResponderError> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(PREAMBLE)
            .tool(TotalReturnTool::new(self.tools.clone()))
            .tool(IrrTool::new(self.tools.clone()))
            .tool(ExposureTool::new(self.tools.clone()))
            .build();

        tracing::debug!(model = %self.model, max_turns = MAX_TURNS, "prompting OpenAI agent");
        self.runtime
            .block_on(async {
                tokio::time::timeout(RESPONSE_TIMEOUT, agent.prompt(query).max_turns(MAX_TURNS))
                    .await
            })
            .map_err(|_| ResponderError::Timeout(RESPONSE_TIMEOUT))?
            .map_err(agent_error)
    }
}
