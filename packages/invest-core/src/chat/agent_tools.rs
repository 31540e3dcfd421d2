//! rig tools over [`PortfolioTools`].
//!
//! Every tool answers with text, errors included, so the model can read a
//! failure and try something else within the same conversation.

use super::tools::{tool_text, PortfolioTools, DEFAULT_EXPOSURE_PERIOD, DEFAULT_RETURN_PERIOD};
use crate::Result;
use rig::{completion::ToolDefinition, tool::Tool};
use serde::Deserialize;
use serde_json::{json, Value};

/// A tool body that could not run to completion.
#[derive(Debug, thiserror::Error)]
#[error("Tool {tool} did not finish: {message}")]
pub struct ToolTaskError {
    tool: &'static str,
    message: String,
}

/// Arguments of the tools that take a lookback period.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodArgs {
    #[serde(default)]
    pub period: Option<String>,
}

impl PeriodArgs {
    fn period_or(self, default: &str) -> String {
        self.period
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| default.to_string())
    }
}

/// Arguments of the IRR tool. Models send the flows either as a
/// comma-separated string or as a JSON array.
#[derive(Debug, Default, Deserialize)]
pub struct IrrArgs {
    #[serde(default)]
    pub cash_flows: Value,
}

impl IrrArgs {
    fn cash_flows(&self) -> Option<String> {
        match &self.cash_flows {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                Some(parts.join(","))
            }
            _ => None,
        }
    }
}

/// Price fetches block on their own runtime, so tool bodies that load
/// prices run on the blocking pool instead of the agent's runtime thread.
async fn run_blocking<F>(
    tool: &'static str,
    tools: PortfolioTools,
    body: F,
) -> std::result::Result<String, ToolTaskError>
where
    F: FnOnce(&PortfolioTools) -> Result<String> + Send + 'static,
{
    tokio::task::spawn_blocking(move || tool_text(tool, body(&tools)))
        .await
        .map_err(|e| ToolTaskError {
            tool,
            message: e.to_string(),
        })
}

fn period_parameters(default: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "period": {
                "type": "string",
                "description": format!("Lookback such as 1mo, 6mo, 1y, ytd or max. Defaults to {default}."),
                "default": default
            }
        },
        "required": []
    })
}

/// Total return of the current holdings.
#[derive(Clone)]
pub struct TotalReturnTool {
    tools: PortfolioTools,
}

impl TotalReturnTool {
    pub fn new(tools: PortfolioTools) -> Self {
        Self { tools }
    }
}

impl Tool for TotalReturnTool {
    const NAME: &'static str = "total_return";

    type Error = ToolTaskError;
    type Args = PeriodArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Total return of the current holdings over a lookback period.".to_string(),
            parameters: period_parameters(DEFAULT_RETURN_PERIOD),
        }
    }

    async fn call(&self, args: Self::Args) -> std::result::Result<Self::Output, Self::Error> {
        let period = args.period_or(DEFAULT_RETURN_PERIOD);
        run_blocking(Self::NAME, self.tools.clone(), move |tools| {
            tools.total_return(&period)
        })
        .await
    }
}

/// IRR of cash flows given by the model.
#[derive(Clone)]
pub struct IrrTool {
    tools: PortfolioTools,
}

impl IrrTool {
    pub fn new(tools: PortfolioTools) -> Self {
        Self { tools }
    }
}

impl Tool for IrrTool {
    const NAME: &'static str = "irr";

    type Error = ToolTaskError;
    type Args = IrrArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Internal rate of return of periodic cash flows. \
                Negative values are investments, positive values are returns."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "cash_flows": {
                        "type": "string",
                        "description": "Comma-separated cash flows, e.g. \"-1000,300,400,500\"."
                    }
                },
                "required": ["cash_flows"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> std::result::Result<Self::Output, Self::Error> {
        let reply = match args.cash_flows() {
            Some(flows) => tool_text(Self::NAME, self.tools.irr(&flows)),
            None => "Error: missing argument cash_flows".to_string(),
        };
        Ok(reply)
    }
}

/// Weight of each holding by market value.
#[derive(Clone)]
pub struct ExposureTool {
    tools: PortfolioTools,
}

impl ExposureTool {
    pub fn new(tools: PortfolioTools) -> Self {
        Self { tools }
    }
}

impl Tool for ExposureTool {
    const NAME: &'static str = "exposure";

    type Error = ToolTaskError;
    type Args = PeriodArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Current weight of each holding by market value.".to_string(),
            parameters: period_parameters(DEFAULT_EXPOSURE_PERIOD),
        }
    }

    async fn call(&self, args: Self::Args) -> std::result::Result<Self::Output, Self::Error> {
        let period = args.period_or(DEFAULT_EXPOSURE_PERIOD);
        run_blocking(Self::NAME, self.tools.clone(), move |tools| {
            tools.exposure(&period)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holdings::HoldingsStore;
    use crate::metrics;
    use crate::prices::{PriceTable, StaticPriceSource};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::runtime::Runtime;

    fn tools_with(entries: &[(&str, f64)]) -> (TempDir, PortfolioTools) {
        let dir = TempDir::new().unwrap();
        let store = HoldingsStore::with_path(dir.path().join("holdings.json"));
        for (ticker, qty) in entries {
            store.update(ticker, *qty).unwrap();
        }

        let table = PriceTable::from_columns(
            metrics::fixtures::dates(3),
            [
                ("AAPL".to_string(), vec![100.0, 105.0, 110.0]),
                ("MSFT".to_string(), vec![200.0, 200.0, 220.0]),
            ],
        )
        .unwrap();

        let tools = PortfolioTools::new(store, Arc::new(StaticPriceSource::new(table)));
        (dir, tools)
    }

    fn runtime() -> Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    fn args<T: for<'de> Deserialize<'de>>(value: Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_definitions() {
        let (_dir, tools) = tools_with(&[]);
        let rt = runtime();

        let names = rt.block_on(async {
            vec![
                TotalReturnTool::new(tools.clone()).definition(String::new()).await.name,
                IrrTool::new(tools.clone()).definition(String::new()).await.name,
                ExposureTool::new(tools.clone()).definition(String::new()).await.name,
            ]
        });
        assert_eq!(names, ["total_return", "irr", "exposure"]);

        let irr = rt.block_on(IrrTool::new(tools).definition(String::new()));
        assert_eq!(irr.parameters["required"], json!(["cash_flows"]));
    }

    #[test]
    fn test_period_defaults() {
        let (_dir, tools) = tools_with(&[("AAPL", 1.0)]);
        let rt = runtime();

        let total = rt
            .block_on(TotalReturnTool::new(tools.clone()).call(args(json!({}))))
            .unwrap();
        assert_eq!(total, "Total return over 1y: 10.00%");

        let exposure = rt
            .block_on(ExposureTool::new(tools).call(args(json!({ "period": "  " }))))
            .unwrap();
        assert_eq!(exposure, "Exposure: AAPL: 100.0%");
    }

    #[test]
    fn test_irr_accepts_string_or_array() {
        let (_dir, tools) = tools_with(&[]);
        let rt = runtime();
        let tool = IrrTool::new(tools);

        let from_text = rt
            .block_on(tool.call(args(json!({ "cash_flows": "-100, 110" }))))
            .unwrap();
        let from_array = rt
            .block_on(tool.call(args(json!({ "cash_flows": [-100, "110"] }))))
            .unwrap();
        assert_eq!(from_text, "IRR: 10.00%");
        assert_eq!(from_array, "IRR: 10.00%");
    }

    #[test]
    fn test_failures_reach_the_model_as_text() {
        let (_dir, tools) = tools_with(&[]);
        let rt = runtime();

        let missing = rt
            .block_on(IrrTool::new(tools.clone()).call(args(json!({}))))
            .unwrap();
        assert_eq!(missing, "Error: missing argument cash_flows");

        let no_holdings = rt
            .block_on(TotalReturnTool::new(tools.clone()).call(args(json!({}))))
            .unwrap();
        assert!(no_holdings.starts_with("Error: "));

        let bad_period = rt
            .block_on(ExposureTool::new(tools).call(args(json!({ "period": "soon" }))))
            .unwrap();
        assert!(bad_period.starts_with("Error: "));
    }
}
