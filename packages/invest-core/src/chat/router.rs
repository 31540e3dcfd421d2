//! Routing of free-text questions.
//!
//! Questions that mention IRR and carry at least two numbers are answered
//! locally. Everything else goes to the configured [`QueryResponder`], and
//! any responder failure turns into a fixed fallback message.

use super::responder::QueryResponder;
use super::tools::format_irr;
use crate::metrics::irr;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Reply when the responder fails.
pub const FALLBACK_MESSAGE: &str = "Chat agent unavailable or failed during execution. \
     Please set a valid API key or try a different query.";

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+\.?\d*").expect("Invalid number pattern"));

/// Outcome of routing one question.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatReply {
    /// Answered locally from cash flows in the question.
    Irr { cash_flows: Vec<f64>, rate: f64 },
    /// The question had cash flows but no IRR exists for them.
    IrrFailed { cash_flows: Vec<f64>, reason: String },
    /// Text from the responder.
    Responder(String),
    /// The responder failed.
    Fallback(String),
}

impl ChatReply {
    pub fn text(&self) -> String {
        match self {
            ChatReply::Irr { rate, .. } => format_irr(*rate),
            ChatReply::IrrFailed { reason, .. } => format!("IRR could not be computed: {reason}"),
            ChatReply::Responder(text) | ChatReply::Fallback(text) => text.clone(),
        }
    }
}

impl fmt::Display for ChatReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Cash flows embedded in an IRR question, in order of appearance.
///
/// Returns `None` unless the query mentions IRR (any case) and contains at
/// least two numbers.
pub fn extract_cash_flows(query: &str) -> Option<Vec<f64>> {
    if !query.to_uppercase().contains("IRR") {
        return None;
    }

    let flows: Vec<f64> = NUMBER
        .find_iter(query)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();

    (flows.len() >= 2).then_some(flows)
}

pub struct QueryRouter {
    responder: Box<dyn QueryResponder>,
}

impl QueryRouter {
    pub fn new(responder: Box<dyn QueryResponder>) -> Self {
        Self { responder }
    }

    pub fn responder_name(&self) -> &str {
        self.responder.name()
    }

    /// Answer a question. Never fails.
    pub fn route(&self, query: &str) -> ChatReply {
        if let Some(cash_flows) = extract_cash_flows(query) {
            return match irr(&cash_flows) {
                Ok(rate) => ChatReply::Irr { cash_flows, rate },
                Err(e) => {
                    tracing::warn!(?cash_flows, error = %e, "no IRR for cash flows in query");
                    ChatReply::IrrFailed {
                        cash_flows,
                        reason: e.to_string(),
                    }
                }
            };
        }

        match self.responder.respond(query) {
            Ok(text) => ChatReply::Responder(text),
            Err(e) => {
                tracing::warn!(
                    responder = self.responder.name(),
                    error = %e,
                    "query responder failed, returning fallback"
                );
                ChatReply::Fallback(FALLBACK_MESSAGE.to_string())
            }
        }
    }
}
