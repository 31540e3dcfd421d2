//! Natural-language questions about the portfolio.
//!
//! [`QueryRouter`] answers IRR questions deterministically and hands
//! everything else to a [`QueryResponder`], chosen by [`build_responder`].
//! The OpenAI and Hugging Face responders are rig agents; the stub answers
//! without a model.

mod agent_tools;
mod huggingface;
mod openai;
mod responder;
mod router;
mod tools;

pub use huggingface::HuggingFaceResponder;
pub use openai::OpenAiResponder;
pub use responder::{
    build_responder, QueryResponder, ResponderConfig, ResponderError, ResponderKind,
    StubResponder, UNAVAILABLE_MESSAGE,
};
pub use router::{extract_cash_flows, ChatReply, QueryRouter, FALLBACK_MESSAGE};
pub use agent_tools::{ExposureTool, IrrArgs, IrrTool, PeriodArgs, ToolTaskError, TotalReturnTool};
pub use tools::{format_irr, PortfolioTools};
