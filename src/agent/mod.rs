//! Tool-calling agent loop.
//!
//! An agent alternates between asking the model and running the tools it
//! requests, feeding every tool result back, until the model replies without
//! tool calls.

mod observer;
mod runner;

pub use observer::{LoopObserver, NoopObserver};
pub use runner::{should_continue, Agent, AgentRun, Node, ToolCallRecord, DEFAULT_MAX_ITERATIONS};
