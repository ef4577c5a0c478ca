//! Chat model abstraction.
//!
//! Agents talk to a [`ChatModel`]: given the conversation and the tools on
//! offer, it returns assistant text and any tool calls. [`OpenAIChatModel`]
//! is the hosted implementation; [`ScriptedModel`] replays canned replies.

mod openai;
mod scripted;

pub use openai::OpenAIChatModel;
pub use scripted::ScriptedModel;

use crate::error::Result;
use crate::message::{Message, ToolCallRequest};
use crate::tools::ToolSpec;
use async_trait::async_trait;

/// One model turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    /// Assistant text; may be empty when only tools are requested.
    pub content: String,
    /// Requested tool calls; empty means the model is done.
    pub tool_calls: Vec<ToolCallRequest>,
}

impl ModelReply {
    /// Final answer with no tool calls.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Reply that only requests tools.
    pub fn tool_calls(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            content: String::new(),
            tool_calls,
        }
    }

    /// Convert into the assistant message appended to the conversation.
    pub fn into_message(self) -> Message {
        if self.tool_calls.is_empty() {
            Message::assistant(self.content)
        } else {
            Message::assistant_with_tools(self.content, self.tool_calls)
        }
    }
}

/// A chat completion backend.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier, for logs.
    fn name(&self) -> &str;

    /// Run one completion over `messages`, offering `tools` (may be empty).
    async fn complete(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<ModelReply>;
}
