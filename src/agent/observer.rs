//! Hooks for watching an agent run step by step.

use crate::message::{Message, ToolCallRequest};

/// Receives each step of a run. All methods default to doing nothing.
pub trait LoopObserver {
    /// A message was appended to the conversation.
    fn on_message(&mut self, _message: &Message) {}

    /// A tool is about to run.
    fn on_tool_call(&mut self, _call: &ToolCallRequest) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl LoopObserver for NoopObserver {}
