//! Console renderers for agent runs.

use crate::agent::LoopObserver;
use crate::message::{Message, Role, ToolCallRequest};
use console::style;
use std::collections::HashMap;

const RULE_WIDTH: usize = 80;

/// Banner line such as `=== Ai Message ===`, padded to a fixed width.
pub fn banner(role: Role) -> String {
    format!("{:=^width$}", format!(" {} Message ", role), width = RULE_WIDTH)
}

/// Render one message with its banner, tool calls and arguments.
pub fn render_message(message: &Message, tool_name: Option<&str>) -> String {
    let mut out = banner(message.role);
    out.push('\n');

    if let Some(name) = tool_name {
        out.push_str(&format!("Name: {}\n\n", name));
    }

    if !message.content.is_empty() {
        out.push_str(&message.content);
        out.push('\n');
    }

    if message.has_tool_calls() {
        out.push_str("Tool Calls:\n");
        for call in &message.tool_calls {
            out.push_str(&format!("  {} ({})\n", call.name, call.id));
            out.push_str(&format!(" Call ID: {}\n", call.id));
            out.push_str("  Args:\n");
            match call.arguments.as_object() {
                Some(args) => {
                    for (key, value) in args {
                        out.push_str(&format!("    {}: {}\n", key, value));
                    }
                }
                None => out.push_str(&format!("    {}\n", call.arguments)),
            }
        }
    }

    out
}

/// Prints every message of a run as it is appended.
#[derive(Default)]
pub struct StepPrinter {
    names: HashMap<String, String>,
}

impl StepPrinter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoopObserver for StepPrinter {
    fn on_message(&mut self, message: &Message) {
        let name = message
            .tool_call_id
            .as_ref()
            .and_then(|id| self.names.get(id))
            .map(String::as_str);
        print!("{}", render_message(message, name));
    }

    fn on_tool_call(&mut self, call: &ToolCallRequest) {
        self.names.insert(call.id.clone(), call.name.clone());
    }
}

/// Size of a retrieval result in characters.
fn result_length(content: &str) -> String {
    format!("Result length: {}", content.chars().count())
}

/// Prints each retrieval the RAG agent makes.
pub struct RetrievalPrinter;

impl LoopObserver for RetrievalPrinter {
    fn on_message(&mut self, message: &Message) {
        if message.role == Role::Tool {
            println!("{}", style(result_length(&message.content)).dim());
        }
    }

    fn on_tool_call(&mut self, call: &ToolCallRequest) {
        let query = call
            .arguments
            .get("query")
            .and_then(|q| q.as_str())
            .unwrap_or("No query provided");
        println!(
            "{}",
            style(format!("Calling Tool: {} with query: {}", call.name, query)).cyan()
        );
    }
}
