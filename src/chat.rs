//! Chat loop agent: a growing transcript sent to the model every turn.

use crate::agent::Agent;
use crate::console::{next_input, Input};
use crate::error::Result;
use crate::llm::ChatModel;
use crate::message::{Conversation, Message, Role};
use crate::tools::ToolRegistry;
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

const LOG_HEADER: &str = "Your Conversation Log:\n";
const LOG_TRAILER: &str = "End of Conversation";

/// A single conversation with memory of every earlier turn.
pub struct ChatSession {
    agent: Agent,
    conversation: Conversation,
}

impl ChatSession {
    /// Create a session. No tools are offered to the model.
    pub fn new(model: Arc<dyn ChatModel>, system_prompt: Option<&str>) -> Self {
        let mut agent = Agent::new(model, ToolRegistry::new());
        if let Some(prompt) = system_prompt {
            agent = agent.with_system_prompt(prompt);
        }

        Self {
            agent,
            conversation: Conversation::new(),
        }
    }

    /// Send a user message and return the reply. Both are kept in the history.
    pub async fn send(&mut self, input: &str) -> Result<String> {
        let mut conversation = self.conversation.clone();
        conversation.push(Message::user(input));

        let run = self.agent.run(conversation).await?;
        self.conversation = run.conversation;

        debug!("Conversation now has {} messages", self.conversation.len());
        Ok(run.answer)
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Write the transcript to `path`, replacing any previous log.
    pub fn write_transcript(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, render_transcript(&self.conversation))?;
        info!("Wrote transcript with {} messages to {:?}", self.conversation.len(), path);
        Ok(())
    }

    /// Read lines from `reader` until `exit`/`quit`, printing each reply to `writer`.
    pub async fn run_console<R: BufRead, W: Write>(
        &mut self,
        reader: &mut R,
        writer: &mut W,
        prompt: &str,
    ) -> Result<()> {
        loop {
            let line = match next_input(reader, writer, prompt)? {
                Input::Line(line) => line,
                Input::Exit => return Ok(()),
            };

            let reply = self.send(&line).await?;
            writeln!(writer, "\nAI: {}", reply)?;
        }
    }
}

/// Render user and assistant turns in log form.
pub fn render_transcript(conversation: &Conversation) -> String {
    let mut out = String::from(LOG_HEADER);
    for message in conversation {
        match message.role {
            Role::User => out.push_str(&format!("You: {}\n", message.content)),
            Role::Assistant if !message.has_tool_calls() => {
                out.push_str(&format!("AI: {}\n\n", message.content))
            }
            _ => {}
        }
    }
    out.push_str(LOG_TRAILER);
    out
}
