//! Question answering over the ingested document.

use super::retriever::RetrieverTool;
use crate::agent::{Agent, AgentRun, LoopObserver};
use crate::config::Prompts;
use crate::error::Result;
use crate::llm::ChatModel;
use crate::message::{Conversation, Message};
use crate::tools::ToolRegistry;
use std::collections::HashMap;
use std::sync::Arc;

/// Agent whose only tool is the document retriever.
pub struct RagAgent {
    agent: Agent,
}

impl RagAgent {
    /// Build the agent. `prompts.rag.system` may reference `{{document}}`.
    pub fn new(
        model: Arc<dyn ChatModel>,
        retriever: RetrieverTool,
        prompts: &Prompts,
        document: &str,
        max_iterations: usize,
    ) -> Result<Self> {
        let mut vars = HashMap::new();
        vars.insert("document".to_string(), document.to_string());
        let system_prompt = prompts.render_with_custom(&prompts.rag.system, &vars);

        let tools = ToolRegistry::new().with(Arc::new(retriever))?;
        let agent = Agent::new(model, tools)
            .with_system_prompt(&system_prompt)
            .with_max_iterations(max_iterations);

        Ok(Self { agent })
    }

    /// Answer one question. Each question starts a fresh conversation.
    pub async fn ask(&self, question: &str, observer: &mut dyn LoopObserver) -> Result<AgentRun> {
        let mut conversation = Conversation::new();
        conversation.push(Message::user(question));
        self.agent.run_observed(conversation, observer).await
    }
}
