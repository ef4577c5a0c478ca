//! Agent runner: the ask-model / run-tools loop.

use super::observer::{LoopObserver, NoopObserver};
use crate::error::{Result, TolkError};
use crate::llm::ChatModel;
use crate::message::{Conversation, Message, ToolCallRequest};
use crate::tools::ToolRegistry;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default ceiling on model calls per run.
pub const DEFAULT_MAX_ITERATIONS: usize = 25;

/// Loop states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    /// Send the conversation to the model.
    AskModel,
    /// Execute the tool calls of the last assistant message.
    RunTools,
    /// Terminal.
    Done,
}

/// Pick the state that follows an assistant message.
pub fn should_continue(message: &Message) -> Node {
    if message.has_tool_calls() {
        Node::RunTools
    } else {
        Node::Done
    }
}

/// Agent that alternates between the model and its tools until the model stops asking.
pub struct Agent {
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    system_prompt: Option<String>,
    max_iterations: usize,
}

impl Agent {
    /// Create a new agent with the given model and tools.
    pub fn new(model: Arc<dyn ChatModel>, tools: ToolRegistry) -> Self {
        Self {
            model,
            tools,
            system_prompt: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Set the system prompt sent ahead of the conversation on every model call.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = Some(prompt.to_string());
        self
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Tools offered to the model.
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run the loop to completion without observing intermediate steps.
    pub async fn run(&self, conversation: Conversation) -> Result<AgentRun> {
        self.run_observed(conversation, &mut NoopObserver).await
    }

    /// Run the loop, reporting every appended message to `observer`.
    pub async fn run_observed(
        &self,
        mut conversation: Conversation,
        observer: &mut dyn LoopObserver,
    ) -> Result<AgentRun> {
        let mut node = Node::AskModel;
        let mut iterations = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            match node {
                Node::AskModel => {
                    iterations += 1;
                    if iterations > self.max_iterations {
                        return Err(TolkError::Agent(format!(
                            "Agent exceeded maximum iterations ({})",
                            self.max_iterations
                        )));
                    }
                    node = self.ask_model(&mut conversation, observer, iterations).await?;
                }
                Node::RunTools => {
                    let records = self.run_tools(&mut conversation, observer).await?;
                    tool_calls_made.extend(records);
                    node = Node::AskModel;
                }
                Node::Done => break,
            }
        }

        let answer = conversation
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();

        Ok(AgentRun {
            answer,
            conversation,
            tool_calls: tool_calls_made,
            iterations,
        })
    }

    async fn ask_model(
        &self,
        conversation: &mut Conversation,
        observer: &mut dyn LoopObserver,
        iteration: usize,
    ) -> Result<Node> {
        let unanswered = conversation.unanswered_tool_calls();
        if !unanswered.is_empty() {
            return Err(TolkError::Agent(format!(
                "Tool calls without exactly one result: {}",
                unanswered.join(", ")
            )));
        }

        debug!(
            "Agent iteration {} ({}), {} messages",
            iteration,
            self.model.name(),
            conversation.len()
        );

        let mut request = Vec::with_capacity(conversation.len() + 1);
        if let Some(prompt) = &self.system_prompt {
            request.push(Message::system(prompt.clone()));
        }
        request.extend(conversation.iter().cloned());

        let reply = self.model.complete(&request, &self.tools.specs()).await?;
        let message = reply.into_message();
        let next = should_continue(&message);

        observer.on_message(&message);
        conversation.push(message);

        Ok(next)
    }

    async fn run_tools(
        &self,
        conversation: &mut Conversation,
        observer: &mut dyn LoopObserver,
    ) -> Result<Vec<ToolCallRecord>> {
        let calls = conversation
            .last()
            .map(|m| m.tool_calls.clone())
            .unwrap_or_default();

        let mut records = Vec::with_capacity(calls.len());

        // One at a time, in the order the model listed them.
        for call in calls {
            observer.on_tool_call(&call);
            let result = self.execute_tool_call(&call).await?;

            let message = Message::tool_result(call.id.clone(), result.clone());
            observer.on_message(&message);
            conversation.push(message);

            records.push(ToolCallRecord {
                id: call.id,
                name: call.name,
                arguments: call.arguments.to_string(),
                result,
            });
        }

        Ok(records)
    }

    /// Execute a single tool call. Unknown names become an error result for the model.
    async fn execute_tool_call(&self, call: &ToolCallRequest) -> Result<String> {
        match self.tools.get(&call.name) {
            Some(tool) => {
                info!("Agent calling tool: {} with args: {}", call.name, call.arguments);
                tool.call(&call.arguments).await
            }
            None => {
                warn!("Model requested unknown tool: {}", call.name);
                Ok(format!(
                    "Error: tool '{}' not found. Available tools: {}",
                    call.name,
                    self.tools.names().join(", ")
                ))
            }
        }
    }
}

/// Result of an agent run.
#[derive(Debug)]
pub struct AgentRun {
    /// Content of the final assistant message.
    pub answer: String,
    /// Input conversation plus every message the run appended.
    pub conversation: Conversation,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of iterations (model calls) used.
    pub iterations: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Call identifier from the model.
    pub id: String,
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ModelReply, ScriptedModel};
    use crate::message::Role;
    use crate::tools::{arithmetic_registry, Tool, ToolSpec};
    use async_trait::async_trait;
    use serde_json::json;

    fn call(id: &str, name: &str, args: serde_json::Value) -> ToolCallRequest {
        ToolCallRequest::new(id, name, args)
    }

    #[test]
    fn test_tool_call_record_display() {
        let record = ToolCallRecord {
            id: "call_1".to_string(),
            name: "add".to_string(),
            arguments: r#"{"a":40,"b":12}"#.to_string(),
            result: "52".to_string(),
        };
        assert_eq!(format!("{}", record), r#"add({"a":40,"b":12})"#);
    }

    #[test]
    fn test_should_continue() {
        assert_eq!(should_continue(&Message::assistant("done")), Node::Done);
        let msg = Message::assistant_with_tools("", vec![call("1", "add", json!({}))]);
        assert_eq!(should_continue(&msg), Node::RunTools);
    }

    #[tokio::test]
    async fn test_add_then_multiply_scenario() {
        let model = Arc::new(ScriptedModel::new(vec![
            ModelReply::tool_calls(vec![call("call_1", "add", json!({"a": 40, "b": 12}))]),
            ModelReply::tool_calls(vec![call("call_2", "multiply", json!({"a": 52, "b": 6}))]),
            ModelReply::text("(40 + 12) * 6 = 312."),
        ]));
        let agent = Agent::new(model.clone(), arithmetic_registry())
            .with_system_prompt("You are my AI assistant");

        let mut conversation = Conversation::new();
        conversation.push(Message::user("Add 40+12 and then multiply the result by 6"));

        let run = agent.run(conversation).await.unwrap();

        assert_eq!(run.iterations, 3);
        assert_eq!(run.answer, "(40 + 12) * 6 = 312.");
        assert_eq!(run.tool_calls.len(), 2);
        assert_eq!(run.tool_calls[0].name, "add");
        assert_eq!(run.tool_calls[0].result, "52");
        assert_eq!(run.tool_calls[1].name, "multiply");
        assert_eq!(run.tool_calls[1].result, "312");

        let last = run.conversation.last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert!(!last.has_tool_calls());

        // The second model call saw the first tool result.
        let requests = model.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1][0].role, Role::System);
        let seen = requests[1].last().unwrap();
        assert_eq!(seen.role, Role::Tool);
        assert_eq!(seen.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(seen.content, "52");
    }

    #[tokio::test]
    async fn test_call_id_reused_across_turns() {
        let model = Arc::new(ScriptedModel::new(vec![
            ModelReply::tool_calls(vec![call("call_0", "add", json!({"a": 40, "b": 12}))]),
            ModelReply::tool_calls(vec![call("call_0", "multiply", json!({"a": 52, "b": 6}))]),
            ModelReply::text("312"),
        ]));
        let agent = Agent::new(model, arithmetic_registry());

        let run = agent
            .run(Conversation::from(vec![Message::user("Add 40+12 and then multiply the result by 6")]))
            .await
            .unwrap();

        assert_eq!(run.answer, "312");
        assert_eq!(run.iterations, 3);
        let results: Vec<_> = run.tool_calls.iter().map(|r| r.result.as_str()).collect();
        assert_eq!(results, vec!["52", "312"]);
    }

    #[tokio::test]
    async fn test_every_call_id_answered_once_in_order() {
        let model = Arc::new(ScriptedModel::new(vec![
            ModelReply::tool_calls(vec![
                call("a", "add", json!({"a": 1, "b": 1})),
                call("b", "subtract", json!({"a": 5, "b": 3})),
                call("c", "multiply", json!({"a": 2, "b": 4})),
            ]),
            ModelReply::text("done"),
        ]));
        let agent = Agent::new(model, arithmetic_registry());

        let run = agent
            .run(Conversation::from(vec![Message::user("do three things")]))
            .await
            .unwrap();

        let results: Vec<_> = run
            .conversation
            .iter()
            .filter(|m| m.role == Role::Tool)
            .map(|m| (m.tool_call_id.clone().unwrap(), m.content.clone()))
            .collect();
        assert_eq!(
            results,
            vec![
                ("a".to_string(), "2".to_string()),
                ("b".to_string(), "2".to_string()),
                ("c".to_string(), "8".to_string()),
            ]
        );
        assert!(run.conversation.unanswered_tool_calls().is_empty());
        assert!(run.conversation.orphan_tool_results().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_tool_reported_and_loop_continues() {
        let model = Arc::new(ScriptedModel::new(vec![
            ModelReply::tool_calls(vec![call("x", "divide", json!({"a": 1, "b": 2}))]),
            ModelReply::text("I cannot divide."),
        ]));
        let agent = Agent::new(model.clone(), arithmetic_registry());

        let run = agent
            .run(Conversation::from(vec![Message::user("divide 1 by 2")]))
            .await
            .unwrap();

        assert_eq!(run.answer, "I cannot divide.");
        assert_eq!(run.iterations, 2);
        let result = &run.tool_calls[0].result;
        assert!(result.contains("'divide' not found"));
        assert!(result.contains("add, subtract, multiply"));
        assert_eq!(model.remaining(), 0);
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn spec(&self) -> ToolSpec {
            ToolSpec {
                name: "explode".to_string(),
                description: "always fails".to_string(),
                parameters: json!({"type": "object", "properties": {}}),
            }
        }

        async fn call(&self, _arguments: &serde_json::Value) -> Result<String> {
            Err(TolkError::tool("explode", "boom"))
        }
    }

    #[tokio::test]
    async fn test_tool_failure_propagates() {
        let model = Arc::new(ScriptedModel::new(vec![
            ModelReply::tool_calls(vec![call("1", "explode", json!({}))]),
            ModelReply::text("unreachable"),
        ]));
        let registry = ToolRegistry::new().with(Arc::new(FailingTool)).unwrap();
        let agent = Agent::new(model.clone(), registry);

        let err = agent
            .run(Conversation::from(vec![Message::user("go")]))
            .await
            .unwrap_err();

        assert!(matches!(err, TolkError::Tool { .. }));
        assert_eq!(model.remaining(), 1);
    }

    #[tokio::test]
    async fn test_max_iterations() {
        let replies = (0..5).map(|i| {
            ModelReply::tool_calls(vec![call(&i.to_string(), "add", json!({"a": 1, "b": 1}))])
        });
        let model = Arc::new(ScriptedModel::new(replies));
        let agent = Agent::new(model, arithmetic_registry()).with_max_iterations(3);

        let err = agent
            .run(Conversation::from(vec![Message::user("loop forever")]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("maximum iterations (3)"));
    }

    #[tokio::test]
    async fn test_dangling_tool_call_rejected() {
        let model = Arc::new(ScriptedModel::new(vec![ModelReply::text("never")]));
        let agent = Agent::new(model, arithmetic_registry());

        let conversation = Conversation::from(vec![
            Message::user("hi"),
            Message::assistant_with_tools("", vec![call("lost", "add", json!({"a": 1, "b": 1}))]),
        ]);

        let err = agent.run(conversation).await.unwrap_err();
        assert!(err.to_string().contains("lost"));
    }

    #[derive(Default)]
    struct Recorder {
        roles: Vec<Role>,
        calls: Vec<String>,
    }

    impl LoopObserver for Recorder {
        fn on_message(&mut self, message: &Message) {
            self.roles.push(message.role);
        }

        fn on_tool_call(&mut self, call: &ToolCallRequest) {
            self.calls.push(call.name.clone());
        }
    }

    #[tokio::test]
    async fn test_observer_sees_each_step() {
        let model = Arc::new(ScriptedModel::new(vec![
            ModelReply::tool_calls(vec![call("1", "add", json!({"a": 2, "b": 2}))]),
            ModelReply::text("4"),
        ]));
        let agent = Agent::new(model, arithmetic_registry());
        let mut recorder = Recorder::default();

        agent
            .run_observed(Conversation::from(vec![Message::user("2+2")]), &mut recorder)
            .await
            .unwrap();

        assert_eq!(recorder.roles, vec![Role::Assistant, Role::Tool, Role::Assistant]);
        assert_eq!(recorder.calls, vec!["add".to_string()]);
    }
}
