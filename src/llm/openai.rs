//! OpenAI chat completions backend.

use super::{ChatModel, ModelReply};
use crate::error::{Result, TolkError};
use crate::message::{Message, Role, ToolCallRequest};
use crate::openai::create_client_with_timeout;
use crate::tools::ToolSpec;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs, FunctionCall,
    FunctionObject,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Chat model served by the OpenAI API.
pub struct OpenAIChatModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
}

impl OpenAIChatModel {
    /// Create a model client with the default timeout.
    pub fn new(model: &str) -> Result<Self> {
        Self::with_timeout(model, Duration::from_secs(crate::openai::DEFAULT_TIMEOUT_SECS))
    }

    /// Create a model client with a custom request timeout.
    pub fn with_timeout(model: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_client_with_timeout(timeout)?,
            model: model.to_string(),
            temperature: None,
        })
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Convert a conversation message into the request format.
fn to_request_message(message: &Message) -> Result<ChatCompletionRequestMessage> {
    let built: ChatCompletionRequestMessage = match message.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(message.content.clone())
            .build()
            .map_err(|e| TolkError::Agent(e.to_string()))?
            .into(),
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(message.content.clone())
            .build()
            .map_err(|e| TolkError::Agent(e.to_string()))?
            .into(),
        Role::Assistant => {
            let mut args = ChatCompletionRequestAssistantMessageArgs::default();
            if !message.content.is_empty() {
                args.content(message.content.clone());
            }
            if message.has_tool_calls() {
                let calls: Vec<ChatCompletionMessageToolCall> = message
                    .tool_calls
                    .iter()
                    .map(|call| ChatCompletionMessageToolCall {
                        id: call.id.clone(),
                        r#type: ChatCompletionToolType::Function,
                        function: FunctionCall {
                            name: call.name.clone(),
                            arguments: call.arguments.to_string(),
                        },
                    })
                    .collect();
                args.tool_calls(calls);
            }
            args.build()
                .map_err(|e| TolkError::Agent(e.to_string()))?
                .into()
        }
        Role::Tool => {
            let id = message.tool_call_id.clone().ok_or_else(|| {
                TolkError::Agent("Tool message without a tool_call_id".to_string())
            })?;
            ChatCompletionRequestToolMessageArgs::default()
                .tool_call_id(id)
                .content(message.content.clone())
                .build()
                .map_err(|e| TolkError::Agent(e.to_string()))?
                .into()
        }
    };

    Ok(built)
}

fn to_tool_definition(spec: &ToolSpec) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: spec.name.clone(),
            description: Some(spec.description.clone()),
            parameters: Some(spec.parameters.clone()),
            strict: None,
        },
    }
}

/// Parse tool call arguments, keeping the raw string when the model sent invalid JSON.
fn parse_arguments(name: &str, raw: &str) -> serde_json::Value {
    if raw.trim().is_empty() {
        return serde_json::json!({});
    }
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!("Model sent invalid arguments for {}: {}", name, e);
        serde_json::Value::String(raw.to_string())
    })
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, messages, tools), fields(model = %self.model, messages = messages.len()))]
    async fn complete(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<ModelReply> {
        let request_messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model).messages(request_messages);
        if !tools.is_empty() {
            args.tools(tools.iter().map(to_tool_definition).collect::<Vec<_>>());
        }
        if let Some(temperature) = self.temperature {
            args.temperature(temperature);
        }
        let request = args.build().map_err(|e| TolkError::Agent(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| TolkError::OpenAI(format!("Chat API error: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| TolkError::Agent("No response from model".to_string()))?;

        let tool_calls: Vec<ToolCallRequest> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| {
                let arguments = parse_arguments(&call.function.name, &call.function.arguments);
                ToolCallRequest::new(call.id, call.function.name, arguments)
            })
            .collect();

        debug!("Model replied with {} tool call(s)", tool_calls.len());

        Ok(ModelReply {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_arguments() {
        assert_eq!(parse_arguments("add", r#"{"a": 1, "b": 2}"#), json!({"a": 1, "b": 2}));
        assert_eq!(parse_arguments("noop", ""), json!({}));
        assert_eq!(
            parse_arguments("add", "not json"),
            serde_json::Value::String("not json".to_string())
        );
    }

    #[test]
    fn test_tool_message_requires_id() {
        let mut message = Message::tool_result("call_1", "3");
        assert!(to_request_message(&message).is_ok());

        message.tool_call_id = None;
        assert!(to_request_message(&message).is_err());
    }

    #[test]
    fn test_assistant_with_tool_calls_converts() {
        let message = Message::assistant_with_tools(
            "",
            vec![ToolCallRequest::new("call_1", "add", json!({"a": 40, "b": 12}))],
        );
        match to_request_message(&message).unwrap() {
            ChatCompletionRequestMessage::Assistant(assistant) => {
                let calls = assistant.tool_calls.unwrap();
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].id, "call_1");
                assert_eq!(calls[0].function.name, "add");
            }
            other => panic!("Expected assistant message, got {:?}", other),
        }
    }
}
