//! Scripted chat model that replays queued replies.

use super::{ChatModel, ModelReply};
use crate::error::{Result, TolkError};
use crate::message::Message;
use crate::tools::ToolSpec;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays replies in order and records every request it receives.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<ModelReply>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedModel {
    pub fn new(replies: impl IntoIterator<Item = ModelReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Messages sent on each call so far.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Replies not yet consumed.
    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or_default()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, messages: &[Message], _tools: &[ToolSpec]) -> Result<ModelReply> {
        self.requests
            .lock()
            .map_err(|e| TolkError::Agent(format!("Failed to acquire lock: {}", e)))?
            .push(messages.to_vec());

        self.replies
            .lock()
            .map_err(|e| TolkError::Agent(format!("Failed to acquire lock: {}", e)))?
            .pop_front()
            .ok_or_else(|| TolkError::Agent("Scripted model has no replies left".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order() {
        let model = ScriptedModel::new(vec![ModelReply::text("one"), ModelReply::text("two")]);

        let first = model.complete(&[Message::user("a")], &[]).await.unwrap();
        let second = model.complete(&[Message::user("b")], &[]).await.unwrap();

        assert_eq!(first.content, "one");
        assert_eq!(second.content, "two");
        assert_eq!(model.requests().len(), 2);
        assert!(model.complete(&[], &[]).await.is_err());
    }

    #[test]
    fn test_empty_script_errors() {
        let model = ScriptedModel::new(Vec::<ModelReply>::new());
        let result = tokio_test::block_on(model.complete(&[Message::user("hi")], &[]));

        assert!(result.is_err());
        assert_eq!(model.remaining(), 0);
        assert_eq!(model.requests().len(), 1);
    }
}
