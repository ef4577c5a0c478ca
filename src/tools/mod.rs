//! Tool definitions and the name-keyed registry the agent loop dispatches through.

mod arithmetic;

pub use arithmetic::{arithmetic_registry, ArithmeticTool};

use crate::error::{Result, TolkError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Function definition offered to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema for the arguments object.
    pub parameters: serde_json::Value,
}

/// A named, side-effecting operation the model can invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Definition sent to the model. `spec().name` is the registry key.
    fn spec(&self) -> ToolSpec;

    /// Execute with the model-supplied arguments and return the result text.
    async fn call(&self, arguments: &serde_json::Value) -> Result<String>;
}

/// Fixed set of tools, looked up by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool. Names must be unique.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.spec().name;
        if self.by_name.contains_key(&name) {
            return Err(TolkError::Config(format!("Tool '{}' registered twice", name)));
        }
        self.by_name.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, tool: Arc<dyn Tool>) -> Result<Self> {
        self.register(tool)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.by_name.get(name).map(|&idx| self.tools[idx].clone())
    }

    /// Definitions in registration order.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    /// Tool names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.spec().name).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

/// Pull a required string argument out of a tool's JSON arguments.
pub fn required_str<'a>(tool: &str, arguments: &'a serde_json::Value, key: &str) -> Result<&'a str> {
    arguments[key]
        .as_str()
        .ok_or_else(|| TolkError::tool(tool, format!("Missing '{}' argument", key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registry_lookup() {
        let registry = arithmetic_registry();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.names(), vec!["add", "subtract", "multiply"]);
        assert!(registry.get("multiply").is_some());
        assert!(registry.get("divide").is_none());
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(ArithmeticTool::Add)).unwrap();
        assert!(registry.register(Arc::new(ArithmeticTool::Add)).is_err());
    }

    #[test]
    fn test_required_str() {
        let args = json!({"query": "revenue"});
        assert_eq!(required_str("retriever_tool", &args, "query").unwrap(), "revenue");
        assert!(required_str("retriever_tool", &args, "missing").is_err());
    }
}
