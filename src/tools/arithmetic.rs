//! Integer arithmetic tools.

use super::{Tool, ToolRegistry, ToolSpec};
use crate::error::{Result, TolkError};
use async_trait::async_trait;
use std::sync::Arc;

/// The three arithmetic operations exposed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticTool {
    Add,
    Subtract,
    Multiply,
}

impl ArithmeticTool {
    pub const ALL: [ArithmeticTool; 3] = [
        ArithmeticTool::Add,
        ArithmeticTool::Subtract,
        ArithmeticTool::Multiply,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ArithmeticTool::Add => "add",
            ArithmeticTool::Subtract => "subtract",
            ArithmeticTool::Multiply => "multiply",
        }
    }

    fn description(self) -> &'static str {
        match self {
            ArithmeticTool::Add => "This is an addition function that adds 2 numbers together",
            ArithmeticTool::Subtract => "Subtraction function: returns a minus b",
            ArithmeticTool::Multiply => "Multiplication function: returns a times b",
        }
    }

    /// Apply the operation, failing on overflow.
    pub fn apply(self, a: i64, b: i64) -> Option<i64> {
        match self {
            ArithmeticTool::Add => a.checked_add(b),
            ArithmeticTool::Subtract => a.checked_sub(b),
            ArithmeticTool::Multiply => a.checked_mul(b),
        }
    }

    fn operand(self, arguments: &serde_json::Value, key: &str) -> Result<i64> {
        let value = &arguments[key];
        if let Some(n) = value.as_i64() {
            return Ok(n);
        }
        // Models sometimes send whole numbers as floats (e.g. 52.0).
        match value.as_f64() {
            // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
            Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                Ok(f as i64)
            }
            Some(f) if f.fract() == 0.0 => Err(TolkError::tool(
                self.name(),
                format!("Argument '{}' is out of range: {}", key, f),
            )),
            Some(f) => Err(TolkError::tool(
                self.name(),
                format!("Argument '{}' must be an integer, got {}", key, f),
            )),
            None => Err(TolkError::tool(
                self.name(),
                format!("Missing integer argument '{}'", key),
            )),
        }
    }
}

#[async_trait]
impl Tool for ArithmeticTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "a": { "type": "integer" },
                    "b": { "type": "integer" }
                },
                "required": ["a", "b"]
            }),
        }
    }

    async fn call(&self, arguments: &serde_json::Value) -> Result<String> {
        let a = self.operand(arguments, "a")?;
        let b = self.operand(arguments, "b")?;

        self.apply(a, b)
            .map(|n| n.to_string())
            .ok_or_else(|| TolkError::tool(self.name(), format!("Overflow computing {} and {}", a, b)))
    }
}

/// Registry holding `add`, `subtract` and `multiply`.
pub fn arithmetic_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for tool in ArithmeticTool::ALL {
        // Names in ALL are distinct.
        let _ = registry.register(Arc::new(tool));
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_arithmetic_calls() {
        assert_eq!(ArithmeticTool::Add.call(&json!({"a": 40, "b": 12})).await.unwrap(), "52");
        assert_eq!(ArithmeticTool::Multiply.call(&json!({"a": 52, "b": 6})).await.unwrap(), "312");
        assert_eq!(ArithmeticTool::Subtract.call(&json!({"a": 5, "b": 9})).await.unwrap(), "-4");
    }

    #[tokio::test]
    async fn test_whole_floats_accepted() {
        let result = ArithmeticTool::Multiply.call(&json!({"a": 52.0, "b": 6})).await.unwrap();
        assert_eq!(result, "312");
    }

    #[tokio::test]
    async fn test_out_of_range_integers_rejected() {
        let err = ArithmeticTool::Add
            .call(&json!({"a": 9223372036854775808u64, "b": 0}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("out of range"));

        assert!(ArithmeticTool::Add.call(&json!({"a": u64::MAX, "b": 0})).await.is_err());
        assert_eq!(
            ArithmeticTool::Add.call(&json!({"a": i64::MAX, "b": 0})).await.unwrap(),
            i64::MAX.to_string()
        );
    }

    #[tokio::test]
    async fn test_bad_arguments_are_errors() {
        let err = ArithmeticTool::Add.call(&json!({"a": 1})).await.unwrap_err();
        assert!(matches!(err, TolkError::Tool { ref name, .. } if name == "add"));

        assert!(ArithmeticTool::Add.call(&json!({"a": 1.5, "b": 2})).await.is_err());
        assert!(ArithmeticTool::Multiply
            .call(&json!({"a": i64::MAX, "b": 2}))
            .await
            .is_err());
    }
}
