//! Built-in demo tools.

use std::time::Duration;

use engine::{ToolError, ToolSet};
use serde_json::{Value, json};

/// Registry with the demo tools: `echo`, `add`, `sleep`, `fail`.
pub fn builtin() -> ToolSet {
    ToolSet::new()
        .with("echo", |args: Value| async move {
            let text = string_arg(&args, "text")?;
            Ok::<_, ToolError>(json!(format!("echo:{text}")))
        })
        .with("add", |args: Value| async move {
            let a = number_arg(&args, "a")?;
            let b = number_arg(&args, "b")?;
            Ok::<_, ToolError>(json!(a + b))
        })
        .with("sleep", |args: Value| async move {
            let ms = args
                .get("ms")
                .and_then(Value::as_u64)
                .ok_or_else(|| ToolError::execution("'ms' must be a non-negative integer"))?;
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok::<_, ToolError>(json!(format!("slept {ms}")))
        })
        .with("fail", |args: Value| async move {
            let message = args
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("requested failure");
            Err(ToolError::execution(message))
        })
}

fn string_arg(args: &Value, key: &str) -> Result<String, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ToolError::execution(format!("'{key}' must be a string")))
}

fn number_arg(args: &Value, key: &str) -> Result<f64, ToolError> {
    args.get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| ToolError::execution(format!("'{key}' must be a number")))
}
