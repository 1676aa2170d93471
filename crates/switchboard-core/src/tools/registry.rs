//! Tool registry for LLM function calling
//!
//! The ToolRegistry is the central component for:
//! - Holding every executable tool's definition and executor
//! - Looking tools up by name for the orchestration loop
//! - Executing tools and wrapping the outcome in a uniform envelope
//!
//! Tools are registered through `&mut self` while the registry is being
//! built; once it is shared behind an `Arc`, lookups need no locking.

use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::executor::{FnExecutor, ToolError, ToolExecutor, ToolResult};
use crate::logging::SharedLogger;
use crate::types::{FunctionCall, ToolDefinition, ToolExecutionResult};

/// A registered tool
struct ToolEntry {
    definition: ToolDefinition,
    executor: Arc<dyn ToolExecutor>,
}

/// Tool registry for managing available tools
pub struct ToolRegistry {
    /// Entries in registration order
    entries: Vec<ToolEntry>,
    /// Name -> position in `entries`
    index: HashMap<String, usize>,
    logger: SharedLogger,
}

impl ToolRegistry {
    /// Create an empty tool registry
    pub fn new(logger: SharedLogger) -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            logger,
        }
    }

    /// Register a tool, replacing any tool with the same name
    ///
    /// A replaced tool keeps its original position. Returns `true` when an
    /// existing registration was replaced.
    pub fn register(&mut self, definition: ToolDefinition, executor: Arc<dyn ToolExecutor>) -> bool {
        let name = definition.name.clone();
        let entry = ToolEntry { definition, executor };

        if let Some(&slot) = self.index.get(&name) {
            self.logger.warn(&format!("[ToolRegistry] Replacing tool: {}", name));
            self.entries[slot] = entry;
            return true;
        }

        self.logger.debug(&format!("[ToolRegistry] Registered tool: {}", name));
        self.index.insert(name, self.entries.len());
        self.entries.push(entry);
        false
    }

    /// Register a tool backed by an async closure
    pub fn register_fn<F, Fut>(&mut self, definition: ToolDefinition, func: F) -> bool
    where
        F: Fn(String, Value) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ToolResult<Value>> + Send + 'static,
    {
        self.register(definition, Arc::new(FnExecutor::new(func)))
    }

    /// Every definition in registration order
    pub fn get_all_definitions(&self) -> Vec<ToolDefinition> {
        self.entries.iter().map(|e| e.definition.clone()).collect()
    }

    /// Look up a definition by name
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.index.get(name).map(|&slot| &self.entries[slot].definition)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Get count of registered tools
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Execute a tool by name
    ///
    /// Never fails: unknown names, bad arguments, executor errors, panics
    /// and timeouts all come back as `success=false` results. On timeout the
    /// executor's future is dropped.
    pub async fn execute(
        &self,
        name: &str,
        user_id: &str,
        params: Value,
        timeout: Duration,
    ) -> ToolExecutionResult {
        let start = Instant::now();
        let outcome = self.run(name, user_id, params, timeout).await;
        let elapsed = elapsed_ms(start);

        let result = match outcome {
            Ok(value) => ToolExecutionResult::success(name, value, elapsed),
            Err(e) => ToolExecutionResult::failure(name, e.kind(), e.to_string(), elapsed),
        };
        self.logger.debug(&format!(
            "[ToolRegistry] {} finished: success={}, {}ms",
            name, result.success, result.execution_time_ms
        ));
        result
    }

    /// Lookup, argument check and guarded execution; every failure is a `ToolError`
    async fn run(&self, name: &str, user_id: &str, params: Value, timeout: Duration) -> ToolResult<Value> {
        let Some(&slot) = self.index.get(name) else {
            self.logger.warn(&format!("[ToolRegistry] Unknown tool requested: {}", name));
            return Err(ToolError::UnknownTool(name.to_string()));
        };
        let entry = &self.entries[slot];

        let params = check_arguments(&entry.definition, params).map_err(|e| {
            self.logger.warn(&format!("[ToolRegistry] {} rejected arguments: {}", name, e));
            e
        })?;

        self.logger.info(&format!("[ToolRegistry] Calling tool: {}", name));

        let call = AssertUnwindSafe(entry.executor.execute(user_id, params)).catch_unwind();
        match tokio::time::timeout(timeout, call).await {
            Err(_) => {
                let limit = timeout.as_millis() as u64;
                self.logger.warn(&format!("[ToolRegistry] {} timed out after {}ms", name, limit));
                Err(ToolError::Timeout(limit))
            }
            Ok(Err(panic)) => {
                let message = panic_message(panic);
                self.logger.error(&format!("[ToolRegistry] {} panicked: {}", name, message));
                Err(ToolError::Execution(message))
            }
            Ok(Ok(Err(e))) => {
                self.logger.warn(&format!("[ToolRegistry] {} failed: {}", name, e));
                Err(e)
            }
            Ok(Ok(Ok(value))) => Ok(value),
        }
    }

    /// Execute a function call emitted by a model
    pub async fn execute_call(&self, call: &FunctionCall, user_id: &str, timeout: Duration) -> ToolExecutionResult {
        self.execute(&call.name, user_id, call.arguments.clone(), timeout).await
    }
}

/// Arguments must be an object holding every `required` key
///
/// `null` is accepted as "no arguments" since some models send it for
/// parameterless tools.
fn check_arguments(definition: &ToolDefinition, params: Value) -> ToolResult<Value> {
    let params = match params {
        Value::Null => Value::Object(Default::default()),
        Value::Object(_) => params,
        other => {
            return Err(ToolError::invalid_arguments(format!(
                "expected an object, got {}",
                json_type_name(&other)
            )))
        }
    };

    let missing: Vec<&str> = definition
        .required_params()
        .into_iter()
        .filter(|key| params.get(*key).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(ToolError::invalid_arguments(format!(
            "missing required: {}",
            missing.join(", ")
        )));
    }

    Ok(params)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("tool panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("tool panicked: {}", s)
    } else {
        "tool panicked".to_string()
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
