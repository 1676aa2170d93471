//! Tool executor trait and errors

use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::marker::PhantomData;
use thiserror::Error;

use crate::types::ToolErrorKind;

/// Failure reported by a tool executor (or by the registry around it)
///
/// `Display` is the text placed in the result envelope's `error` field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    /// No tool registered under this name
    #[error("unknown tool")]
    UnknownTool(String),

    /// Arguments did not match the tool's schema
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool ran and failed
    #[error("{0}")]
    Execution(String),

    /// The tool did not finish within the given milliseconds
    #[error("timeout")]
    Timeout(u64),
}

impl ToolError {
    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments(message.into())
    }

    /// Kind recorded in the result envelope
    pub fn kind(&self) -> ToolErrorKind {
        match self {
            Self::UnknownTool(_) => ToolErrorKind::UnknownTool,
            Self::InvalidArguments(_) => ToolErrorKind::InvalidArguments,
            Self::Execution(_) => ToolErrorKind::Execution,
            Self::Timeout(_) => ToolErrorKind::Timeout,
        }
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidArguments(e.to_string())
    }
}

pub type ToolResult<T> = Result<T, ToolError>;

/// Something that can run a tool on behalf of a user
///
/// Executors are opaque collaborators: they receive the already-checked
/// arguments and return structured JSON or a typed error.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, user_id: &str, params: Value) -> ToolResult<Value>;
}

/// Adapts an async closure into a `ToolExecutor`
///
/// ```rust,ignore
/// let exec = FnExecutor::new(|user_id: String, params: Value| async move {
///     Ok(json!({ "user": user_id, "echo": params }))
/// });
/// ```
pub struct FnExecutor<F, Fut> {
    func: F,
    _marker: PhantomData<fn() -> Fut>,
}

impl<F, Fut> FnExecutor<F, Fut>
where
    F: Fn(String, Value) -> Fut + Send + Sync,
    Fut: Future<Output = ToolResult<Value>> + Send,
{
    pub fn new(func: F) -> Self {
        Self {
            func,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<F, Fut> ToolExecutor for FnExecutor<F, Fut>
where
    F: Fn(String, Value) -> Fut + Send + Sync,
    Fut: Future<Output = ToolResult<Value>> + Send,
{
    async fn execute(&self, user_id: &str, params: Value) -> ToolResult<Value> {
        (self.func)(user_id.to_string(), params).await
    }
}
