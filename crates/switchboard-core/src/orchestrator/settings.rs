//! Orchestration loop settings

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorSettings {
    /// Cap on prefiltered tools (core tools may exceed it)
    pub max_tools: usize,
    pub tool_timeout_ms: u64,
    /// Covers the whole turn, tool calls and follow-up included
    pub turn_timeout_ms: u64,
    /// Used when the request has none
    pub temperature: f32,
    /// Used when the request has none
    pub max_tokens: u32,
    /// Prepended when the conversation has no system message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_tools: 8,
            tool_timeout_ms: 10_000,
            turn_timeout_ms: 60_000,
            temperature: 0.7,
            max_tokens: 1024,
            system_prompt: None,
        }
    }
}

impl OrchestratorSettings {
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_millis(self.tool_timeout_ms)
    }

    pub fn turn_timeout(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_ms)
    }
}
