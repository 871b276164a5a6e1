//! LLM Tools - 에이전트에게 노출되는 두 도구
//!
//! - `execute_command`: 명령 하나 실행 (ExecutionGate)
//! - `list_executable_commands`: 명령 목록 (QueryFacade)
//!
//! 두 도구 모두 JSON 문자열을 반환하고 실패도 JSON으로 보고한다.

mod execute;
mod list;

pub use execute::{ExecuteCommandTool, ExecuteInput};
pub use list::{ListCommandsInput, ListCommandsTool};

use crate::gate::ExecutionGate;
use crate::query::QueryFacade;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

// ============================================================================
// LlmTool trait
// ============================================================================

/// 도구 호출 문맥 (호출한 대화의 발신자/플랫폼)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallContext {
    pub sender_id: String,
    pub platform: Option<String>,
}

impl ToolCallContext {
    pub fn new(sender_id: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            platform: None,
        }
    }

    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }
}

/// 에이전트에게 노출되는 도구
#[async_trait]
pub trait LlmTool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// 입력 JSON Schema
    fn schema(&self) -> Value;

    /// 호출 - 결과는 항상 JSON 문자열
    async fn call(&self, input: Value, context: &ToolCallContext) -> String;
}

/// 도구 정의 (에이전트에 등록할 때 사용)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

// ============================================================================
// ExecutorTools
// ============================================================================

/// 두 도구 묶음
pub struct ExecutorTools {
    tools: Vec<Arc<dyn LlmTool>>,
}

impl ExecutorTools {
    pub fn new(gate: Arc<ExecutionGate>, query: Arc<QueryFacade>) -> Self {
        let cache = gate.cache().clone();
        Self {
            tools: vec![
                Arc::new(ExecuteCommandTool::new(gate)),
                Arc::new(ListCommandsTool::new(query, cache)),
            ],
        }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.schema(),
            })
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn LlmTool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// 이름으로 도구 호출
    pub async fn call(&self, name: &str, input: Value, context: &ToolCallContext) -> String {
        match self.get(name) {
            Some(tool) => tool.call(input, context).await,
            None => {
                warn!("Unknown tool requested: {}", name);
                json!({
                    "success": false,
                    "error": format!("unknown tool: {name}"),
                    "error_kind": "invalid_request",
                })
                .to_string()
            }
        }
    }
}
