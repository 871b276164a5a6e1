//! execute_command 도구

use super::{LlmTool, ToolCallContext};
use crate::gate::{ExecutionGate, ExecutionRequest, ExecutionResult};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// execute_command 입력
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExecuteInput {
    pub command: String,

    pub args: String,

    /// 멘션할 사용자 ID (문자열 또는 숫자)
    #[serde(deserialize_with = "user_ids")]
    pub at_user_list: Vec<String>,

    pub reply_image_url: String,

    pub as_bot: bool,
}

fn user_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect())
}

impl ExecuteInput {
    pub fn into_request(self, context: &ToolCallContext) -> ExecutionRequest {
        let mut request = ExecutionRequest::new(self.command, context.sender_id.clone())
            .args(self.args.trim())
            .as_bot(self.as_bot)
            .mentions(self.at_user_list);

        let url = self.reply_image_url.trim();
        if !url.is_empty() {
            request = request.reply_image(url);
        }
        if let Some(platform) = &context.platform {
            request = request.platform(platform.clone());
        }
        request
    }
}

/// 명령 실행 도구
pub struct ExecuteCommandTool {
    gate: Arc<ExecutionGate>,
}

impl ExecuteCommandTool {
    pub const NAME: &'static str = "execute_command";

    pub fn new(gate: Arc<ExecutionGate>) -> Self {
        Self { gate }
    }
}

#[async_trait]
impl LlmTool for ExecuteCommandTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Execute a chat command registered by another plugin on behalf of the user. \
         Use list_executable_commands first when unsure of the exact name."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "Command name or alias, without the leading '/'"
                },
                "args": {
                    "type": "string",
                    "description": "Argument string; use @0, @1 to place mentioned users"
                },
                "at_user_list": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "User IDs to mention, in placeholder order"
                },
                "reply_image_url": {
                    "type": "string",
                    "description": "Image URL attached as a quoted reply"
                },
                "as_bot": {
                    "type": "boolean",
                    "description": "Run the command as the bot account instead of the user"
                }
            },
            "required": ["command"]
        })
    }

    async fn call(&self, input: Value, context: &ToolCallContext) -> String {
        let parsed: ExecuteInput = match serde_json::from_value(input) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("Rejected execute_command input: {}", e);
                return ExecutionResult::invalid_request("", format!("invalid input: {e}"))
                    .to_json_string();
            }
        };

        let request = parsed.into_request(context);
        self.gate.execute(request).await.to_json_string()
    }
}
