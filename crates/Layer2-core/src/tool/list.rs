//! list_executable_commands 도구

use super::{LlmTool, ToolCallContext};
use crate::query::QueryFacade;
use crate::registry::HandlerCache;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// list_executable_commands 입력
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListCommandsInput {
    /// 플러그인 이름 (비어 있으면 전체)
    pub category: String,
}

impl ListCommandsInput {
    pub fn category(&self) -> Option<&str> {
        Some(self.category.trim()).filter(|c| !c.is_empty())
    }
}

/// 명령 목록 도구
pub struct ListCommandsTool {
    query: Arc<QueryFacade>,
    cache: Arc<HandlerCache>,
}

impl ListCommandsTool {
    pub const NAME: &'static str = "list_executable_commands";

    pub fn new(query: Arc<QueryFacade>, cache: Arc<HandlerCache>) -> Self {
        Self { query, cache }
    }

    /// 목록 JSON (`success`, `total_count`, `plugins`)
    pub fn render(&self, category: Option<&str>) -> Value {
        if let Err(e) = self.cache.ensure_built() {
            return json!({
                "success": false,
                "error": e.to_string(),
                "error_kind": "rebuild_error",
            });
        }

        let plugins = self.query.grouped(category);
        let total: usize = plugins.values().map(Vec::len).sum();
        json!({
            "success": true,
            "total_count": total,
            "plugins": plugins,
        })
    }
}

#[async_trait]
impl LlmTool for ListCommandsTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "List commands that execute_command can run, grouped by plugin. \
         Optionally filter by exact plugin name."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "category": {
                    "type": "string",
                    "description": "Plugin name to filter by (optional)"
                }
            }
        })
    }

    async fn call(&self, input: Value, _context: &ToolCallContext) -> String {
        let input = if input.is_null() { json!({}) } else { input };
        let parsed: ListCommandsInput = match serde_json::from_value(input) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("Rejected list_executable_commands input: {}", e);
                return json!({
                    "success": false,
                    "error": format!("invalid input: {e}"),
                    "error_kind": "invalid_request",
                })
                .to_string();
            }
        };
        let category = parsed.category();
        info!("Listing executable commands, category: {}", category.unwrap_or("all"));

        let body = self.render(category);
        serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string())
    }
}
