//! JSON Lines tool server
//!
//! stdin에서 한 줄에 하나씩 요청을 읽고 stdout에 한 줄씩 응답한다.
//!
//! ```text
//! {"tool": "execute_command", "input": {"command": "签到"}, "sender_id": "42"}
//! {"op": "refresh"}
//! {"op": "status"}
//! ```

use llmexec_core::{ExecutorContext, ToolCallContext};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ServeRequest {
    Tool {
        tool: String,
        #[serde(default)]
        input: Value,
        #[serde(default)]
        sender_id: Option<String>,
        #[serde(default)]
        platform: Option<String>,
    },
    Op {
        op: String,
    },
}

/// 요청 한 줄 처리
pub async fn handle_line(ctx: &ExecutorContext, line: &str, default_sender: &str) -> Value {
    let request: ServeRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            warn!("Malformed request line: {}", e);
            return json!({"success": false, "error": format!("malformed request: {e}")});
        }
    };

    match request {
        ServeRequest::Tool {
            tool,
            input,
            sender_id,
            platform,
        } => {
            let mut call_ctx =
                ToolCallContext::new(sender_id.unwrap_or_else(|| default_sender.to_string()));
            call_ctx.platform = platform;

            let input = if input.is_null() { json!({}) } else { input };
            let raw = ctx.call_tool(&tool, input, &call_ctx).await;
            serde_json::from_str(&raw).unwrap_or(Value::String(raw))
        }
        ServeRequest::Op { op } => match op.as_str() {
            "refresh" => match ctx.refresh() {
                Ok(report) => json!({"success": true, "report": report}),
                Err(e) => json!({"success": false, "error": e.to_string(), "error_kind": "rebuild_error"}),
            },
            "status" => json!({"success": true, "status": ctx.status()}),
            "tools" => json!({"success": true, "tools": ctx.tools().definitions()}),
            other => json!({"success": false, "error": format!("unknown op: {other}")}),
        },
    }
}

/// stdin이 닫힐 때까지 처리
pub async fn run(ctx: &ExecutorContext, default_sender: &str) -> anyhow::Result<()> {
    info!("Serving tool calls on stdin");

    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = handle_line(ctx, line, default_sender).await;
        stdout.write_all(response.to_string().as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    info!("stdin closed, stopping");
    Ok(())
}
