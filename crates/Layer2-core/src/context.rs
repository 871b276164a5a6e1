//! Executor Context - Layer2 통합 인터페이스
//!
//! host 레지스트리/런타임과 설정 소스를 받아 캐시, 게이트, 조회, 도구를
//! 한 번에 조립한다.
//!
//! ## 사용 예시
//! ```ignore
//! let ctx = ExecutorContext::new(host, runtime, settings);
//!
//! let defs = ctx.tools().definitions();
//! let reply = ctx
//!     .call_tool("execute_command", json!({"command": "签到"}), &ToolCallContext::new("42"))
//!     .await;
//!
//! println!("{}", ctx.status().render());
//! ```

use crate::gate::{ExecutionGate, ExecutionRequest, ExecutionResult};
use crate::host::{HostRegistry, HostRuntime};
use crate::operator::{self, StatusReport};
use crate::query::QueryFacade;
use crate::registry::{HandlerCache, RebuildReport};
use crate::tool::{ExecutorTools, ToolCallContext};
use llmexec_foundation::{Result, SettingsSource};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// 실행기 구성 요소 묶음
pub struct ExecutorContext {
    settings: Arc<dyn SettingsSource>,
    cache: Arc<HandlerCache>,
    gate: Arc<ExecutionGate>,
    query: Arc<QueryFacade>,
    tools: ExecutorTools,
}

impl ExecutorContext {
    pub fn new(
        host: Arc<dyn HostRegistry>,
        runtime: Arc<dyn HostRuntime>,
        settings: Arc<dyn SettingsSource>,
    ) -> Self {
        let cache = Arc::new(HandlerCache::new(host));
        let gate = Arc::new(ExecutionGate::new(cache.clone(), settings.clone(), runtime));
        let query = Arc::new(QueryFacade::new(cache.clone()));
        let tools = ExecutorTools::new(gate.clone(), query.clone());

        let config = settings.snapshot();
        info!(
            "LLM executor ready: enabled={}, whitelist={}, blacklist={}, admin_users={}, forward={} ({} chars)",
            config.policy.enabled,
            config.policy.whitelist.len(),
            config.policy.blacklist.len(),
            config.policy.admin_users.len(),
            config.enable_forward,
            config.forward_threshold
        );

        Self {
            settings,
            cache,
            gate,
            query,
            tools,
        }
    }

    pub fn cache(&self) -> &Arc<HandlerCache> {
        &self.cache
    }

    pub fn gate(&self) -> &Arc<ExecutionGate> {
        &self.gate
    }

    pub fn query(&self) -> &Arc<QueryFacade> {
        &self.query
    }

    pub fn tools(&self) -> &ExecutorTools {
        &self.tools
    }

    /// 명령 직접 실행
    pub async fn execute(&self, request: ExecutionRequest) -> ExecutionResult {
        self.gate.execute(request).await
    }

    /// 도구 호출
    pub async fn call_tool(&self, name: &str, input: Value, context: &ToolCallContext) -> String {
        self.tools.call(name, input, context).await
    }

    /// 캐시 새로고침 (운영자 명령)
    pub fn refresh(&self) -> Result<RebuildReport> {
        operator::refresh(&self.cache, self.settings.as_ref())
    }

    /// 상태 보고 (운영자 명령)
    pub fn status(&self) -> StatusReport {
        StatusReport::collect(&self.cache, self.settings.as_ref())
    }
}
