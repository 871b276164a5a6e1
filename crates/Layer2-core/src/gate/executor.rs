//! Execution Gate - 조회, 정책 판단, 실행을 하나의 흐름으로
//!
//! ```text
//! request ─▶ resolve ─▶ decide ─▶ invoke ─▶ deliver ─▶ ExecutionResult
//!              │          │         │
//!              ▼          ▼         ▼
//!        unknown_command  permission_denied  execution_error
//! ```
//!
//! 어떤 실패도 호출자에게 전파되지 않는다. 모든 결과는 `ExecutionResult`다.

use super::delivery::{deliver_outputs, ForwardPolicy};
use super::request::ExecutionRequest;
use super::result::{ErrorKind, ExecutionResult, Payload};
use crate::host::{HandlerFault, HostRuntime, Identity, Invocation, OutputMessage};
use crate::message::{command_text, compose, split_args, strip_prefix};
use crate::registry::{CommandDescriptor, HandlerCache};
use futures::FutureExt;
use llmexec_foundation::{ExecutorConfig, PolicyEngine, SettingsSource, Verdict};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 명령 이름이 비었을 때 메시지
pub const MISSING_COMMAND: &str = "missing required parameter: command";

/// 명령 실행 게이트
pub struct ExecutionGate {
    cache: Arc<HandlerCache>,
    settings: Arc<dyn SettingsSource>,
    runtime: Arc<dyn HostRuntime>,
    engine: PolicyEngine,
}

impl ExecutionGate {
    pub fn new(
        cache: Arc<HandlerCache>,
        settings: Arc<dyn SettingsSource>,
        runtime: Arc<dyn HostRuntime>,
    ) -> Self {
        cache.set_skip_plugins(settings.snapshot().skip_plugins);
        Self {
            cache,
            settings,
            runtime,
            engine: PolicyEngine::new(),
        }
    }

    pub fn cache(&self) -> &Arc<HandlerCache> {
        &self.cache
    }

    pub fn settings(&self) -> &Arc<dyn SettingsSource> {
        &self.settings
    }

    /// 명령 실행
    pub async fn execute(&self, request: ExecutionRequest) -> ExecutionResult {
        let name = strip_prefix(request.command.trim()).trim().to_string();
        if name.is_empty() {
            warn!("Execution request without command from {}", request.user_id);
            return ExecutionResult::invalid_request(name, MISSING_COMMAND);
        }

        info!(
            "Execute request: command={}, args={:?}, user={}, as_bot={}",
            name, request.args, request.user_id, request.as_bot
        );

        // 요청당 한 번만 읽는다
        let config = self.settings.snapshot();

        if self.cache.needs_build() {
            self.cache.set_skip_plugins(config.skip_plugins.clone());
        }
        if let Err(e) = self.cache.ensure_built() {
            return ExecutionResult::failure(name, ErrorKind::RebuildError, e.to_string());
        }

        let Some(descriptor) = self.cache.resolve(&name) else {
            info!("Unknown command: {}", name);
            return ExecutionResult::unknown_command(name);
        };

        let policy = config.policy();
        match self.engine.decide(descriptor.as_ref(), &request.user_id, &policy) {
            Verdict::Allow(grant) => {
                debug!("Command {} allowed for {} ({:?})", descriptor.name, request.user_id, grant);
            }
            Verdict::Deny(reason) => {
                warn!(
                    "Command {} denied for {}: {}",
                    descriptor.name, request.user_id, reason
                );
                return ExecutionResult::failure(
                    descriptor.name.clone(),
                    ErrorKind::PermissionDenied,
                    reason.as_str(),
                );
            }
        }

        let invocation = build_invocation(&descriptor, &request, &config);
        debug!("Invoking {} with message {:?}", descriptor.name, invocation.message);

        let outputs = match self.invoke(&descriptor, &invocation).await {
            Ok(outputs) => outputs,
            Err(fault) => {
                error!("Command {} failed: {}", descriptor.name, fault);
                return ExecutionResult::failure(
                    descriptor.name.clone(),
                    ErrorKind::ExecutionError,
                    fault.to_string(),
                );
            }
        };

        deliver_outputs(
            self.runtime.as_ref(),
            &invocation,
            &outputs,
            &ForwardPolicy::from_config(&config),
        )
        .await;

        let texts: Vec<String> = outputs.iter().flat_map(|m| m.texts()).map(String::from).collect();
        let images: Vec<String> = outputs.iter().flat_map(|m| m.images()).map(String::from).collect();

        info!(
            "Command {} succeeded (as {}): {} text(s), {} image(s)",
            descriptor.name,
            invocation.identity.as_str(),
            texts.len(),
            images.len()
        );

        ExecutionResult::success(
            descriptor.name.clone(),
            Payload::from_outputs(texts, images, &request.args, invocation.identity),
        )
    }

    /// handler 호출 - panic도 실패로 변환
    async fn invoke(
        &self,
        descriptor: &CommandDescriptor,
        invocation: &Invocation,
    ) -> Result<Vec<OutputMessage>, HandlerFault> {
        let call = self.runtime.invoke(descriptor.handler.as_ref(), invocation);
        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => Err(HandlerFault::Panicked(panic_message(panic.as_ref()))),
        }
    }
}

fn build_invocation(
    descriptor: &CommandDescriptor,
    request: &ExecutionRequest,
    config: &ExecutorConfig,
) -> Invocation {
    let (identity, sender_id) = if request.as_bot {
        (Identity::Bot, config.bot_user_id.clone())
    } else {
        (Identity::User, request.user_id.clone())
    };

    Invocation {
        command: descriptor.name.clone(),
        message: command_text(&descriptor.name, &request.args),
        tokens: split_args(&request.args),
        segments: compose(
            &descriptor.name,
            &request.args,
            &request.mentions,
            request.reply_image.as_deref(),
        ),
        sender_id,
        requested_by: request.user_id.clone(),
        identity,
        platform: request.platform.clone(),
    }
}

pub(super) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
