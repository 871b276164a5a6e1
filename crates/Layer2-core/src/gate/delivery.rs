//! 실행 결과 채팅 전송
//!
//! 긴 텍스트는 지원 플랫폼에서 하나의 합쳐진 메시지로 보낸다. 합쳐 보내기가
//! 실패하면 메시지별 전송으로 되돌아간다. 전송 실패는 실행 결과를 바꾸지 않는다.

use super::executor::panic_message;
use crate::host::{Delivery, HandlerFault, HostRuntime, Invocation, OutputChunk, OutputMessage};
use futures::FutureExt;
use llmexec_foundation::ExecutorConfig;
use std::panic::AssertUnwindSafe;
use tracing::{debug, error, warn};

/// 전송 방식 결정에 필요한 설정 일부
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardPolicy {
    pub enabled: bool,
    pub threshold: usize,
    pub platforms: Vec<String>,
}

impl ForwardPolicy {
    pub fn from_config(config: &ExecutorConfig) -> Self {
        Self {
            enabled: config.enable_forward,
            threshold: config.forward_threshold,
            platforms: config.forward_platforms.iter().cloned().collect(),
        }
    }

    /// 합쳐 보내기 여부 (텍스트 길이는 문자 수 기준)
    pub fn should_forward(&self, text_len: usize, platform: Option<&str>) -> bool {
        self.enabled
            && text_len > self.threshold
            && platform.is_some_and(|p| self.platforms.iter().any(|allowed| allowed == p))
    }
}

/// 출력 텍스트 총 길이 (문자 수)
pub fn total_text_len(outputs: &[OutputMessage]) -> usize {
    outputs
        .iter()
        .flat_map(|m| m.texts())
        .map(|t| t.chars().count())
        .sum()
}

/// 전송 한 번 (런타임 panic은 전송 실패로 바꾼다)
async fn deliver_once(
    runtime: &dyn HostRuntime,
    invocation: &Invocation,
    delivery: Delivery,
) -> Result<(), HandlerFault> {
    match AssertUnwindSafe(runtime.deliver(invocation, delivery)).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!("Host runtime panicked while delivering {}: {}", invocation.command, message);
            Err(HandlerFault::Delivery(format!("runtime panicked: {message}")))
        }
    }
}

/// handler 출력을 채팅으로 전송
pub async fn deliver_outputs(
    runtime: &dyn HostRuntime,
    invocation: &Invocation,
    outputs: &[OutputMessage],
    policy: &ForwardPolicy,
) {
    if outputs.is_empty() {
        return;
    }

    let text_len = total_text_len(outputs);
    if policy.should_forward(text_len, invocation.platform.as_deref()) {
        debug!(
            "Text length {} exceeds threshold {}, forwarding as one message",
            text_len, policy.threshold
        );

        let chunks: Vec<OutputChunk> = outputs.iter().flat_map(|m| m.chunks.iter().cloned()).collect();
        match deliver_once(runtime, invocation, Delivery::Forward(chunks)).await {
            Ok(()) => return,
            Err(e) => error!("Forward delivery failed, sending individually: {}", e),
        }
    }

    for message in outputs {
        if let Err(e) = deliver_once(runtime, invocation, Delivery::Single(message.clone())).await
        {
            warn!("Failed to deliver result of {}: {}", invocation.command, e);
        }
    }
}
