//! Host Traits - host 봇 프레임워크와의 좁은 인터페이스
//!
//! 실행기는 host 내부 객체 그래프를 직접 참조하지 않는다. 캐시 구축 시
//! `HostRegistry::enumerate()`로 얻은 값 복사본만 보관한다.

use super::types::{Delivery, HandlerFault, HostPlugin, Invocation, OutputMessage};
use async_trait::async_trait;
use llmexec_foundation::Result;

// ============================================================================
// HostRegistry - 명령 레지스트리
// ============================================================================

/// host 명령 레지스트리
pub trait HostRegistry: Send + Sync {
    /// 등록된 모든 플러그인과 명령 열거
    ///
    /// 레지스트리를 사용할 수 없으면 `Error::HostUnavailable`을 반환한다.
    fn enumerate(&self) -> Result<Vec<HostPlugin>>;
}

// ============================================================================
// CommandHandler - 명령 실행 단위
// ============================================================================

/// host가 등록한 명령 handler
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// 명령 실행
    ///
    /// 출력 메시지를 순서대로 반환한다. 실패는 `HandlerFault`로 보고한다.
    async fn handle(&self, invocation: &Invocation) -> std::result::Result<Vec<OutputMessage>, HandlerFault>;
}

// ============================================================================
// HostRuntime - 실행/전송 런타임
// ============================================================================

/// host 실행 런타임
///
/// 실제 handler 호출과 채팅 전송을 담당한다. 타임아웃은 런타임 책임이다.
#[async_trait]
pub trait HostRuntime: Send + Sync {
    /// handler 호출 (기본: 그대로 위임)
    async fn invoke(
        &self,
        handler: &dyn CommandHandler,
        invocation: &Invocation,
    ) -> std::result::Result<Vec<OutputMessage>, HandlerFault> {
        handler.handle(invocation).await
    }

    /// 실행 결과를 채팅으로 전송
    async fn deliver(
        &self,
        invocation: &Invocation,
        delivery: Delivery,
    ) -> std::result::Result<(), HandlerFault>;
}
