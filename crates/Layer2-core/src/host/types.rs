//! Host 경계 타입 - host 레지스트리/런타임과 주고받는 값들

use super::traits::CommandHandler;
use crate::message::MessageSegment;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Handler 참조 (host가 소유하는 실행 단위)
pub type HandlerRef = Arc<dyn CommandHandler>;

// ============================================================================
// 레지스트리 열거 결과
// ============================================================================

/// host에 등록된 플러그인 하나
#[derive(Debug, Clone)]
pub struct HostPlugin {
    /// 플러그인 이름 (목록 그룹화 기준)
    pub name: String,
    /// 활성화 여부 - 비활성 플러그인은 캐시에 들어가지 않음
    pub activated: bool,
    /// 플러그인이 등록한 명령들
    pub commands: Vec<RawCommand>,
}

impl HostPlugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            activated: true,
            commands: Vec::new(),
        }
    }

    pub fn activated(mut self, activated: bool) -> Self {
        self.activated = activated;
        self
    }

    pub fn command(mut self, command: RawCommand) -> Self {
        self.commands.push(command);
        self
    }
}

/// host 레지스트리의 원시 명령 항목
///
/// 명령 그룹은 `subcommands`를 가진다. 하위 명령은 `"<group> <sub>"` 이름으로
/// 색인된다.
#[derive(Clone)]
pub struct RawCommand {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: Option<String>,
    pub admin_only: bool,
    pub handler: HandlerRef,
    pub subcommands: Vec<RawCommand>,
}

impl RawCommand {
    pub fn new(name: impl Into<String>, handler: HandlerRef) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: None,
            admin_only: false,
            handler,
            subcommands: Vec::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn admin_only(mut self, admin_only: bool) -> Self {
        self.admin_only = admin_only;
        self
    }

    pub fn subcommand(mut self, sub: RawCommand) -> Self {
        self.subcommands.push(sub);
        self
    }
}

impl fmt::Debug for RawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawCommand")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("admin_only", &self.admin_only)
            .field("subcommands", &self.subcommands)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// 실행
// ============================================================================

/// 실행 주체
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Identity {
    /// 요청한 사용자를 대리해 실행
    User,
    /// Bot 자신의 계정으로 실행
    Bot,
}

impl Identity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

/// handler에 전달되는 호출 정보
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// 정식 명령 이름
    pub command: String,
    /// handler가 보게 될 메시지 문자열 (`"/<command> <args>"`)
    pub message: String,
    /// 공백 기준으로 나눈 인자 (빈 인자 = 0개)
    pub tokens: Vec<String>,
    /// 메시지 구성 요소 (멘션, 답장 이미지 포함)
    pub segments: Vec<MessageSegment>,
    /// handler가 보게 될 발신자 ID
    pub sender_id: String,
    /// 실제로 요청한 사용자 ID
    pub requested_by: String,
    pub identity: Identity,
    pub platform: Option<String>,
}

/// handler 출력 조각
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum OutputChunk {
    Text(String),
    Image(String),
}

/// handler가 내보낸 메시지 하나
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputMessage {
    pub chunks: Vec<OutputChunk>,
}

impl OutputMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            chunks: vec![OutputChunk::Text(text.into())],
        }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self {
            chunks: vec![OutputChunk::Image(url.into())],
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.chunks.push(OutputChunk::Text(text.into()));
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.chunks.push(OutputChunk::Image(url.into()));
        self
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.chunks.iter().filter_map(|c| match c {
            OutputChunk::Text(t) if !t.is_empty() => Some(t.as_str()),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = &str> {
        self.chunks.iter().filter_map(|c| match c {
            OutputChunk::Image(url) if !url.is_empty() => Some(url.as_str()),
            _ => None,
        })
    }
}

/// 채팅으로 결과를 보내는 방식
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// 메시지 하나를 그대로 전송
    Single(OutputMessage),
    /// 모든 조각을 하나의 합쳐진(forward) 메시지로 전송
    Forward(Vec<OutputChunk>),
}

/// handler 실행 실패
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerFault {
    /// handler가 보고한 에러
    #[error("{0}")]
    Failed(String),

    /// handler가 panic으로 종료됨
    #[error("handler panicked: {0}")]
    Panicked(String),

    /// host 런타임이 전송에 실패함
    #[error("delivery failed: {0}")]
    Delivery(String),
}

impl HandlerFault {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
