//! Execution Request

use serde::{Deserialize, Serialize};

/// LLM이 요청한 명령 실행 한 건
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionRequest {
    /// 명령 이름 또는 별칭 (앞의 `/` 하나는 무시)
    pub command: String,

    /// 원본 인자 문자열
    pub args: String,

    /// 요청한 사용자 ID
    pub user_id: String,

    /// Bot 계정으로 실행
    pub as_bot: bool,

    /// 멘션할 사용자 ID 목록 (`@0`, `@1` 자리표시자와 대응)
    pub mentions: Vec<String>,

    /// 답장으로 첨부할 이미지 URL
    pub reply_image: Option<String>,

    /// 요청이 들어온 플랫폼 이름
    pub platform: Option<String>,
}

impl ExecutionRequest {
    pub fn new(command: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    pub fn args(mut self, args: impl Into<String>) -> Self {
        self.args = args.into();
        self
    }

    pub fn as_bot(mut self, as_bot: bool) -> Self {
        self.as_bot = as_bot;
        self
    }

    pub fn mention(mut self, user_id: impl Into<String>) -> Self {
        self.mentions.push(user_id.into());
        self
    }

    pub fn mentions<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mentions.extend(users.into_iter().map(Into::into));
        self
    }

    pub fn reply_image(mut self, url: impl Into<String>) -> Self {
        self.reply_image = Some(url.into());
        self
    }

    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }
}
