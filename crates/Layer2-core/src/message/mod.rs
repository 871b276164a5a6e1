//! Message composer
//!
//! LLM이 넘긴 명령/인자를 host handler가 받는 채팅 메시지 형태로 만든다.
//!
//! - 인자는 공백 기준으로 토큰화 (빈 인자 = 토큰 0개)
//! - 멘션 목록이 있고 인자에 `@0`, `@1` 같은 자리표시자가 있으면 그 위치에
//!   멘션을 넣는다. 자리표시자가 없으면 명령 바로 뒤에 모든 멘션을 넣는다.
//! - 답장 이미지가 있으면 맨 앞에 reply 구성 요소를 둔다.

use serde::{Deserialize, Serialize};

/// 명령 접두사
pub const COMMAND_PREFIX: char = '/';

/// 채팅 메시지 구성 요소
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageSegment {
    /// 이미지를 담은 답장(인용)
    Reply { image_url: String },
    /// 일반 텍스트
    Text { text: String },
    /// 사용자 멘션
    Mention { user_id: String },
}

impl MessageSegment {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn mention(user_id: impl Into<String>) -> Self {
        Self::Mention {
            user_id: user_id.into(),
        }
    }
}

/// 인자 문자열을 토큰으로 분리
pub fn split_args(args: &str) -> Vec<String> {
    args.split_whitespace().map(String::from).collect()
}

/// 명령 이름 앞의 접두사 하나 제거
pub fn strip_prefix(name: &str) -> &str {
    name.strip_prefix(COMMAND_PREFIX).unwrap_or(name)
}

/// handler가 보게 될 메시지 문자열
pub fn command_text(command: &str, args: &str) -> String {
    if args.is_empty() {
        format!("{COMMAND_PREFIX}{command}")
    } else {
        format!("{COMMAND_PREFIX}{command} {args}")
    }
}

/// `@N` 자리표시자이면 멘션 인덱스 반환
fn placeholder_index(token: &str, mention_count: usize) -> Option<usize> {
    let digits = token.strip_prefix('@')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<usize>().ok().filter(|&i| i < mention_count)
}

/// 메시지 구성 요소 생성
pub fn compose(
    command: &str,
    args: &str,
    mentions: &[String],
    reply_image: Option<&str>,
) -> Vec<MessageSegment> {
    let mut segments = Vec::new();

    if let Some(url) = reply_image.filter(|u| !u.is_empty()) {
        segments.push(MessageSegment::Reply {
            image_url: url.to_string(),
        });
    }

    if mentions.is_empty() || args.is_empty() {
        segments.push(MessageSegment::text(command_text(command, args)));
        segments.extend(mentions.iter().map(MessageSegment::mention));
        return segments;
    }

    let has_placeholders = (0..mentions.len()).any(|i| args.contains(&format!("@{i}")));

    segments.push(MessageSegment::text(format!("{COMMAND_PREFIX}{command}")));

    if !has_placeholders {
        segments.extend(mentions.iter().map(MessageSegment::mention));
        segments.push(MessageSegment::text(format!(" {args}")));
        return segments;
    }

    let mut buffer: Vec<&str> = Vec::new();
    for token in args.split_whitespace() {
        match placeholder_index(token, mentions.len()) {
            Some(idx) => {
                if !buffer.is_empty() {
                    segments.push(MessageSegment::text(format!(" {}", buffer.join(" "))));
                    buffer.clear();
                }
                segments.push(MessageSegment::mention(&mentions[idx]));
            }
            None => buffer.push(token),
        }
    }
    if !buffer.is_empty() {
        segments.push(MessageSegment::text(format!(" {}", buffer.join(" "))));
    }

    segments
}
