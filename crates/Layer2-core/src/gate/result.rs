//! Execution Result - 도구 호출자에게 돌려주는 구조화된 결과

use crate::host::Identity;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

/// 실패 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// 현재 스냅샷에 없는 이름
    UnknownCommand,
    /// 정책 거부
    PermissionDenied,
    /// handler 실패 또는 panic
    ExecutionError,
    /// host 레지스트리 열거 실패
    RebuildError,
    /// 필수 인자 누락
    InvalidRequest,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "unknown_command",
            Self::PermissionDenied => "permission_denied",
            Self::ExecutionError => "execution_error",
            Self::RebuildError => "rebuild_error",
            Self::InvalidRequest => "invalid_request",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 성공 결과 내용
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// 에이전트에게 보여줄 텍스트
    pub text: String,
    pub images: Vec<String>,
    /// 원본 인자 (비어 있으면 None)
    pub args: Option<String>,
    pub executed_as: Identity,
}

impl Payload {
    /// handler 출력으로 payload 생성
    pub fn from_outputs(
        texts: Vec<String>,
        images: Vec<String>,
        args: &str,
        executed_as: Identity,
    ) -> Self {
        let text = if !texts.is_empty() {
            texts.join("\n")
        } else if !images.is_empty() {
            format!("command returned {} image(s)", images.len())
        } else {
            "command completed with no output".to_string()
        };

        Self {
            text,
            images,
            args: (!args.is_empty()).then(|| args.to_string()),
            executed_as,
        }
    }
}

/// 명령 실행 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    Success {
        command: String,
        payload: Payload,
    },
    Failure {
        command: String,
        kind: ErrorKind,
        message: String,
    },
}

impl ExecutionResult {
    pub fn success(command: impl Into<String>, payload: Payload) -> Self {
        Self::Success {
            command: command.into(),
            payload,
        }
    }

    pub fn failure(command: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Failure {
            command: command.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn unknown_command(command: impl Into<String>) -> Self {
        let command = command.into();
        let message = format!("unknown command: {command}");
        Self::failure(command, ErrorKind::UnknownCommand, message)
    }

    pub fn invalid_request(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::failure(command, ErrorKind::InvalidRequest, message)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn command(&self) -> &str {
        match self {
            Self::Success { command, .. } | Self::Failure { command, .. } => command,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }

    /// 도구 응답 JSON
    ///
    /// 성공: `success`, `command`, `args`, `result`, `images`(있을 때), `executed_as`
    /// 실패: `success`, `command`, `error`, `error_kind`
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        match self {
            Self::Success { command, payload } => {
                obj.insert("success".into(), Value::Bool(true));
                obj.insert("command".into(), json!(command));
                obj.insert("args".into(), json!(payload.args));
                obj.insert("result".into(), json!(payload.text));
                if !payload.images.is_empty() {
                    obj.insert("images".into(), json!(payload.images));
                }
                obj.insert("executed_as".into(), json!(payload.executed_as.as_str()));
            }
            Self::Failure {
                command,
                kind,
                message,
            } => {
                obj.insert("success".into(), Value::Bool(false));
                obj.insert("command".into(), json!(command));
                obj.insert("error".into(), json!(message));
                obj.insert("error_kind".into(), json!(kind.as_str()));
            }
        }
        Value::Object(obj)
    }

    /// 도구 응답 문자열 (비 ASCII 문자 그대로)
    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_text_rules() {
        let p = Payload::from_outputs(vec!["a".into(), "b".into()], vec![], "", Identity::User);
        assert_eq!(p.text, "a\nb");
        assert_eq!(p.args, None);

        let p = Payload::from_outputs(vec![], vec!["u1".into(), "u2".into()], "x", Identity::Bot);
        assert_eq!(p.text, "command returned 2 image(s)");
        assert_eq!(p.args.as_deref(), Some("x"));

        let p = Payload::from_outputs(vec![], vec![], "", Identity::User);
        assert_eq!(p.text, "command completed with no output");
    }

    #[test]
    fn test_success_json() {
        let result = ExecutionResult::success(
            "签到",
            Payload::from_outputs(vec!["签到成功".into()], vec![], "", Identity::User),
        );
        assert_eq!(
            result.to_json(),
            json!({
                "success": true,
                "command": "签到",
                "args": null,
                "result": "签到成功",
                "executed_as": "user",
            })
        );
        assert!(result.to_json_string().contains("签到成功"));
    }

    #[test]
    fn test_success_json_with_images() {
        let result = ExecutionResult::success(
            "钓鱼",
            Payload::from_outputs(vec![], vec!["http://img/1.png".into()], "3", Identity::Bot),
        );
        let json = result.to_json();
        assert_eq!(json["images"], json!(["http://img/1.png"]));
        assert_eq!(json["args"], json!("3"));
        assert_eq!(json["executed_as"], json!("bot"));
    }

    #[test]
    fn test_failure_json() {
        let result = ExecutionResult::unknown_command("不存在指令");
        assert_eq!(result.error_kind(), Some(ErrorKind::UnknownCommand));
        assert_eq!(
            result.to_json(),
            json!({
                "success": false,
                "command": "不存在指令",
                "error": "unknown command: 不存在指令",
                "error_kind": "unknown_command",
            })
        );
    }

    #[test]
    fn test_error_kind_serde_matches_as_str() {
        for kind in [
            ErrorKind::UnknownCommand,
            ErrorKind::PermissionDenied,
            ErrorKind::ExecutionError,
            ErrorKind::RebuildError,
            ErrorKind::InvalidRequest,
        ] {
            assert_eq!(serde_json::to_value(kind).unwrap(), json!(kind.as_str()));
        }
    }
}
