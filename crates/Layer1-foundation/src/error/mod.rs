//! Error types for LLM Executor
//!
//! 모든 에러를 중앙에서 관리. 명령 실행 실패는 여기로 오지 않고
//! `ExecutionResult`의 `error_kind`로 보고된다.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// LLM Executor 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // Host 레지스트리 관련
    // ========================================================================
    #[error("Host registry unavailable: {0}")]
    HostUnavailable(String),

    #[error("Handler cache rebuild failed: {0}")]
    Rebuild(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::Rebuild("Host registry unavailable: offline".into());
        assert_eq!(
            err.to_string(),
            "Handler cache rebuild failed: Host registry unavailable: offline"
        );
    }

    #[test]
    fn test_from_json_error() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = parse.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
