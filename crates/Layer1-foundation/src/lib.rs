//! # llmexec-foundation
//!
//! Foundation layer for LLM Executor:
//! - Config: 실행기 설정 (ExecutorConfig, PolicyConfig, SettingsSource)
//! - Permission: 명령 실행 정책 (PolicyEngine)
//! - Storage: JsonStore (설정 파일)
//! - Error: 공통 에러 타입
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  LLM tool call (execute_command / list_executable_...)  │
//! │                     │                                   │
//! │                     ▼                                   │
//! │        ExecutionGate (Layer2)                           │
//! │          ├── HandlerCache.resolve                       │
//! │          ├── PolicyEngine.decide   ◀── PolicyConfig     │
//! │          └── HostRuntime.invoke                         │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod permission;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{
    ExecutorConfig, JsonSettings, PolicyConfig, SettingsSource, StaticSettings,
    DEFAULT_BOT_USER_ID, DEFAULT_FORWARD_THRESHOLD, EXECUTOR_CONFIG_FILE,
};

// ============================================================================
// Permission (정책)
// ============================================================================
pub use permission::{CommandSubject, DenyReason, Grant, PolicyEngine, Verdict};

// ============================================================================
// Storage
// ============================================================================
pub use storage::JsonStore;
