//! llmexec-core: Core Runtime for LLM Executor
//!
//! Layer2 - 명령 캐시, 실행 게이트, 도구 경계
//!
//! # 주요 모듈
//!
//! - `host`: host 봇 프레임워크 경계 (레지스트리, handler, 런타임)
//! - `registry`: HandlerCache (이름/별칭 → 명령, 원자적 스냅샷)
//! - `gate`: ExecutionGate (조회 → 정책 → 실행 → 결과)
//! - `query`: QueryFacade (명령 목록)
//! - `message`: handler가 보게 될 메시지 조립
//! - `tool`: LLM 도구 (`execute_command`, `list_executable_commands`)
//! - `operator`: 운영자 명령 (새로고침, 상태)
//! - `context`: 위 구성 요소를 한 번에 조립
//!
//! # 사용 예시
//!
//! ```ignore
//! use llmexec_core::{ExecutorContext, ExecutionRequest};
//!
//! let ctx = ExecutorContext::new(host, runtime, settings);
//! ctx.refresh()?;
//!
//! let result = ctx.execute(ExecutionRequest::new("签到", "42")).await;
//! println!("{}", result.to_json_string());
//! ```

// Core modules
pub mod context;
pub mod gate;
pub mod host;
pub mod message;
pub mod operator;
pub mod query;
pub mod registry;
pub mod tool;

// Re-exports: Context
pub use context::ExecutorContext;

// Re-exports: Host
pub use host::{
    CommandHandler, Delivery, FnHandler, HandlerFault, HandlerRef, HostPlugin, HostRegistry,
    HostRuntime, Identity, Invocation, OutputChunk, OutputMessage, RawCommand, StaticHandler,
};

// Re-exports: Registry
pub use registry::{CommandDescriptor, HandlerCache, HandlerIndex, RebuildReport};

// Re-exports: Gate
pub use gate::{ErrorKind, ExecutionGate, ExecutionRequest, ExecutionResult, Payload};

// Re-exports: Query
pub use query::{CommandListing, GroupedCommand, QueryFacade};

// Re-exports: Message
pub use message::MessageSegment;

// Re-exports: Tool
pub use tool::{
    ExecuteCommandTool, ExecutorTools, ListCommandsTool, LlmTool, ToolCallContext, ToolDefinition,
};

// Re-exports: Operator
pub use operator::StatusReport;

// Re-exports from foundation
pub use llmexec_foundation::{
    Error, ExecutorConfig, JsonSettings, PolicyConfig, PolicyEngine, Result, SettingsSource,
    StaticSettings, Verdict,
};
