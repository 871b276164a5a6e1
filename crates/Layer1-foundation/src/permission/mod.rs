//! Permission system for LLM Executor
//!
//! - `policy`: 명령 실행 정책 결정 (PolicyEngine)
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use llmexec_foundation::permission::{PolicyEngine, Verdict};
//!
//! let config = settings.snapshot().policy();
//! match PolicyEngine::new().decide(&descriptor, user_id, &config) {
//!     Verdict::Allow(_) => { /* 실행 */ }
//!     Verdict::Deny(reason) => { /* reason.as_str() 반환 */ }
//! }
//! ```

mod policy;

pub use policy::{CommandSubject, DenyReason, Grant, PolicyEngine, Verdict};
