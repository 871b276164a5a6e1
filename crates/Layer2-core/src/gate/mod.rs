//! Execution Gate
//!
//! LLM 도구 호출 하나를 명령 실행 하나로 바꾸는 관문.
//!
//! - `request`: ExecutionRequest
//! - `result`: ExecutionResult, ErrorKind, Payload
//! - `delivery`: 채팅 전송 (합쳐 보내기 판단 포함)
//! - `executor`: ExecutionGate

mod delivery;
mod executor;
mod request;
mod result;

pub use delivery::{deliver_outputs, total_text_len, ForwardPolicy};
pub use executor::{ExecutionGate, MISSING_COMMAND};
pub use request::ExecutionRequest;
pub use result::{ErrorKind, ExecutionResult, Payload};
