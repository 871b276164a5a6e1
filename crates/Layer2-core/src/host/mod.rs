//! Host boundary
//!
//! host 봇 프레임워크(명령 레지스트리, 실행 런타임)와 만나는 지점.
//!
//! - `traits`: HostRegistry, CommandHandler, HostRuntime
//! - `types`: HostPlugin, RawCommand, Invocation, OutputMessage, Delivery
//! - `handler`: 클로저/고정 응답 handler 어댑터

mod handler;
mod traits;
mod types;

pub use handler::{FnHandler, StaticHandler};
pub use traits::{CommandHandler, HostRegistry, HostRuntime};
pub use types::{
    Delivery, HandlerFault, HandlerRef, HostPlugin, Identity, Invocation, OutputChunk,
    OutputMessage, RawCommand,
};
