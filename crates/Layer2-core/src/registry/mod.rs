//! # Handler Registry
//!
//! host 명령 레지스트리를 이름/별칭으로 조회할 수 있는 캐시.
//!
//! ## 구성
//!
//! - `CommandDescriptor`: 명령 하나 (이름, 별칭, 플러그인, 설명, 관리자 여부, handler)
//! - `HandlerIndex`: 한 번의 구축으로 만든 불변 스냅샷
//! - `HandlerCache`: 현재 스냅샷을 보관하고 원자적으로 교체
//!
//! ## 사용 예시
//!
//! ```ignore
//! let cache = HandlerCache::new(host);
//! cache.rebuild()?;
//!
//! if let Some(cmd) = cache.resolve("签到") {
//!     println!("{} from {}", cmd.name, cmd.plugin);
//! }
//! ```

mod cache;
mod descriptor;
mod snapshot;

pub use cache::{HandlerCache, RebuildReport};
pub use descriptor::CommandDescriptor;
pub use snapshot::{HandlerIndex, DEFAULT_DESCRIPTION};
