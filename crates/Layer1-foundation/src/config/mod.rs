//! Config - 설정 관리
//!
//! - `executor.rs` - ExecutorConfig / PolicyConfig
//! - `source.rs` - SettingsSource (메모리, JSON 파일)

mod executor;
mod source;

pub use executor::{
    ExecutorConfig, PolicyConfig, DEFAULT_BOT_USER_ID, DEFAULT_FORWARD_THRESHOLD,
    EXECUTOR_CONFIG_FILE,
};
pub use source::{JsonSettings, SettingsSource, StaticSettings};
