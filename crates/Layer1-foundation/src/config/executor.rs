//! Executor Config - 실행기 설정
//!
//! 정책 목록(화이트/블랙리스트, 관리자)과 실행/전달 옵션을 함께 관리한다.
//! 정책 부분만 `PolicyConfig`로 값 복사되어 매 결정마다 전달된다.

use crate::storage::JsonStore;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// 설정 파일명
pub const EXECUTOR_CONFIG_FILE: &str = "executor.json";

/// Bot 자신의 기본 사용자 ID
pub const DEFAULT_BOT_USER_ID: &str = "bot_self";

/// 합쳐 보내기(forward) 기본 임계값 (문자 수)
pub const DEFAULT_FORWARD_THRESHOLD: usize = 1500;

// ============================================================================
// PolicyConfig
// ============================================================================

/// 권한 정책 설정
///
/// 작은 값 객체이므로 결정 한 번마다 통째로 복사해서 사용한다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// 마스터 스위치
    pub enabled: bool,

    /// 비어 있으면 제한 없음
    pub whitelist: BTreeSet<String>,

    /// 항상 거부
    pub blacklist: BTreeSet<String>,

    /// 관리자 제한에서 제외되는 사용자 ID
    pub admin_users: BTreeSet<String>,

    /// 모든 사용자에게 관리자 전용 명령 허용
    pub allow_admin_commands: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            whitelist: BTreeSet::new(),
            blacklist: BTreeSet::new(),
            admin_users: BTreeSet::new(),
            allow_admin_commands: false,
        }
    }
}

impl PolicyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn whitelist<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.whitelist = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn blacklist<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blacklist = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn admin_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.admin_users = users.into_iter().map(Into::into).collect();
        self
    }

    pub fn allow_admin_commands(mut self, allow: bool) -> Self {
        self.allow_admin_commands = allow;
        self
    }
}

// ============================================================================
// ExecutorConfig
// ============================================================================

/// LLM Executor 전체 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// 권한 정책
    #[serde(flatten)]
    pub policy: PolicyConfig,

    /// `as_bot` 실행 시 사용할 Bot 사용자 ID
    pub bot_user_id: String,

    /// 긴 출력을 하나의 합쳐진 메시지로 전달
    pub enable_forward: bool,

    /// 합쳐 보내기 임계값 (텍스트 총 길이, 문자 수)
    pub forward_threshold: usize,

    /// 합쳐 보내기를 지원하는 플랫폼
    pub forward_platforms: BTreeSet<String>,

    /// 캐시 구축 시 건너뛸 플러그인
    pub skip_plugins: BTreeSet<String>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            policy: PolicyConfig::default(),
            bot_user_id: DEFAULT_BOT_USER_ID.to_string(),
            enable_forward: true,
            forward_threshold: DEFAULT_FORWARD_THRESHOLD,
            forward_platforms: ["aiocqhttp".to_string()].into_iter().collect(),
            skip_plugins: default_skip_plugins(),
        }
    }
}

fn default_skip_plugins() -> BTreeSet<String> {
    [
        "astrbot",
        "astrbot_plugin_llm_executor",
        "astrbot_plugin_command_query",
        "astrbot-reminder",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl ExecutorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 정책 부분 값 복사
    pub fn policy(&self) -> PolicyConfig {
        self.policy.clone()
    }

    pub fn with_policy(mut self, policy: PolicyConfig) -> Self {
        self.policy = policy;
        self
    }

    pub fn bot_user_id(mut self, id: impl Into<String>) -> Self {
        self.bot_user_id = id.into();
        self
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드 (프로젝트 키가 우선)
    pub fn load() -> Result<Self> {
        let mut merged = Map::new();

        if let Ok(global) = JsonStore::global() {
            if let Some(Value::Object(obj)) = global.load_optional::<Value>(EXECUTOR_CONFIG_FILE)? {
                merged.extend(obj);
            }
        }

        if let Ok(project) = JsonStore::current_project() {
            if let Some(Value::Object(obj)) =
                project.load_optional::<Value>(EXECUTOR_CONFIG_FILE)?
            {
                merged.extend(obj);
            }
        }

        Ok(serde_json::from_value(Value::Object(merged))?)
    }

    /// 특정 저장소에서 로드 (파일이 없으면 기본값)
    pub fn load_from(store: &JsonStore) -> Result<Self> {
        Ok(store
            .load_optional::<Self>(EXECUTOR_CONFIG_FILE)?
            .unwrap_or_default())
    }

    /// 특정 저장소에 저장
    pub fn save_to(&self, store: &JsonStore) -> Result<()> {
        store.save(EXECUTOR_CONFIG_FILE, self)
    }
}
