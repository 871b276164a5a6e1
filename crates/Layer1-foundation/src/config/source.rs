//! Settings Source - 외부 설정 저장소 추상화
//!
//! 실행기는 설정을 소유하지 않는다. 요청마다 `snapshot()`으로 일관된 복사본을
//! 한 번 읽어 사용한다.

use super::executor::{ExecutorConfig, EXECUTOR_CONFIG_FILE};
use crate::storage::JsonStore;
use parking_lot::RwLock;
use tracing::warn;

/// 설정 공급자
pub trait SettingsSource: Send + Sync {
    /// 현재 설정의 값 복사본
    fn snapshot(&self) -> ExecutorConfig;
}

// ============================================================================
// StaticSettings - 메모리 내 설정
// ============================================================================

/// 메모리에 보관되는 설정 (host가 직접 갱신)
#[derive(Debug, Default)]
pub struct StaticSettings {
    inner: RwLock<ExecutorConfig>,
}

impl StaticSettings {
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            inner: RwLock::new(config),
        }
    }

    /// 설정 전체 교체
    pub fn replace(&self, config: ExecutorConfig) {
        *self.inner.write() = config;
    }

    /// 설정 일부 수정
    pub fn update(&self, f: impl FnOnce(&mut ExecutorConfig)) {
        let mut guard = self.inner.write();
        f(&mut *guard);
    }
}

impl SettingsSource for StaticSettings {
    fn snapshot(&self) -> ExecutorConfig {
        self.inner.read().clone()
    }
}

// ============================================================================
// JsonSettings - 파일 기반 설정
// ============================================================================

/// JSON 파일에서 매번 다시 읽는 설정
///
/// 사용자가 파일을 수정하면 다음 요청부터 반영된다. 파싱에 실패하면 마지막으로
/// 성공한 설정을 계속 사용한다.
#[derive(Debug)]
pub struct JsonSettings {
    store: JsonStore,
    last_good: RwLock<ExecutorConfig>,
}

impl JsonSettings {
    pub fn new(store: JsonStore) -> Self {
        let initial = ExecutorConfig::load_from(&store).unwrap_or_else(|e| {
            warn!("Failed to load {}: {}, using defaults", EXECUTOR_CONFIG_FILE, e);
            ExecutorConfig::default()
        });
        Self {
            store,
            last_good: RwLock::new(initial),
        }
    }
}

impl SettingsSource for JsonSettings {
    fn snapshot(&self) -> ExecutorConfig {
        match ExecutorConfig::load_from(&self.store) {
            Ok(config) => {
                *self.last_good.write() = config.clone();
                config
            }
            Err(e) => {
                warn!("Keeping last good executor config: {}", e);
                self.last_good.read().clone()
            }
        }
    }
}
