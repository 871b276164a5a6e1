//! Handler Cache - host 레지스트리의 원자적 스냅샷
//!
//! ```text
//!   rebuild()                       resolve() / snapshot()
//!      │                                   │
//!      │ enumerate (락 밖)                 │ read lock → Arc clone
//!      ▼                                   ▼
//!   HandlerIndex::build ──▶ write lock ──▶ Arc<HandlerIndex>
//!                           (swap만)
//! ```
//!
//! 읽기는 교체 순간 이상으로 막히지 않는다. 진행 중인 요청은 자신이 잡은
//! 스냅샷을 끝까지 사용한다.

use super::descriptor::CommandDescriptor;
use super::snapshot::HandlerIndex;
use crate::host::HostRegistry;
use chrono::{DateTime, Utc};
use llmexec_foundation::{Error, Result};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// 재구축 결과
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RebuildReport {
    pub generation: u64,
    /// 색인된 명령 수
    pub commands: usize,
    /// 조회 키 수 (이름 + 별칭)
    pub keys: usize,
    pub duration_ms: u64,
}

/// 명령 handler 캐시
pub struct HandlerCache {
    host: Arc<dyn HostRegistry>,

    /// 현재 스냅샷 - clone/swap 동안에만 잠금
    current: RwLock<Arc<HandlerIndex>>,

    generation: AtomicU64,

    /// 재구축 직렬화
    rebuild_lock: Mutex<()>,

    skip_plugins: RwLock<BTreeSet<String>>,
}

impl HandlerCache {
    pub fn new(host: Arc<dyn HostRegistry>) -> Self {
        Self {
            host,
            current: RwLock::new(Arc::new(HandlerIndex::empty())),
            generation: AtomicU64::new(0),
            rebuild_lock: Mutex::new(()),
            skip_plugins: RwLock::new(BTreeSet::new()),
        }
    }

    /// 건너뛸 플러그인 지정
    pub fn with_skip_plugins<I, S>(self, plugins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_skip_plugins(plugins.into_iter().map(Into::into).collect());
        self
    }

    /// 다음 재구축부터 적용
    pub fn set_skip_plugins(&self, plugins: BTreeSet<String>) {
        *self.skip_plugins.write() = plugins;
    }

    /// host 레지스트리를 다시 열거해 스냅샷 교체
    ///
    /// 실패하면 이전 스냅샷이 그대로 유지된다.
    pub fn rebuild(&self) -> Result<RebuildReport> {
        let _guard = self.rebuild_lock.lock();
        self.rebuild_locked()
    }

    /// `rebuild_lock`을 잡은 상태에서 호출
    fn rebuild_locked(&self) -> Result<RebuildReport> {
        let started = Instant::now();

        let plugins = self.host.enumerate().map_err(|e| {
            error!("Handler cache rebuild failed: {}", e);
            match e {
                Error::Rebuild(_) => e,
                other => Error::Rebuild(other.to_string()),
            }
        })?;

        let skip = self.skip_plugins.read().clone();
        let generation = self.generation.load(Ordering::Acquire) + 1;
        let index = Arc::new(HandlerIndex::build(generation, &plugins, &skip));

        let report = RebuildReport {
            generation,
            commands: index.len(),
            keys: index.key_count(),
            duration_ms: started.elapsed().as_millis() as u64,
        };

        *self.current.write() = index;
        self.generation.store(generation, Ordering::Release);

        info!(
            "Handler cache rebuilt: generation={}, commands={}, keys={}, plugins={}, {}ms",
            report.generation,
            report.commands,
            report.keys,
            plugins.len(),
            report.duration_ms
        );

        Ok(report)
    }

    /// 구축된 적이 없거나 명령이 하나도 없으면 재구축 대상
    pub fn needs_build(&self) -> bool {
        self.generation() == 0 || self.is_empty()
    }

    /// 비어 있으면 구축
    ///
    /// 락을 잡은 뒤 다시 확인하므로 동시에 들어온 첫 요청들은 한 번만 구축한다.
    pub fn ensure_built(&self) -> Result<()> {
        if !self.needs_build() {
            return Ok(());
        }

        let _guard = self.rebuild_lock.lock();
        if !self.needs_build() {
            debug!("Handler cache built by a concurrent request");
            return Ok(());
        }

        debug!("Handler cache empty, building");
        self.rebuild_locked()?;
        Ok(())
    }

    /// 현재 스냅샷
    pub fn snapshot(&self) -> Arc<HandlerIndex> {
        self.current.read().clone()
    }

    /// 이름 또는 별칭으로 명령 찾기
    pub fn resolve(&self, name: &str) -> Option<Arc<CommandDescriptor>> {
        self.snapshot().resolve(name)
    }

    /// 목록용 명령 (플러그인, 이름 순)
    pub fn snapshot_for_listing(&self) -> Vec<Arc<CommandDescriptor>> {
        self.snapshot().descriptors().to_vec()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// 현재 세대 (0 = 아직 구축되지 않음)
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// 마지막 구축 시각
    pub fn built_at(&self) -> Option<DateTime<Utc>> {
        let snapshot = self.snapshot();
        (snapshot.generation > 0).then_some(snapshot.built_at)
    }
}
