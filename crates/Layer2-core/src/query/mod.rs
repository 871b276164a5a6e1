//! Query Facade - 실행 가능한 명령 목록 조회
//!
//! 현재 스냅샷을 읽기만 한다. 정책 필터링은 하지 않는다 (권한은 실행 시점에
//! 게이트가 판단).

use crate::registry::{CommandDescriptor, HandlerCache};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// 목록 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandListing {
    pub plugin: String,
    pub command: String,
    pub aliases: Vec<String>,
    pub description: String,
}

impl From<&CommandDescriptor> for CommandListing {
    fn from(d: &CommandDescriptor) -> Self {
        Self {
            plugin: d.plugin.clone(),
            command: d.name.clone(),
            aliases: d.aliases.clone(),
            description: d.description.clone(),
        }
    }
}

/// 플러그인별로 묶인 항목 (그룹 안에서는 플러그인 이름을 생략)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedCommand {
    pub command: String,
    pub description: String,
    pub aliases: Vec<String>,
}

/// 명령 목록 조회
pub struct QueryFacade {
    cache: Arc<HandlerCache>,
}

impl QueryFacade {
    pub fn new(cache: Arc<HandlerCache>) -> Self {
        Self { cache }
    }

    /// 플러그인, 명령 이름 순 목록
    ///
    /// `category`가 주어지면 플러그인 이름이 정확히 같은 항목만 남긴다.
    pub fn list(&self, category: Option<&str>) -> Vec<CommandListing> {
        self.cache
            .snapshot_for_listing()
            .iter()
            .filter(|d| category.map_or(true, |c| d.plugin == c))
            .map(|d| CommandListing::from(d.as_ref()))
            .collect()
    }

    /// 플러그인 → 명령 목록
    pub fn grouped(&self, category: Option<&str>) -> BTreeMap<String, Vec<GroupedCommand>> {
        let mut groups: BTreeMap<String, Vec<GroupedCommand>> = BTreeMap::new();
        for item in self.list(category) {
            groups.entry(item.plugin).or_default().push(GroupedCommand {
                command: item.command,
                description: item.description,
                aliases: item.aliases,
            });
        }
        groups
    }

    /// 플러그인별 명령 수
    pub fn plugin_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for d in self.cache.snapshot_for_listing() {
            *counts.entry(d.plugin.clone()).or_insert(0) += 1;
        }
        counts
    }
}
