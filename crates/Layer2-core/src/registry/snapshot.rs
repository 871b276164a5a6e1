//! Handler Index - 한 번의 구축으로 만들어진 불변 스냅샷
//!
//! 구축이 끝난 인덱스는 절대 변경되지 않는다. 갱신은 새 인덱스를 만들어
//! 통째로 교체하는 방식으로만 이루어진다.

use super::descriptor::CommandDescriptor;
use crate::host::{HostPlugin, RawCommand};
use crate::message::strip_prefix;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

/// 설명이 없는 명령에 쓰는 기본 설명
pub const DEFAULT_DESCRIPTION: &str = "无描述";

// ============================================================================
// HandlerIndex
// ============================================================================

/// 이름/별칭 → 명령 인덱스
#[derive(Debug)]
pub struct HandlerIndex {
    /// 구축 세대 (0 = 아직 구축되지 않음)
    pub generation: u64,

    /// 구축 완료 시각
    pub built_at: DateTime<Utc>,

    /// 이름과 별칭 모두를 키로 가짐
    by_name: HashMap<String, Arc<CommandDescriptor>>,

    /// 중복 없는 명령 목록 (플러그인 이름, 명령 이름 순)
    descriptors: Vec<Arc<CommandDescriptor>>,
}

impl HandlerIndex {
    /// 빈 인덱스 (세대 0)
    pub fn empty() -> Self {
        Self {
            generation: 0,
            built_at: Utc::now(),
            by_name: HashMap::new(),
            descriptors: Vec::new(),
        }
    }

    /// host 열거 결과로 인덱스 구축
    ///
    /// 비활성 플러그인과 `skip_plugins`에 있는 플러그인은 건너뛴다.
    /// 이름이나 별칭이 이미 색인돼 있으면 먼저 등록된 쪽이 이긴다.
    pub fn build(generation: u64, plugins: &[HostPlugin], skip_plugins: &BTreeSet<String>) -> Self {
        let mut builder = IndexBuilder::default();

        for plugin in plugins {
            if !plugin.activated {
                debug!("Skipping inactive plugin: {}", plugin.name);
                continue;
            }
            if skip_plugins.contains(&plugin.name) {
                debug!("Skipping excluded plugin: {}", plugin.name);
                continue;
            }

            for raw in &plugin.commands {
                builder.add(&plugin.name, raw, None, false);
            }
        }

        let mut descriptors = builder.descriptors;
        descriptors.sort_by(|a, b| a.plugin.cmp(&b.plugin).then_with(|| a.name.cmp(&b.name)));

        Self {
            generation,
            built_at: Utc::now(),
            by_name: builder.by_name,
            descriptors,
        }
    }

    /// 이름 또는 별칭으로 명령 찾기 (대소문자 구분)
    pub fn resolve(&self, name: &str) -> Option<Arc<CommandDescriptor>> {
        self.by_name.get(name).cloned()
    }

    /// 중복 없는 명령 목록
    pub fn descriptors(&self) -> &[Arc<CommandDescriptor>] {
        &self.descriptors
    }

    /// 명령 수
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// 조회 키 수 (이름 + 별칭)
    pub fn key_count(&self) -> usize {
        self.by_name.len()
    }
}

// ============================================================================
// IndexBuilder
// ============================================================================

#[derive(Default)]
struct IndexBuilder {
    by_name: HashMap<String, Arc<CommandDescriptor>>,
    descriptors: Vec<Arc<CommandDescriptor>>,
}

impl IndexBuilder {
    fn add(&mut self, plugin: &str, raw: &RawCommand, group: Option<&str>, inherited_admin: bool) {
        let local = strip_prefix(raw.name.trim());
        if local.is_empty() {
            warn!("Plugin {} registered a command with an empty name", plugin);
            return;
        }

        let name = qualify(group, local);
        let admin_only = raw.admin_only || inherited_admin;

        if let Some(existing) = self.by_name.get(&name) {
            warn!(
                "Command name '{}' from plugin {} already taken by {} ({}), skipping",
                name, plugin, existing.name, existing.plugin
            );
        } else {
            let mut aliases: Vec<String> = Vec::new();
            for alias in &raw.aliases {
                let alias = strip_prefix(alias.trim());
                if alias.is_empty() {
                    continue;
                }
                let alias = qualify(group, alias);
                if alias == name || aliases.contains(&alias) {
                    continue;
                }
                if let Some(existing) = self.by_name.get(&alias) {
                    warn!(
                        "Alias '{}' of {} ({}) already taken by {} ({}), skipping",
                        alias, name, plugin, existing.name, existing.plugin
                    );
                    continue;
                }
                aliases.push(alias);
            }

            let descriptor = Arc::new(CommandDescriptor {
                name: name.clone(),
                aliases,
                plugin: plugin.to_string(),
                description: raw
                    .description
                    .as_deref()
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .unwrap_or(DEFAULT_DESCRIPTION)
                    .to_string(),
                admin_only,
                handler: raw.handler.clone(),
            });

            for alias in &descriptor.aliases {
                self.by_name.insert(alias.clone(), descriptor.clone());
            }
            self.by_name.insert(name.clone(), descriptor.clone());
            self.descriptors.push(descriptor);
        }

        for sub in &raw.subcommands {
            self.add(plugin, sub, Some(&name), admin_only);
        }
    }
}

fn qualify(group: Option<&str>, name: &str) -> String {
    match group {
        Some(group) => format!("{group} {name}"),
        None => name.to_string(),
    }
}
