//! Operator commands - 캐시 새로고침과 상태 보고
//!
//! 운영자가 채팅이나 CLI에서 직접 호출한다. LLM 도구로는 노출되지 않는다.

use crate::query::QueryFacade;
use crate::registry::{HandlerCache, RebuildReport};
use chrono::{DateTime, Utc};
use llmexec_foundation::{Result, SettingsSource};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

/// 현재 설정의 `skip_plugins`를 반영해 캐시 재구축
pub fn refresh(cache: &HandlerCache, settings: &dyn SettingsSource) -> Result<RebuildReport> {
    cache.set_skip_plugins(settings.snapshot().skip_plugins);
    cache.rebuild()
}

/// 새로고침 결과 문장
pub fn render_refresh(outcome: &Result<RebuildReport>) -> String {
    match outcome {
        Ok(report) => format!(
            "command cache refreshed: {} command(s), {} key(s), generation {}",
            report.commands, report.keys, report.generation
        ),
        Err(e) => format!("command cache refresh failed: {e}"),
    }
}

/// 실행기 상태
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusReport {
    pub enabled: bool,
    pub whitelist: Vec<String>,
    pub blacklist: Vec<String>,
    pub admin_users: Vec<String>,
    pub allow_admin_commands: bool,
    pub cached_commands: usize,
    pub generation: u64,
    pub built_at: Option<DateTime<Utc>>,
    pub plugin_counts: BTreeMap<String, usize>,
}

impl StatusReport {
    pub fn collect(cache: &Arc<HandlerCache>, settings: &dyn SettingsSource) -> Self {
        let config = settings.snapshot();
        let policy = config.policy;

        Self {
            enabled: policy.enabled,
            whitelist: policy.whitelist.into_iter().collect(),
            blacklist: policy.blacklist.into_iter().collect(),
            admin_users: policy.admin_users.into_iter().collect(),
            allow_admin_commands: policy.allow_admin_commands,
            cached_commands: cache.len(),
            generation: cache.generation(),
            built_at: cache.built_at(),
            plugin_counts: QueryFacade::new(cache.clone()).plugin_counts(),
        }
    }

    /// 사람이 읽는 상태 문서
    pub fn render(&self) -> String {
        /// `이름 (개수): 항목` 한 줄
        fn list_or(label: &str, items: &[String], empty: &str) -> String {
            let shown = if items.is_empty() {
                empty.to_string()
            } else {
                items.join(", ")
            };
            format!("{label} ({}): {shown}", items.len())
        }

        let mut out = String::from("=== LLM command executor ===\n");
        let _ = writeln!(out, "enabled: {}", if self.enabled { "yes" } else { "no" });
        let _ = writeln!(out, "cached commands: {}", self.cached_commands);
        let _ = writeln!(out, "{}", list_or("whitelist", &self.whitelist, "unrestricted"));
        let _ = writeln!(out, "{}", list_or("blacklist", &self.blacklist, "none"));
        let _ = writeln!(
            out,
            "allow admin commands: {}",
            if self.allow_admin_commands { "yes" } else { "no" }
        );
        let _ = writeln!(out, "{}", list_or("admin users", &self.admin_users, "none"));
        match self.built_at {
            Some(at) => {
                let _ = writeln!(
                    out,
                    "generation: {} (built {})",
                    self.generation,
                    at.format("%Y-%m-%d %H:%M:%S UTC")
                );
            }
            None => {
                let _ = writeln!(out, "generation: not built");
            }
        }

        out.push_str("\n[commands per plugin]");
        for (plugin, count) in &self.plugin_counts {
            let _ = write!(out, "\n  - {plugin}: {count}");
        }
        out
    }
}
