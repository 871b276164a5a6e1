//! Policy engine for command execution
//!
//! A pure decision function over (command, requesting user, policy config).
//! No I/O, no side effects; the caller supplies a value copy of the config.

use crate::config::PolicyConfig;
use std::fmt;

/// 정책 판단 대상이 되는 명령
///
/// Layer2의 `CommandDescriptor`가 구현한다.
pub trait CommandSubject {
    /// 정식 명령 이름
    fn name(&self) -> &str;

    /// 별칭 목록
    fn aliases(&self) -> &[String];

    /// 관리자 전용 여부
    fn is_admin_only(&self) -> bool;
}

/// Why an allowed command was allowed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// Not an admin-only command
    Unrestricted,

    /// Requesting user is listed in `admin_users`
    AdminUser,

    /// `allow_admin_commands` is on
    GlobalAdminOverride,
}

/// Why a command was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Disabled,
    Blacklisted,
    NotWhitelisted,
    AdminRequired,
}

impl DenyReason {
    /// 사용자/에이전트에게 노출 가능한 사유 문자열
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "executor disabled",
            Self::Blacklisted => "blacklisted",
            Self::NotWhitelisted => "not in whitelist",
            Self::AdminRequired => "admin command not permitted for this user",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy decision result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow(Grant),
    Deny(DenyReason),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow(_))
    }
}

/// 명령 실행 정책 엔진
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyEngine;

impl PolicyEngine {
    pub fn new() -> Self {
        Self
    }

    /// Decide whether `user_id` may run `command` under `config`.
    ///
    /// Checks run in a fixed order and the first match wins:
    /// disabled → blacklist → whitelist → non-admin → admin user → global
    /// admin flag → deny. All comparisons are case-sensitive.
    pub fn decide(&self, command: &dyn CommandSubject, user_id: &str, config: &PolicyConfig) -> Verdict {
        if !config.enabled {
            return Verdict::Deny(DenyReason::Disabled);
        }

        if !config.blacklist.is_empty() {
            let hit = config.blacklist.contains(command.name())
                || command.aliases().iter().any(|a| config.blacklist.contains(a));
            if hit {
                return Verdict::Deny(DenyReason::Blacklisted);
            }
        }

        // 빈 화이트리스트 = 제한 없음
        if !config.whitelist.is_empty() && !config.whitelist.contains(command.name()) {
            return Verdict::Deny(DenyReason::NotWhitelisted);
        }

        if !command.is_admin_only() {
            return Verdict::Allow(Grant::Unrestricted);
        }

        // per-user grant must work even when the global flag is off
        if config.admin_users.contains(user_id) {
            return Verdict::Allow(Grant::AdminUser);
        }

        if config.allow_admin_commands {
            return Verdict::Allow(Grant::GlobalAdminOverride);
        }

        Verdict::Deny(DenyReason::AdminRequired)
    }
}
