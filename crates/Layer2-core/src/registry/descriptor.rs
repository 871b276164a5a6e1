//! Command Descriptor - 캐시에 보관되는 명령 항목

use crate::host::HandlerRef;
use llmexec_foundation::CommandSubject;
use std::fmt;

/// 실행 가능한 명령 하나
///
/// 캐시 구축 시점의 값 복사본이다. `handler`만 host 실행 단위를 참조한다.
#[derive(Clone)]
pub struct CommandDescriptor {
    /// 정식 이름 (`/` 접두사 제거됨)
    pub name: String,

    /// 실제로 색인된 별칭 (다른 명령과 충돌한 별칭은 빠짐)
    pub aliases: Vec<String>,

    /// 소속 플러그인 (목록 그룹화 기준)
    pub plugin: String,

    pub description: String,

    pub admin_only: bool,

    pub handler: HandlerRef,
}

impl CommandSubject for CommandDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn aliases(&self) -> &[String] {
        &self.aliases
    }

    fn is_admin_only(&self) -> bool {
        self.admin_only
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("plugin", &self.plugin)
            .field("admin_only", &self.admin_only)
            .finish_non_exhaustive()
    }
}
