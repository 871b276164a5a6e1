//! Manifest host - JSON 파일로 기술한 플러그인/명령을 host 레지스트리로 사용
//!
//! ```json
//! {
//!   "plugins": [
//!     {
//!       "name": "签到插件",
//!       "commands": [
//!         { "name": "签到", "aliases": ["sign"], "replies": ["签到成功 {sender}"] }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! 응답 템플릿 자리표시자: `{command}`, `{args}`, `{sender}`, `{identity}`.
//! 파일은 열거할 때마다 다시 읽는다 (`refresh`로 변경 반영).

use async_trait::async_trait;
use llmexec_core::{
    CommandHandler, HandlerFault, HostPlugin, HostRegistry, Invocation, OutputMessage, RawCommand,
};
use llmexec_foundation::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// Manifest 형식
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub plugins: Vec<PluginEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginEntry {
    pub name: String,
    #[serde(default = "default_true")]
    pub activated: bool,
    #[serde(default)]
    pub commands: Vec<CommandEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandEntry {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: Option<String>,
    pub admin_only: bool,
    /// 텍스트 응답 템플릿 (메시지 하나씩)
    pub replies: Vec<String>,
    /// 이미지 URL 응답
    pub images: Vec<String>,
    /// 설정하면 handler가 이 메시지로 실패한다
    pub fail: Option<String>,
    pub subcommands: Vec<CommandEntry>,
}

fn default_true() -> bool {
    true
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn into_plugins(self) -> Vec<HostPlugin> {
        self.plugins
            .into_iter()
            .map(|p| {
                p.commands
                    .into_iter()
                    .fold(HostPlugin::new(p.name).activated(p.activated), |plugin, c| {
                        plugin.command(c.into_raw())
                    })
            })
            .collect()
    }
}

impl CommandEntry {
    fn into_raw(self) -> RawCommand {
        let handler = Arc::new(TemplateHandler {
            replies: self.replies,
            images: self.images,
            fail: self.fail,
        });

        let mut raw = RawCommand::new(self.name, handler).admin_only(self.admin_only);
        raw.aliases = self.aliases;
        raw.description = self.description;
        raw.subcommands = self.subcommands.into_iter().map(CommandEntry::into_raw).collect();
        raw
    }
}

// ============================================================================
// TemplateHandler
// ============================================================================

/// 템플릿 응답을 돌려주는 handler
pub struct TemplateHandler {
    replies: Vec<String>,
    images: Vec<String>,
    fail: Option<String>,
}

impl TemplateHandler {
    fn render(template: &str, invocation: &Invocation) -> String {
        template
            .replace("{command}", &invocation.command)
            .replace("{args}", &invocation.tokens.join(" "))
            .replace("{sender}", &invocation.sender_id)
            .replace("{identity}", invocation.identity.as_str())
    }
}

#[async_trait]
impl CommandHandler for TemplateHandler {
    async fn handle(
        &self,
        invocation: &Invocation,
    ) -> std::result::Result<Vec<OutputMessage>, HandlerFault> {
        if let Some(message) = &self.fail {
            return Err(HandlerFault::failed(Self::render(message, invocation)));
        }

        let mut out: Vec<OutputMessage> = self
            .replies
            .iter()
            .map(|r| OutputMessage::text(Self::render(r, invocation)))
            .collect();
        out.extend(self.images.iter().map(OutputMessage::image));
        Ok(out)
    }
}

// ============================================================================
// ManifestHost
// ============================================================================

/// manifest 파일 기반 host 레지스트리
pub struct ManifestHost {
    path: PathBuf,
}

impl ManifestHost {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HostRegistry for ManifestHost {
    fn enumerate(&self) -> Result<Vec<HostPlugin>> {
        debug!("Reading plugin manifest {}", self.path.display());
        let manifest = Manifest::load(&self.path)
            .map_err(|e| Error::HostUnavailable(format!("{}: {}", self.path.display(), e)))?;
        Ok(manifest.into_plugins())
    }
}
