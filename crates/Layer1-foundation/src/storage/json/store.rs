//! 실행기 설정 JSON 저장소
//!
//! 글로벌(`<config_dir>/llmexec/`)과 프로젝트(`.llmexec/`) 두 위치.
//! 쓰기는 같은 디렉토리의 임시 파일에 쓴 뒤 rename 한다. 요청마다 설정을
//! 다시 읽는 쪽이 반쯤 쓰인 파일을 보지 않는다.

use crate::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

const GLOBAL_DIR: &str = "llmexec";
const PROJECT_DIR: &str = ".llmexec";

/// 디렉토리 하나에 묶인 JSON 파일 저장소
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<config_dir>/llmexec/`
    pub fn global() -> Result<Self> {
        dirs::config_dir()
            .map(|base| Self::new(base.join(GLOBAL_DIR)))
            .ok_or_else(|| Error::Config("no user config directory on this platform".into()))
    }

    /// `<root>/.llmexec/`
    pub fn project(root: impl Into<PathBuf>) -> Self {
        Self::new(root.into().join(PROJECT_DIR))
    }

    pub fn current_project() -> Result<Self> {
        Ok(Self::project(std::env::current_dir()?))
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    pub fn exists(&self, filename: &str) -> bool {
        self.file_path(filename).is_file()
    }

    /// 파일이 없으면 `None`, 읽기/파싱 실패는 `Error::Config`
    pub fn load_optional<T: DeserializeOwned>(&self, filename: &str) -> Result<Option<T>> {
        let path = self.file_path(filename);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Config(format!("{}: {}", path.display(), e))),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn save<T: Serialize>(&self, filename: &str, data: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let path = self.file_path(filename);
        let staging = self.file_path(&format!(".{filename}.tmp"));
        fs::write(&staging, serde_json::to_vec_pretty(data)?)?;
        fs::rename(&staging, &path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}
