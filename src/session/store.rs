//! 设置文档的持久化
//!
//! 读取失败时回退到默认设置而不是报错；写入先落到同目录的临时文件，
//! 再原子地替换目标文件。

use crate::epub::error::{EpubError, Result};
use crate::session::settings::Settings;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// 默认设置文件名
const SETTINGS_FILE_NAME: &str = "settings.yaml";

/// 应用目录名
const APP_DIR_NAME: &str = "folio";

/// 上次的阅读位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingPosition {
    pub book_path: PathBuf,
    pub chapter: usize,
}

impl ReadingPosition {
    /// 针对新加载的书校正章节：越界时回到第0章
    pub fn clamp_to(&self, chapter_count: usize) -> usize {
        if self.chapter < chapter_count { self.chapter } else { 0 }
    }
}

/// 加载设置的结果
#[derive(Debug)]
pub struct LoadedSettings {
    pub settings: Settings,
    /// 文件存在但无法读取或解析时的诊断信息（`SettingsCorrupt`）
    pub diagnostic: Option<EpubError>,
}

/// 设置文档的唯一写入者，持有磁盘文档在内存中的镜像
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    current: Settings,
}

impl SessionStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            current: Settings::default(),
        }
    }

    /// 平台配置目录下的设置文件；没有配置目录时使用当前目录
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 内存中的设置镜像
    pub fn settings(&self) -> &Settings {
        &self.current
    }

    /// 读取设置文档
    ///
    /// 文件不存在时返回默认设置；文件存在但不可读或不可解析时同样返回
    /// 完整的默认设置，并附带 `SettingsCorrupt` 诊断。这个方法从不失败。
    pub fn load(&mut self) -> LoadedSettings {
        let (settings, diagnostic) = match Self::read_document(&self.path) {
            Ok(Some(settings)) => (settings, None),
            Ok(None) => {
                tracing::debug!(path = %self.path.display(), "设置文件不存在，使用默认设置");
                (Settings::default(), None)
            }
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "设置文件损坏，已恢复默认设置");
                (Settings::default(), Some(err))
            }
        };

        self.current = settings.clone();
        LoadedSettings { settings, diagnostic }
    }

    fn read_document(path: &Path) -> Result<Option<Settings>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(EpubError::SettingsCorrupt(format!("无法读取设置文件: {}", e))),
        };

        if content.trim().is_empty() {
            return Err(EpubError::SettingsCorrupt("设置文件为空".to_string()));
        }

        serde_yml::from_str(&content)
            .map(Some)
            .map_err(|e| EpubError::SettingsCorrupt(format!("设置文件格式错误: {}", e)))
    }

    /// 保存设置
    ///
    /// 调用方的已知字段合并进内存镜像（未知键保留），然后整体写回。
    /// 写入失败时返回错误，内存中的设置依然有效。
    pub fn save(&mut self, settings: &Settings) -> Result<()> {
        self.current.merge_from(settings);
        self.write_document()
    }

    fn write_document(&self) -> Result<()> {
        let yaml = serde_yml::to_string(&self.current)
            .map_err(|e| EpubError::SettingsWrite(format!("序列化设置失败: {}", e)))?;
        let content = format!("# folio 阅读设置\n# 未识别的键会被原样保留\n\n{}", yaml);

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut temp = NamedTempFile::new_in(&dir)?;
        temp.write_all(content.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| EpubError::Io(e.error))?;

        tracing::debug!(path = %self.path.display(), "设置已保存");
        Ok(())
    }

    /// 上次阅读的书籍：路径非空且文件仍然存在时才返回
    ///
    /// 章节号不在这里校验，调用方需用 [`ReadingPosition::clamp_to`]
    /// 对照新加载的章节数。
    pub fn resolve_last_position(settings: &Settings) -> Option<ReadingPosition> {
        if settings.last_book_path.trim().is_empty() {
            return None;
        }

        let book_path = PathBuf::from(&settings.last_book_path);
        if !book_path.is_file() {
            tracing::debug!(path = %book_path.display(), "上次阅读的书籍已不存在");
            return None;
        }

        Some(ReadingPosition {
            book_path,
            chapter: settings.last_chapter,
        })
    }

    /// 启动时需要自动恢复的位置；关闭了自动加载则为None
    pub fn restore_target(settings: &Settings) -> Option<ReadingPosition> {
        if !settings.auto_load_last_book {
            return None;
        }
        Self::resolve_last_position(settings)
    }
}
