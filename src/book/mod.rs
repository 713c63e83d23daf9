//! 书籍与章节索引
//!
//! [`Book`] 在一次加载成功后一次性构建，此后不可变；打开新书时整体替换。

pub mod paginator;

use crate::epub::error::{EpubError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub use paginator::{Page, Spread, paginate};

/// 元数据缺失时使用的书名
pub const UNKNOWN_TITLE: &str = "Unknown Title";
/// 元数据缺失时使用的作者
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// 章节
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// 稳定标识符，来自源文件名，在同一本书内唯一
    pub id: String,
    /// 章节标题
    pub title: String,
    /// 规范化后的纯文本，保证非空
    pub content: String,
}

impl Chapter {
    /// 把章节内容分成左右两页
    pub fn spread(&self) -> Spread {
        paginate(&self.content)
    }
}

/// 有序、构建后不可变的章节集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterIndex {
    chapters: Vec<Chapter>,
}

impl ChapterIndex {
    pub fn count(&self) -> usize {
        self.chapters.len()
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// 按下标取章节，越界时返回 `ChapterOutOfRange`
    pub fn at(&self, index: usize) -> Result<&Chapter> {
        self.chapters.get(index).ok_or(EpubError::ChapterOutOfRange {
            index,
            count: self.chapters.len(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chapter> {
        self.chapters.iter()
    }

    /// 目录：`"1. 标题"` 形式的条目列表
    pub fn table_of_contents(&self) -> Vec<String> {
        self.chapters
            .iter()
            .enumerate()
            .map(|(i, chapter)| format!("{}. {}", i + 1, chapter.title))
            .collect()
    }
}

/// 一本已加载的书
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub chapters: ChapterIndex,
    /// 书籍文件的路径，用于记录阅读位置
    pub source_path: PathBuf,
}

impl Book {
    pub fn chapter(&self, index: usize) -> Result<&Chapter> {
        self.chapters.at(index)
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.count()
    }
}

/// 规范化之后、进入索引之前的一章
#[derive(Debug, Clone)]
pub struct ChapterDraft {
    /// 源清单项的href
    pub source_name: String,
    /// 源文件提供的标题(导航标签或文档标题)
    pub title: Option<String>,
    pub content: String,
}

/// 逐章收集草稿，最后一次性生成 [`Book`]
#[derive(Debug, Default)]
pub struct BookBuilder {
    title: Option<String>,
    author: Option<String>,
    drafts: Vec<ChapterDraft>,
}

impl BookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: Option<String>) -> Self {
        self.title = title.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn author(mut self, author: Option<String>) -> Self {
        self.author = author.filter(|a| !a.trim().is_empty());
        self
    }

    /// 添加一章；规范化后内容为空的章节会被丢弃
    pub fn push(&mut self, draft: ChapterDraft) {
        if draft.content.trim().is_empty() {
            tracing::debug!(source = %draft.source_name, "章节没有可阅读的文字，已跳过");
            return;
        }
        self.drafts.push(draft);
    }

    /// 生成书籍；一章都没有时返回 `EmptyBook`
    pub fn build(self, source_path: &Path) -> Result<Book> {
        if self.drafts.is_empty() {
            return Err(EpubError::EmptyBook);
        }

        let mut seen: HashMap<String, usize> = HashMap::new();
        let chapters = self
            .drafts
            .into_iter()
            .enumerate()
            .map(|(i, draft)| {
                let occurrences = seen.entry(draft.source_name.clone()).or_insert(0);
                *occurrences += 1;
                let id = if *occurrences == 1 {
                    draft.source_name
                } else {
                    format!("{}#{}", draft.source_name, occurrences)
                };

                Chapter {
                    id,
                    title: draft
                        .title
                        .filter(|t| !t.trim().is_empty())
                        .unwrap_or_else(|| format!("Chapter {}", i + 1)),
                    content: draft.content,
                }
            })
            .collect();

        Ok(Book {
            title: self.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            author: self.author.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            chapters: ChapterIndex { chapters },
            source_path: source_path.to_path_buf(),
        })
    }
}
