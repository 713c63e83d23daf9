//! 清单模块
//!
//! 提供EPUB包中文件清单的结构定义。清单保留OPF中的列出顺序，
//! 同时支持按ID查找。

use std::collections::HashMap;

/// NCX导航文件的媒体类型
pub const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

/// 清单项信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    /// 项目ID
    pub id: String,
    /// 文件路径(相对于OPF文件)
    pub href: String,
    /// 媒体类型
    pub media_type: String,
    /// 属性(如nav、cover-image等)
    pub properties: Option<String>,
}

impl ManifestItem {
    pub fn new(
        id: impl Into<String>,
        href: impl Into<String>,
        media_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            media_type: media_type.into(),
            properties: None,
        }
    }

    /// 检查是否包含指定属性
    pub fn has_property(&self, property: &str) -> bool {
        self.properties
            .as_deref()
            .is_some_and(|properties| properties.split_whitespace().any(|p| p == property))
    }

    /// 是否为可抽取正文的标记文档（XHTML或HTML）
    pub fn is_markup(&self) -> bool {
        matches!(
            self.media_type.trim().to_ascii_lowercase().as_str(),
            "application/xhtml+xml" | "text/html"
        )
    }

    /// 是否为NCX导航文件
    pub fn is_ncx(&self) -> bool {
        self.media_type == NCX_MEDIA_TYPE
    }
}

/// OPF清单：按列出顺序保存的清单项集合
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    items: Vec<ManifestItem>,
    by_id: HashMap<String, usize>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加清单项；重复的ID以第一次出现的为准
    pub fn push(&mut self, item: ManifestItem) {
        if self.by_id.contains_key(&item.id) {
            tracing::warn!(id = %item.id, "清单中存在重复的ID，忽略后出现的条目");
            return;
        }
        self.by_id.insert(item.id.clone(), self.items.len());
        self.items.push(item);
    }

    /// 根据ID获取清单项
    pub fn get(&self, id: &str) -> Option<&ManifestItem> {
        self.by_id.get(id).map(|&index| &self.items[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManifestItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
