//! 导航结构模块

use crate::epub::path::resolve_href;
use std::collections::HashMap;

/// 导航点（已平铺，保留文档顺序）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavPoint {
    /// 导航标签文本
    pub label: String,
    /// 内容引用(相对于NCX文件，可能带有#片段)
    pub src: String,
    /// 嵌套深度，顶层为0
    pub depth: usize,
}

/// 导航地图
#[derive(Debug, Clone, Default)]
pub struct NavMap {
    pub nav_points: Vec<NavPoint>,
}

impl NavMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_nav_point(&mut self, nav_point: NavPoint) {
        self.nav_points.push(nav_point);
    }

    /// 归档内完整路径 -> 标签 的映射，同一文件取第一个非空标签
    ///
    /// # 参数
    /// * `base_dir` - NCX文件所在的目录，导航点的src相对于它
    pub fn labels_by_path(&self, base_dir: &str) -> HashMap<String, String> {
        let mut labels = HashMap::new();
        for point in self.nav_points.iter().filter(|point| !point.label.is_empty()) {
            labels
                .entry(resolve_href(base_dir, &point.src))
                .or_insert_with(|| point.label.clone());
        }
        labels
    }

    pub fn len(&self) -> usize {
        self.nav_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nav_points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(label: &str, src: &str) -> NavPoint {
        NavPoint {
            label: label.to_string(),
            src: src.to_string(),
            depth: 0,
        }
    }

    #[test]
    fn test_labels_resolve_paths_and_take_first() {
        let mut nav_map = NavMap::new();
        nav_map.add_nav_point(point("Part One", "text/ch1.xhtml"));
        nav_map.add_nav_point(point("Section 1.1", "text/ch1.xhtml#s1"));
        nav_map.add_nav_point(point("Chapter Two", "text/ch2.xhtml#top"));

        let labels = nav_map.labels_by_path("OEBPS");
        assert_eq!(labels.get("OEBPS/text/ch1.xhtml").map(String::as_str), Some("Part One"));
        assert_eq!(labels.get("OEBPS/text/ch2.xhtml").map(String::as_str), Some("Chapter Two"));
        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn test_empty_labels_are_skipped() {
        let mut nav_map = NavMap::new();
        nav_map.add_nav_point(point("", "a.xhtml"));
        nav_map.add_nav_point(point("Real", "a.xhtml#x"));
        assert_eq!(nav_map.labels_by_path("").get("a.xhtml").map(String::as_str), Some("Real"));
    }
}
