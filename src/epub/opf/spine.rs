//! 脊柱模块
//!
//! 提供EPUB包中阅读顺序（脊柱）的结构定义。

/// 脊柱项信息(阅读顺序)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpineItem {
    /// 引用的清单项ID
    pub idref: String,
    /// 是否线性阅读；非线性项仍然按脊柱顺序读取
    pub linear: bool,
}

impl SpineItem {
    /// 由 `linear` 属性值构造，只有 `no` 表示非线性
    pub fn with_linear_attr(idref: impl Into<String>, linear: Option<&str>) -> Self {
        Self {
            idref: idref.into(),
            linear: linear.map_or(true, |value| value.trim() != "no"),
        }
    }
}
