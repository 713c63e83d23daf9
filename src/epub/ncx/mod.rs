//! NCX（Navigation Control file for XML）文件解析模块
//!
//! NCX文件定义EPUB的目录结构。阅读器只用它为章节取得可读的标题。

mod navigation;
mod parser;

pub use navigation::{NavMap, NavPoint};
pub use parser::Ncx;
