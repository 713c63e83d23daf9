//! 文本规范化模块
//!
//! 把章节的XHTML/HTML标记转换为单段落的纯文本。

mod normalizer;
mod xhtml;

pub use normalizer::{ChapterText, MarkupKind, clean_text, extract_title, normalize, read_chapter};
