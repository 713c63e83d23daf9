use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EpubError>;

/// 阅读核心的错误类型
#[derive(Error, Debug)]
pub enum EpubError {
    #[error("IO错误: {0}")]
    Io(#[from] io::Error),

    #[error("Zip文件错误: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML解析错误: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("无效的mimetype: {expected}, 找到: {found}")]
    InvalidMimetype { expected: String, found: String },

    #[error("container.xml解析错误: {0}")]
    ContainerParseError(String),

    #[error("OPF文件解析错误: {0}")]
    OpfParseError(String),

    #[error("无法解析阅读顺序: {0}")]
    UnresolvableSpine(String),

    #[error("书籍中没有可阅读的章节")]
    EmptyBook,

    #[error("章节索引越界: {index} (共 {count} 章)")]
    ChapterOutOfRange { index: usize, count: usize },

    #[error("当前没有打开的书籍")]
    NoBook,

    #[error("设置文件损坏: {0}")]
    SettingsCorrupt(String),

    #[error("设置文件写入失败: {0}")]
    SettingsWrite(String),

    #[error("无效的颜色值: {0}")]
    InvalidColor(String),

    #[error("深色模式下无法自定义颜色")]
    DarkModeActive,

    #[error("后台加载任务失败: {0}")]
    Worker(String),
}

/// 错误的粗粒度分类，供调用方决定如何呈现
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 路径不存在或不可读
    Io,
    /// 归档、清单或阅读顺序无法解析
    Format,
    /// 规范化后没有任何章节
    EmptyBook,
    /// 章节索引越界或尚未打开书籍
    OutOfRange,
    /// 设置文件不可读或不可解析（仅作诊断）
    SettingsCorrupt,
    /// 设置保存或设置值本身的问题
    Settings,
    /// 后台任务异常终止
    Worker,
}

impl EpubError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EpubError::Io(_) => ErrorKind::Io,
            EpubError::Zip(_)
            | EpubError::XmlError(_)
            | EpubError::InvalidMimetype { .. }
            | EpubError::ContainerParseError(_)
            | EpubError::OpfParseError(_)
            | EpubError::UnresolvableSpine(_) => ErrorKind::Format,
            EpubError::EmptyBook => ErrorKind::EmptyBook,
            EpubError::ChapterOutOfRange { .. } | EpubError::NoBook => ErrorKind::OutOfRange,
            EpubError::SettingsCorrupt(_) => ErrorKind::SettingsCorrupt,
            EpubError::SettingsWrite(_)
            | EpubError::InvalidColor(_)
            | EpubError::DarkModeActive => ErrorKind::Settings,
            EpubError::Worker(_) => ErrorKind::Worker,
        }
    }

    /// 是否属于格式错误（归档或清单无效）
    pub fn is_format_error(&self) -> bool {
        self.kind() == ErrorKind::Format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let io_err = EpubError::from(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert_eq!(io_err.kind(), ErrorKind::Io);
        assert!(!io_err.is_format_error());

        assert!(EpubError::OpfParseError("bad".to_string()).is_format_error());
        assert!(EpubError::Zip(zip::result::ZipError::FileNotFound).is_format_error());
        assert_eq!(EpubError::EmptyBook.kind(), ErrorKind::EmptyBook);
        assert_eq!(
            EpubError::ChapterOutOfRange { index: 5, count: 3 }.kind(),
            ErrorKind::OutOfRange
        );
        assert_eq!(EpubError::SettingsCorrupt("x".to_string()).kind(), ErrorKind::SettingsCorrupt);
    }

    #[test]
    fn test_out_of_range_message() {
        let err = EpubError::ChapterOutOfRange { index: 5, count: 3 };
        let message = err.to_string();
        assert!(message.contains('5'));
        assert!(message.contains('3'));
    }
}
