pub mod book;
pub mod epub;
pub mod loader;
pub mod session;
pub mod text;

// === 核心API重新导出 ===

/// EPUB文件读取器
pub use epub::Epub;

/// 错误处理
pub use epub::{EpubError, ErrorKind, Result};

// === 数据结构 ===

/// 书籍、章节与分页
pub use book::{Book, Chapter, ChapterIndex, Page, Spread, paginate};

/// 阅读会话与设置
pub use session::{LoadedSettings, ReadingPosition, Session, SessionStore, Settings, ThemePreset};

/// 后台加载
pub use loader::{BookLoader, EpubLoader, LoadCompletion, LoadCoordinator, LoadHandle, LoadOutcome};

/// 文本规范化
pub use text::normalize;

// === 库信息 ===

/// folio库的版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// folio库的描述
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

// === 便捷函数 ===

/// 打开EPUB文件并读取整本书
///
/// 这是 `Epub::open(path)?.read_book()` 的便捷包装函数。
///
/// # 示例
///
/// ```no_run
/// let book = folio::open_book("book.epub")?;
/// println!("书名: {} / {}", book.title, book.author);
/// for entry in book.chapters.table_of_contents() {
///     println!("{}", entry);
/// }
/// # Ok::<(), folio::EpubError>(())
/// ```
pub fn open_book<P: AsRef<std::path::Path>>(path: P) -> Result<Book> {
    Epub::open(path)?.read_book()
}
