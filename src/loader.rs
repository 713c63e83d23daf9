//! 后台加载书籍
//!
//! 解析在 tokio 的阻塞线程池上进行。每次请求都会领取一个递增的代号，
//! 只有最新代号的结果才会发布到 [`Session`]，较早的结果直接丢弃。

use crate::book::Book;
use crate::epub::Epub;
use crate::epub::error::{EpubError, Result};
use crate::session::Session;
use crate::session::store::ReadingPosition;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::task::JoinHandle;

/// 把书籍文件解析成 [`Book`]
pub trait BookLoader: Send + Sync + 'static {
    fn load(&self, path: &Path) -> Result<Book>;
}

/// 默认的EPUB加载器
#[derive(Debug, Clone, Copy, Default)]
pub struct EpubLoader;

impl BookLoader for EpubLoader {
    fn load(&self, path: &Path) -> Result<Book> {
        Epub::open(path)?.read_book()
    }
}

/// 一次加载请求的结果
#[derive(Debug)]
pub struct LoadCompletion {
    pub generation: u64,
    pub path: PathBuf,
    /// 恢复阅读位置时请求的章节
    pub requested_chapter: Option<usize>,
    pub result: Result<Book>,
}

/// 尚未完成的加载
#[derive(Debug)]
pub struct LoadHandle {
    generation: u64,
    path: PathBuf,
    requested_chapter: Option<usize>,
    join: JoinHandle<Result<Book>>,
}

impl LoadHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 等待后台任务结束；任务异常终止时结果为 `Worker` 错误
    pub async fn wait(self) -> LoadCompletion {
        let result = match self.join.await {
            Ok(result) => result,
            Err(err) => Err(EpubError::Worker(err.to_string())),
        };

        LoadCompletion {
            generation: self.generation,
            path: self.path,
            requested_chapter: self.requested_chapter,
            result,
        }
    }
}

/// 把一次加载结果应用到会话上的效果
#[derive(Debug)]
pub enum LoadOutcome {
    /// 新书已替换当前书籍
    Published,
    /// 已有更新的请求，结果被丢弃
    Stale,
    /// 最新的请求失败，当前书籍保持不变
    Failed(EpubError),
}

/// 加载请求的调度者，保证“最后一次请求胜出”
pub struct LoadCoordinator {
    loader: Arc<dyn BookLoader>,
    generation: AtomicU64,
}

impl Default for LoadCoordinator {
    fn default() -> Self {
        Self::new(EpubLoader)
    }
}

impl LoadCoordinator {
    pub fn new<L: BookLoader>(loader: L) -> Self {
        Self {
            loader: Arc::new(loader),
            generation: AtomicU64::new(0),
        }
    }

    /// 最近一次请求的代号，尚未请求过时为0
    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// 在后台打开一本书，从第一章开始阅读
    pub fn begin_load<P: Into<PathBuf>>(&self, path: P) -> LoadHandle {
        self.spawn(path.into(), None)
    }

    /// 在后台打开一本书，并恢复到指定章节
    pub fn begin_load_at(&self, position: &ReadingPosition) -> LoadHandle {
        self.spawn(position.book_path.clone(), Some(position.chapter))
    }

    fn spawn(&self, path: PathBuf, requested_chapter: Option<usize>) -> LoadHandle {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(generation, path = %path.display(), "开始加载书籍");

        let loader = Arc::clone(&self.loader);
        let worker_path = path.clone();
        let join = tokio::task::spawn_blocking(move || loader.load(&worker_path));

        LoadHandle {
            generation,
            path,
            requested_chapter,
            join,
        }
    }

    /// 应用一次加载结果
    ///
    /// 过期的结果无论成败都被丢弃；最新的失败不会影响当前书籍。
    pub fn complete(&self, session: &mut Session, completion: LoadCompletion) -> LoadOutcome {
        let latest = self.latest_generation();
        if completion.generation != latest {
            tracing::debug!(
                generation = completion.generation,
                latest,
                path = %completion.path.display(),
                "丢弃过期的加载结果"
            );
            return LoadOutcome::Stale;
        }

        match completion.result {
            Ok(book) => {
                match completion.requested_chapter {
                    Some(chapter) => {
                        let position = ReadingPosition {
                            book_path: completion.path,
                            chapter,
                        };
                        session.restore(book, &position);
                    }
                    None => session.replace_book(book),
                }
                LoadOutcome::Published
            }
            Err(err) => {
                tracing::warn!(path = %completion.path.display(), error = %err, "书籍加载失败");
                LoadOutcome::Failed(err)
            }
        }
    }
}
