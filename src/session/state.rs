//! 阅读会话
//!
//! [`Session`] 持有当前书籍、当前章节与设置，是前端唯一需要操作的聚合。

use crate::book::{Book, Chapter, Spread};
use crate::epub::error::{EpubError, Result};
use crate::session::settings::{self, Settings, ThemePreset};
use crate::session::store::ReadingPosition;

/// 当前打开的书籍、阅读位置和用户偏好
#[derive(Debug, Clone, Default)]
pub struct Session {
    book: Option<Book>,
    current_chapter: usize,
    settings: Settings,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            book: None,
            current_chapter: 0,
            settings,
        }
    }

    pub fn book(&self) -> Option<&Book> {
        self.book.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// 当前章节下标
    pub fn current_index(&self) -> usize {
        self.current_chapter
    }

    /// 整体替换当前书籍，并回到第一章
    pub fn replace_book(&mut self, book: Book) {
        self.publish(book, 0);
    }

    /// 打开书籍并跳到记录的位置；越界的章节回到第一章
    pub fn restore(&mut self, book: Book, position: &ReadingPosition) {
        let chapter = position.clamp_to(book.chapter_count());
        if chapter != position.chapter {
            tracing::info!(
                requested = position.chapter,
                chapters = book.chapter_count(),
                "记录的章节超出范围，从第一章开始"
            );
        }
        self.publish(book, chapter);
    }

    fn publish(&mut self, book: Book, chapter: usize) {
        tracing::info!(title = %book.title, chapters = book.chapter_count(), "书籍已打开");
        self.settings.last_book_path = book.source_path.to_string_lossy().into_owned();
        self.book = Some(book);
        self.set_current(chapter);
    }

    fn set_current(&mut self, chapter: usize) {
        self.current_chapter = chapter;
        self.settings.last_chapter = chapter;
    }

    /// 切换到指定章节
    pub fn select_chapter(&mut self, index: usize) -> Result<&Chapter> {
        let book = self.book.as_ref().ok_or(EpubError::NoBook)?;
        book.chapter(index)?;
        self.set_current(index);
        self.current_chapter()
    }

    /// 下一章；已在最后一章时不变，返回是否发生了切换
    pub fn next_chapter(&mut self) -> bool {
        match &self.book {
            Some(book) if self.current_chapter + 1 < book.chapter_count() => {
                self.set_current(self.current_chapter + 1);
                true
            }
            _ => false,
        }
    }

    /// 上一章；已在第一章时不变
    pub fn previous_chapter(&mut self) -> bool {
        if self.book.is_some() && self.current_chapter > 0 {
            self.set_current(self.current_chapter - 1);
            true
        } else {
            false
        }
    }

    pub fn current_chapter(&self) -> Result<&Chapter> {
        self.book
            .as_ref()
            .ok_or(EpubError::NoBook)?
            .chapter(self.current_chapter)
    }

    /// 当前章节的左右两页
    pub fn current_spread(&self) -> Result<Spread> {
        self.current_chapter().map(Chapter::spread)
    }

    /// 状态栏文字，例如 `"Chapter 1 of 3: Title"`
    pub fn status_line(&self) -> String {
        match (&self.book, self.current_chapter()) {
            (Some(book), Ok(chapter)) => format!(
                "Chapter {} of {}: {}",
                self.current_chapter + 1,
                book.chapter_count(),
                chapter.title
            ),
            _ => "Ready".to_string(),
        }
    }

    pub fn increase_font_size(&mut self) -> u32 {
        self.set_font_size(self.settings.font_size.saturating_add(settings::FONT_SIZE_STEP))
    }

    pub fn decrease_font_size(&mut self) -> u32 {
        self.set_font_size(self.settings.font_size.saturating_sub(settings::FONT_SIZE_STEP))
    }

    /// 设置字号，限制在允许范围内；返回实际生效的字号
    pub fn set_font_size(&mut self, size: u32) -> u32 {
        self.settings.font_size = size.clamp(settings::MIN_FONT_SIZE, settings::MAX_FONT_SIZE);
        self.settings.font_size
    }

    pub fn set_font_family<S: Into<String>>(&mut self, family: S) {
        self.settings.font_family = family.into();
    }

    /// 切换深色模式，返回切换后的状态
    pub fn toggle_dark_mode(&mut self) -> bool {
        self.settings.dark_mode = !self.settings.dark_mode;
        self.settings.dark_mode
    }

    /// 自定义背景色与文字颜色
    ///
    /// 颜色必须是 `#rgb` 或 `#rrggbb`；深色模式下不允许修改。
    pub fn set_colors(&mut self, bg_color: &str, text_color: &str) -> Result<()> {
        if self.settings.dark_mode {
            return Err(EpubError::DarkModeActive);
        }
        for color in [bg_color, text_color] {
            if !settings::is_hex_color(color) {
                return Err(EpubError::InvalidColor(color.to_string()));
            }
        }

        self.settings.bg_color = bg_color.to_string();
        self.settings.text_color = text_color.to_string();
        Ok(())
    }

    pub fn apply_preset(&mut self, preset: ThemePreset) -> Result<()> {
        let (bg_color, text_color) = preset.colors();
        self.set_colors(bg_color, text_color)
    }
}
