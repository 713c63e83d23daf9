use crate::text::xhtml;
use once_cell::sync::Lazy;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// 内容会被整体丢弃的标签
const DROPPED_TAGS: [&str; 2] = ["script", "style"];

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("title选择器是合法的CSS"));
static HEADING_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2").expect("标题选择器是合法的CSS"));

/// 章节标记的类型，决定使用哪种解析规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupKind {
    /// `application/xhtml+xml`：按XML解析，不合法时退回HTML解析
    Xhtml,
    /// `text/html`
    Html,
}

impl MarkupKind {
    pub fn from_media_type(media_type: &str) -> Self {
        if media_type.trim().eq_ignore_ascii_case("text/html") {
            MarkupKind::Html
        } else {
            MarkupKind::Xhtml
        }
    }
}

/// 一个章节文档的规范化结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterText {
    /// 规范化后的正文，为空表示没有可阅读的文字
    pub text: String,
    /// 文档自身声明的标题
    pub title: Option<String>,
}

/// 将标记文档规范化为纯文本
///
/// 先移除script与style块，再按文档顺序取出全部文本，最后用
/// [`clean_text`] 清理空白。返回值没有首尾空白，也不包含换行符；
/// 返回空字符串表示这一项没有可阅读的文字。
///
/// # 参数
/// * `markup` - 章节文件的原始字节（按UTF-8解码，非法字节会被替换）
pub fn normalize(markup: &[u8]) -> String {
    read_chapter(markup, MarkupKind::Xhtml).text
}

/// 文档自身声明的标题：`<title>`，否则第一个 `<h1>`/`<h2>`
pub fn extract_title(markup: &[u8]) -> Option<String> {
    read_chapter(markup, MarkupKind::Xhtml).title
}

/// 一次解析同时得到正文与标题
pub fn read_chapter(markup: &[u8], kind: MarkupKind) -> ChapterText {
    let source = String::from_utf8_lossy(markup);
    let source = source.trim_start_matches('\u{feff}');

    if kind == MarkupKind::Xhtml {
        match xhtml::read(source) {
            Ok(document) => {
                return ChapterText {
                    text: clean_text(&document.text),
                    title: document.title.or(document.heading),
                };
            }
            Err(e) => tracing::debug!(error = %e, "文档不是合法的XML，改用HTML解析"),
        }
    }

    let document = Html::parse_document(source);
    let mut text = String::new();
    collect_text(document.root_element(), &mut text);
    ChapterText {
        text: clean_text(&text),
        title: html_title(&document),
    }
}

fn html_title(document: &Html) -> Option<String> {
    [&*TITLE_SELECTOR, &*HEADING_SELECTOR]
        .into_iter()
        .find_map(|selector| {
            document
                .select(selector)
                .map(|element| element.text().collect::<Vec<_>>().join(" "))
                .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
                .find(|text| !text.is_empty())
        })
}

/// 清理空白
///
/// 按行拆分并去除每行首尾空白，再按两个及以上连续空格拆分成片段，
/// 去掉空片段后用单个空格连接。
pub fn clean_text(text: &str) -> String {
    text.split(is_line_boundary)
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn collect_text(element: ElementRef, result: &mut String) {
    if DROPPED_TAGS.contains(&element.value().name()) {
        return;
    }

    for node in element.children() {
        match node.value() {
            Node::Text(text) => result.push_str(text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(node) {
                    collect_text(child, result);
                }
            }
            _ => {}
        }
    }
}

/// 与常见的 `splitlines` 语义一致的行边界字符
fn is_line_boundary(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r'
            | '\u{0b}'
            | '\u{0c}'
            | '\u{1c}'
            | '\u{1d}'
            | '\u{1e}'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}
