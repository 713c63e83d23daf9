//! 按XML解析XHTML章节
//!
//! `<script/>`、`<title/>` 这样的自闭合元素在HTML5解析规则下会吞掉后面的
//! 正文，所以XHTML文档用 quick-xml 逐个事件读取。

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// 内容会被整体丢弃的标签
const SKIPPED_TAGS: [&str; 2] = ["script", "style"];

/// 一次遍历得到的原始文本与标题候选
#[derive(Debug, Default)]
pub(crate) struct XhtmlText {
    /// 按文档顺序拼接的文本，尚未清理空白
    pub text: String,
    /// 第一个非空的 `<title>`
    pub title: Option<String>,
    /// 第一个非空的 `<h1>`/`<h2>`
    pub heading: Option<String>,
}

/// 遍历XHTML文档；文档不是合法XML时返回错误，由调用方改用HTML解析
pub(crate) fn read(source: &str) -> quick_xml::Result<XhtmlText> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text(false);

    let mut result = XhtmlText::default();
    let mut buf = Vec::new();
    let mut skip_depth = 0usize;
    let mut title_buf: Option<String> = None;
    // 正在读取的标题文本及其嵌套深度
    let mut heading_buf: Option<(String, usize)> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let tag = tag_name(e.local_name().as_ref());
                if SKIPPED_TAGS.contains(&tag.as_str()) {
                    skip_depth += 1;
                } else if skip_depth == 0 {
                    if let Some((_, depth)) = heading_buf.as_mut() {
                        *depth += 1;
                    } else if matches!(tag.as_str(), "h1" | "h2") && result.heading.is_none() {
                        heading_buf = Some((String::new(), 1));
                    }
                    if tag == "title" && result.title.is_none() {
                        title_buf = Some(String::new());
                    }
                }
            }
            Event::End(e) => {
                let tag = tag_name(e.local_name().as_ref());
                if SKIPPED_TAGS.contains(&tag.as_str()) {
                    skip_depth = skip_depth.saturating_sub(1);
                } else if skip_depth == 0 {
                    if tag == "title" {
                        if let Some(title) = title_buf.take() {
                            result.title = collapsed(&title);
                        }
                    }
                    if let Some((heading, depth)) = heading_buf.as_mut() {
                        *depth -= 1;
                        if *depth == 0 {
                            result.heading = collapsed(heading);
                            heading_buf = None;
                        }
                    }
                }
            }
            Event::Text(e) => {
                if skip_depth == 0 {
                    let text = e.unescape_with(|entity| {
                        resolve_predefined_entity(entity).or_else(|| resolve_common_entity(entity))
                    })?;
                    push_text(&text, &mut result.text, &mut title_buf, &mut heading_buf);
                }
            }
            Event::CData(e) => {
                if skip_depth == 0 {
                    let text = String::from_utf8_lossy(&e);
                    push_text(&text, &mut result.text, &mut title_buf, &mut heading_buf);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(result)
}

fn push_text(
    text: &str,
    all: &mut String,
    title: &mut Option<String>,
    heading: &mut Option<(String, usize)>,
) {
    all.push_str(text);
    if let Some(title) = title.as_mut() {
        title.push_str(text);
    }
    if let Some((heading, _)) = heading.as_mut() {
        heading.push_str(text);
    }
}

fn tag_name(local_name: &[u8]) -> String {
    String::from_utf8_lossy(local_name).to_ascii_lowercase()
}

fn collapsed(text: &str) -> Option<String> {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

/// 电子书中常见、但XML未预定义的HTML实体
fn resolve_common_entity(entity: &str) -> Option<&'static str> {
    let value = match entity {
        "nbsp" => "\u{a0}",
        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "thinsp" => "\u{2009}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "hellip" => "\u{2026}",
        "copy" => "\u{a9}",
        "reg" => "\u{ae}",
        "shy" => "\u{ad}",
        "middot" => "\u{b7}",
        _ => return None,
    };
    Some(value)
}
