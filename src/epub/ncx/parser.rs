//! NCX解析器模块

use crate::epub::error::Result;
use crate::epub::ncx::navigation::{NavMap, NavPoint};
use crate::epub::xml;
use quick_xml::events::Event;

/// NCX文件解析结果
#[derive(Debug, Clone, Default)]
pub struct Ncx {
    /// 文档标题
    pub doc_title: Option<String>,
    /// 导航地图
    pub nav_map: NavMap,
}

impl Ncx {
    /// 解析NCX文件内容
    ///
    /// 嵌套的navPoint按文档顺序平铺，父节点在子节点之前。
    pub fn parse_xml(xml_content: &str) -> Result<Ncx> {
        let mut reader = xml::reader_for(xml_content);

        let mut ncx = Ncx::default();
        let mut buf = Vec::new();
        let mut text_content = String::new();

        // 正在解析的navPoint在nav_points中的下标
        let mut open_points: Vec<usize> = Vec::new();
        let mut in_doc_title = false;
        let mut in_nav_label = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    match e.local_name().as_ref() {
                        b"docTitle" => in_doc_title = true,
                        b"navPoint" => {
                            open_points.push(ncx.nav_map.len());
                            ncx.nav_map.add_nav_point(NavPoint {
                                label: String::new(),
                                src: String::new(),
                                depth: open_points.len() - 1,
                            });
                        }
                        b"navLabel" if !open_points.is_empty() => in_nav_label = true,
                        b"content" => {
                            if let Some(&index) = open_points.last() {
                                let point = &mut ncx.nav_map.nav_points[index];
                                if point.src.is_empty() {
                                    point.src = xml::attr(e, b"src")?.unwrap_or_default();
                                }
                            }
                        }
                        _ => {}
                    }
                    text_content.clear();
                }
                Event::End(ref e) => match e.local_name().as_ref() {
                    b"text" if in_doc_title => {
                        ncx.doc_title = Some(text_content.trim().to_string());
                    }
                    b"text" if in_nav_label => {
                        if let Some(&index) = open_points.last() {
                            ncx.nav_map.nav_points[index].label =
                                collapse_whitespace(&text_content);
                        }
                    }
                    b"docTitle" => in_doc_title = false,
                    b"navLabel" => in_nav_label = false,
                    b"navPoint" => {
                        open_points.pop();
                    }
                    _ => {}
                },
                Event::Text(e) => {
                    text_content.push_str(&e.unescape()?);
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(ncx)
    }

    /// 解析NCX；失败时记录警告并返回None，NCX问题从不影响书籍加载
    pub fn parse_lenient(xml_content: &str) -> Option<Ncx> {
        Self::parse_xml(xml_content)
            .inspect_err(|err| tracing::warn!(error = %err, "NCX文件解析失败，章节标题将使用备用来源"))
            .ok()
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_NCX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head><meta name="dtb:uid" content="id"/></head>
  <docTitle><text>Sample Book</text></docTitle>
  <navMap>
    <navPoint id="p1" playOrder="1">
      <navLabel><text>Part
        One</text></navLabel>
      <content src="text/part1.xhtml"/>
      <navPoint id="p1c1" playOrder="2">
        <navLabel><text>Chapter 1</text></navLabel>
        <content src="text/ch1.xhtml#start"/>
      </navPoint>
    </navPoint>
    <navPoint id="p2" playOrder="3">
      <navLabel><text>Epilogue</text></navLabel>
      <content src="text/epilogue.xhtml"/>
    </navPoint>
  </navMap>
</ncx>"#;

    #[test]
    fn test_parse_ncx_flattens_in_document_order() {
        let ncx = Ncx::parse_xml(SAMPLE_NCX).unwrap();
        assert_eq!(ncx.doc_title.as_deref(), Some("Sample Book"));

        let points = &ncx.nav_map.nav_points;
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].label, "Part One");
        assert_eq!(points[0].depth, 0);
        assert_eq!(points[1].label, "Chapter 1");
        assert_eq!(points[1].src, "text/ch1.xhtml#start");
        assert_eq!(points[1].depth, 1);
        assert_eq!(points[2].label, "Epilogue");
        assert_eq!(points[2].depth, 0);
    }

    #[test]
    fn test_label_lookup_after_parse() {
        let ncx = Ncx::parse_xml(SAMPLE_NCX).unwrap();
        let labels = ncx.nav_map.labels_by_path("OEBPS");
        assert_eq!(labels.get("OEBPS/text/ch1.xhtml").map(String::as_str), Some("Chapter 1"));
    }

    #[test]
    fn test_parse_lenient_swallows_errors() {
        assert!(Ncx::parse_lenient("<ncx><navMap></ncx>").is_none());
        assert!(Ncx::parse_lenient(SAMPLE_NCX).is_some());
    }
}
