//! 归档内部路径处理

/// 把相对于 `base_dir` 的href解析为归档内的完整路径
///
/// 去掉 `#` 片段并进行百分号解码，折叠 `.` 与 `..` 段。
pub(crate) fn resolve_href(base_dir: &str, href: &str) -> String {
    let without_fragment = href.split('#').next().unwrap_or(href);
    let decoded = urlencoding::decode(without_fragment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| without_fragment.to_string());

    let joined = if decoded.starts_with('/') {
        decoded
    } else {
        format!("{}/{}", base_dir, decoded)
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// 归档内文件所在的目录（根目录为空字符串）
pub(crate) fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |index| &path[..index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_to_opf_dir() {
        assert_eq!(resolve_href("OEBPS", "text/ch1.xhtml"), "OEBPS/text/ch1.xhtml");
        assert_eq!(resolve_href("", "ch1.xhtml"), "ch1.xhtml");
        assert_eq!(resolve_href("OEBPS/toc", "../text/ch1.xhtml#p3"), "OEBPS/text/ch1.xhtml");
        assert_eq!(resolve_href("OEBPS", "./a/./b.xhtml"), "OEBPS/a/b.xhtml");
    }

    #[test]
    fn test_percent_decoding() {
        assert_eq!(resolve_href("OEBPS", "Chapter%201.xhtml"), "OEBPS/Chapter 1.xhtml");
        assert_eq!(resolve_href("OEBPS", "bad%ZZname.xhtml"), "OEBPS/bad%ZZname.xhtml");
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir("OEBPS/content.opf"), "OEBPS");
        assert_eq!(parent_dir("a/b/c.opf"), "a/b");
        assert_eq!(parent_dir("content.opf"), "");
    }
}
