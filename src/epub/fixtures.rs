//! 测试用EPUB构造工具

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const DEFAULT_CONTAINER: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
    <rootfiles>
        <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
    </rootfiles>
</container>"#;

/// 一个最小的XHTML章节
pub(crate) fn chapter_xhtml(title: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>{title}</title></head>
<body><p>{body}</p></body>
</html>"#
    )
}

struct FixtureItem {
    id: String,
    href: String,
    media_type: String,
    /// 归档内路径与内容；None表示只在清单中声明
    file: Option<(String, Vec<u8>)>,
}

/// EPUB测试文件构造器
pub(crate) struct EpubFixture {
    mimetype: Option<String>,
    container: Option<String>,
    opf_path: String,
    raw_opf: Option<String>,
    title: Option<String>,
    author: Option<String>,
    items: Vec<FixtureItem>,
    spine: Option<Vec<String>>,
    ncx: Option<Vec<(String, String)>>,
}

/// 写入临时目录后的EPUB文件
pub(crate) struct WrittenFixture {
    _dir: TempDir,
    path: PathBuf,
}

impl WrittenFixture {
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl EpubFixture {
    pub(crate) fn new() -> Self {
        Self {
            mimetype: Some("application/epub+zip".to_string()),
            container: Some(DEFAULT_CONTAINER.to_string()),
            opf_path: "OEBPS/content.opf".to_string(),
            raw_opf: None,
            title: Some("Test Book".to_string()),
            author: Some("Test Author".to_string()),
            items: Vec::new(),
            spine: None,
            ncx: None,
        }
    }

    /// 两章的标准测试书
    pub(crate) fn standard() -> Self {
        Self::new()
            .chapter(
                "chapter1",
                "text/chapter1.xhtml",
                &chapter_xhtml("Chapter One", "This is the first chapter."),
            )
            .chapter(
                "chapter2",
                "text/chapter2.xhtml",
                &chapter_xhtml("Chapter Two", "This is the second chapter."),
            )
    }

    pub(crate) fn mimetype(mut self, mimetype: Option<&str>) -> Self {
        self.mimetype = mimetype.map(str::to_string);
        self
    }

    pub(crate) fn container(mut self, container: Option<&str>) -> Self {
        self.container = container.map(str::to_string);
        self
    }

    /// OPF实际写入的位置（container.xml仍指向默认位置）
    pub(crate) fn opf_path(mut self, path: &str) -> Self {
        self.opf_path = path.to_string();
        self
    }

    pub(crate) fn raw_opf(mut self, opf: &str) -> Self {
        self.raw_opf = Some(opf.to_string());
        self
    }

    pub(crate) fn metadata(mut self, title: Option<&str>, author: Option<&str>) -> Self {
        self.title = title.map(str::to_string);
        self.author = author.map(str::to_string);
        self
    }

    pub(crate) fn chapter(self, id: &str, href: &str, content: &str) -> Self {
        let archive_path = format!("OEBPS/{}", href);
        self.chapter_at(id, href, &archive_path, content)
    }

    pub(crate) fn chapter_at(
        mut self,
        id: &str,
        href: &str,
        archive_path: &str,
        content: &str,
    ) -> Self {
        self.items.push(FixtureItem {
            id: id.to_string(),
            href: href.to_string(),
            media_type: "application/xhtml+xml".to_string(),
            file: Some((archive_path.to_string(), content.as_bytes().to_vec())),
        });
        self
    }

    pub(crate) fn resource(mut self, id: &str, href: &str, media_type: &str, bytes: &[u8]) -> Self {
        self.items.push(FixtureItem {
            id: id.to_string(),
            href: href.to_string(),
            media_type: media_type.to_string(),
            file: Some((format!("OEBPS/{}", href), bytes.to_vec())),
        });
        self
    }

    pub(crate) fn declared_only(mut self, id: &str, href: &str) -> Self {
        self.items.push(FixtureItem {
            id: id.to_string(),
            href: href.to_string(),
            media_type: "application/xhtml+xml".to_string(),
            file: None,
        });
        self
    }

    pub(crate) fn spine(mut self, ids: &[&str]) -> Self {
        self.spine = Some(ids.iter().map(|id| id.to_string()).collect());
        self
    }

    /// 添加NCX目录，src相对于OEBPS目录
    pub(crate) fn ncx(mut self, points: &[(&str, &str)]) -> Self {
        self.ncx = Some(
            points
                .iter()
                .map(|(label, src)| (label.to_string(), src.to_string()))
                .collect(),
        );
        self
    }

    fn opf_xml(&self) -> String {
        let mut metadata = String::new();
        if let Some(title) = &self.title {
            metadata.push_str(&format!("<dc:title>{}</dc:title>", title));
        }
        if let Some(author) = &self.author {
            metadata.push_str(&format!("<dc:creator>{}</dc:creator>", author));
        }

        let mut manifest = String::new();
        for item in &self.items {
            manifest.push_str(&format!(
                r#"<item id="{}" href="{}" media-type="{}"/>"#,
                item.id, item.href, item.media_type
            ));
        }
        if self.ncx.is_some() {
            manifest.push_str(
                r#"<item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>"#,
            );
        }

        let spine_ids: Vec<String> = match &self.spine {
            Some(ids) => ids.clone(),
            None => self.items.iter().map(|item| item.id.clone()).collect(),
        };
        let spine: String = spine_ids
            .iter()
            .map(|id| format!(r#"<itemref idref="{}"/>"#, id))
            .collect();
        let toc_attr = if self.ncx.is_some() { r#" toc="ncx""# } else { "" };

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package version="2.0" xmlns="http://www.idpf.org/2007/opf" unique-identifier="BookId">
<metadata xmlns:dc="http://purl.org/dc/elements/1.1/">{metadata}</metadata>
<manifest>{manifest}</manifest>
<spine{toc_attr}>{spine}</spine>
</package>"#
        )
    }

    fn ncx_xml(points: &[(String, String)]) -> String {
        let nav_points: String = points
            .iter()
            .enumerate()
            .map(|(i, (label, src))| {
                format!(
                    concat!(
                        r#"<navPoint id="p{i}" playOrder="{order}">"#,
                        r#"<navLabel><text>{label}</text></navLabel>"#,
                        r#"<content src="{src}"/></navPoint>"#,
                    ),
                    i = i,
                    order = i + 1,
                    label = label,
                    src = src,
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
<docTitle><text>Test Book</text></docTitle>
<navMap>{nav_points}</navMap>
</ncx>"#
        )
    }

    /// 写到指定路径
    pub(crate) fn write_to(&self, path: &Path) {
        let file = File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);

        if let Some(mimetype) = &self.mimetype {
            zip.start_file("mimetype", SimpleFileOptions::default()).unwrap();
            zip.write_all(mimetype.as_bytes()).unwrap();
        }
        if let Some(container) = &self.container {
            zip.start_file("META-INF/container.xml", SimpleFileOptions::default()).unwrap();
            zip.write_all(container.as_bytes()).unwrap();
        }

        let opf = self.raw_opf.clone().unwrap_or_else(|| self.opf_xml());
        zip.start_file(self.opf_path.as_str(), SimpleFileOptions::default()).unwrap();
        zip.write_all(opf.as_bytes()).unwrap();

        if let Some(points) = &self.ncx {
            zip.start_file("OEBPS/toc.ncx", SimpleFileOptions::default()).unwrap();
            zip.write_all(Self::ncx_xml(points).as_bytes()).unwrap();
        }

        for item in &self.items {
            if let Some((archive_path, bytes)) = &item.file {
                zip.start_file(archive_path.as_str(), SimpleFileOptions::default()).unwrap();
                zip.write_all(bytes).unwrap();
            }
        }

        zip.finish().unwrap();
    }

    /// 写入一个新的临时目录
    pub(crate) fn write(&self) -> WrittenFixture {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.epub");
        self.write_to(&path);
        WrittenFixture { _dir: dir, path }
    }
}
