use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

use crate::book::{Book, BookBuilder, ChapterDraft};
use crate::epub::container::{CONTAINER_PATH, Container};
use crate::epub::error::{EpubError, Result};
use crate::epub::ncx::Ncx;
use crate::epub::opf::Opf;
use crate::epub::path::{parent_dir, resolve_href};
use crate::text::{self, MarkupKind};

/// EPUB归档的mimetype
const EPUB_MIMETYPE: &str = "application/epub+zip";

/// 按阅读顺序取出的一个标记文档
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// 清单项ID
    pub id: String,
    /// 清单中的href(相对于OPF文件)
    pub href: String,
    /// 归档内的完整路径
    pub path: String,
    /// 清单声明的媒体类型
    pub media_type: String,
    /// 原始字节
    pub bytes: Vec<u8>,
}

/// 表示一个打开的EPUB文件
pub struct Epub {
    archive: ZipArchive<File>,
    path: PathBuf,
}

impl Epub {
    /// 打开EPUB文件
    ///
    /// # 参数
    /// * `path` - epub文件的路径
    ///
    /// # 返回值
    /// * `Result<Epub>` - 文件不存在或不可读时为 `Io` 错误，不是ZIP归档
    ///   或mimetype不正确时为格式错误
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Epub> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let archive = ZipArchive::new(file)?;

        let mut epub = Epub {
            archive,
            path: path.to_path_buf(),
        };
        epub.validate()?;

        Ok(epub)
    }

    /// 检查mimetype文件
    ///
    /// mimetype存在时内容必须是 `application/epub+zip`；缺失时只记录警告，
    /// 不少真实书籍省略了这个文件。
    fn validate(&mut self) -> Result<()> {
        match self.archive.by_name("mimetype") {
            Ok(mut file) => {
                let mut content = String::new();
                file.read_to_string(&mut content)?;
                let content = content.trim();

                if content != EPUB_MIMETYPE {
                    return Err(EpubError::InvalidMimetype {
                        expected: EPUB_MIMETYPE.to_string(),
                        found: content.to_string(),
                    });
                }
                Ok(())
            }
            Err(zip::result::ZipError::FileNotFound) => {
                tracing::warn!(path = %self.path.display(), "EPUB缺少mimetype文件，继续解析");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 列出EPUB文件中的所有条目
    pub fn list_files(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }

    /// 提取指定文件的二进制内容
    pub fn extract_binary_file(&mut self, filename: &str) -> Result<Vec<u8>> {
        let mut file = self.archive.by_name(filename)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    /// 提取指定文件的文本内容（按UTF-8解码，去掉BOM）
    pub fn extract_file(&mut self, filename: &str) -> Result<String> {
        let bytes = self.extract_binary_file(filename)?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(text.trim_start_matches('\u{feff}').to_string())
    }

    /// 解析container.xml文件
    pub fn parse_container(&mut self) -> Result<Container> {
        let container_content = self.extract_file(CONTAINER_PATH).map_err(|e| match e {
            EpubError::Zip(zip::result::ZipError::FileNotFound) => {
                EpubError::ContainerParseError(format!("缺少{}", CONTAINER_PATH))
            }
            other => other,
        })?;
        Container::parse_xml(&container_content)
    }

    /// 获取主要的OPF文件路径
    pub fn opf_path(&mut self) -> Result<String> {
        let container = self.parse_container()?;
        container.opf_path().map(str::to_string).ok_or_else(|| {
            EpubError::ContainerParseError("container.xml中没有找到有效的rootfile".to_string())
        })
    }

    /// 解析OPF文件，返回OPF内容及其所在目录
    pub fn parse_opf(&mut self) -> Result<(Opf, String)> {
        let opf_path = self.opf_path()?;
        let opf_content = self.extract_file(&opf_path).map_err(|e| match e {
            EpubError::Zip(zip::result::ZipError::FileNotFound) => {
                EpubError::OpfParseError(format!("找不到OPF文件: {}", opf_path))
            }
            other => other,
        })?;

        let opf = Opf::parse_xml(&opf_content)?;
        Ok((opf, parent_dir(&opf_path).to_string()))
    }

    /// 按阅读顺序读取全部标记文档
    ///
    /// 不在脊柱中的项目和非标记项目（图片、样式、字体）被跳过；
    /// 清单中声明但归档里不存在的文件记录警告后跳过。
    pub fn documents(&mut self, opf: &Opf, opf_dir: &str) -> Result<Vec<RawDocument>> {
        let mut documents = Vec::new();

        for item in opf.reading_order()? {
            if !item.is_markup() {
                tracing::debug!(id = %item.id, media_type = %item.media_type, "跳过非标记的脊柱项");
                continue;
            }

            let path = resolve_href(opf_dir, &item.href);
            match self.extract_binary_file(&path) {
                Ok(bytes) => documents.push(RawDocument {
                    id: item.id.clone(),
                    href: item.href.clone(),
                    path,
                    media_type: item.media_type.clone(),
                    bytes,
                }),
                Err(EpubError::Zip(zip::result::ZipError::FileNotFound)) => {
                    tracing::warn!(%path, "无法读取章节文件，已跳过");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(documents)
    }

    /// NCX目录中的章节标签：归档内完整路径 -> 标签
    ///
    /// NCX缺失或损坏时返回空映射。
    fn chapter_labels(&mut self, opf: &Opf, opf_dir: &str) -> HashMap<String, String> {
        let Some(ncx_item) = opf.ncx_item() else {
            return HashMap::new();
        };

        let ncx_path = resolve_href(opf_dir, &ncx_item.href);
        let content = match self.extract_file(&ncx_path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %ncx_path, error = %e, "无法读取NCX文件");
                return HashMap::new();
            }
        };

        Ncx::parse_lenient(&content)
            .map(|ncx| ncx.nav_map.labels_by_path(parent_dir(&ncx_path)))
            .unwrap_or_default()
    }

    /// 读取整本书：元数据、阅读顺序、规范化后的章节
    ///
    /// 章节标题依次取自NCX导航标签、文档自身的标题，最后退回
    /// `"Chapter N"`。只有完整解析成功才返回 [`Book`]。
    pub fn read_book(&mut self) -> Result<Book> {
        let (opf, opf_dir) = self.parse_opf()?;
        let labels = self.chapter_labels(&opf, &opf_dir);
        let documents = self.documents(&opf, &opf_dir)?;
        tracing::debug!(count = documents.len(), "读取到阅读顺序中的标记文档");

        let mut builder = BookBuilder::new()
            .title(opf.metadata.title().map(str::to_string))
            .author(opf.metadata.primary_author());

        for document in documents {
            let kind = MarkupKind::from_media_type(&document.media_type);
            let chapter = text::read_chapter(&document.bytes, kind);
            let title = labels.get(&document.path).cloned().or(chapter.title);

            builder.push(ChapterDraft {
                source_name: document.href,
                title,
                content: chapter.text,
            });
        }

        let book = builder.build(&self.path)?;
        tracing::info!(
            title = %book.title,
            author = %book.author,
            chapters = book.chapter_count(),
            "书籍加载完成"
        );
        Ok(book)
    }
}
