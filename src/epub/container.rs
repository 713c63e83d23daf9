use crate::epub::error::{EpubError, Result};
use crate::epub::xml;
use quick_xml::events::Event;

/// 容器描述文件在归档中的固定位置
pub const CONTAINER_PATH: &str = "META-INF/container.xml";

/// OPF包文件的媒体类型
const OPF_MEDIA_TYPE: &str = "application/oebps-package+xml";

/// Container.xml中的rootfile信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootFile {
    pub full_path: String,
    pub media_type: String,
}

/// Container.xml的解析结果
#[derive(Debug, Clone)]
pub struct Container {
    pub rootfiles: Vec<RootFile>,
}

impl Container {
    /// 解析container.xml内容
    ///
    /// 缺少 full-path 的 rootfile 会被忽略；一个可用条目都没有时返回
    /// `ContainerParseError`。
    pub fn parse_xml(xml_content: &str) -> Result<Container> {
        let mut reader = xml::reader_for(xml_content);
        let mut rootfiles = Vec::new();
        let mut buf = Vec::new();
        let mut in_rootfiles = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => match e.local_name().as_ref() {
                    b"rootfiles" => in_rootfiles = true,
                    b"rootfile" if in_rootfiles => {
                        let full_path = xml::attr(e, b"full-path")?.unwrap_or_default();
                        let media_type = xml::attr(e, b"media-type")?.unwrap_or_default();
                        if !full_path.is_empty() {
                            rootfiles.push(RootFile { full_path, media_type });
                        }
                    }
                    _ => {}
                },
                Event::End(ref e) if e.local_name().as_ref() == b"rootfiles" => {
                    in_rootfiles = false;
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if rootfiles.is_empty() {
            return Err(EpubError::ContainerParseError(
                "没有找到任何rootfile条目".to_string(),
            ));
        }

        Ok(Container { rootfiles })
    }

    /// 主要OPF文件的路径：优先取OPF媒体类型的条目，否则取第一个
    pub fn opf_path(&self) -> Option<&str> {
        self.rootfiles
            .iter()
            .find(|rootfile| rootfile.media_type == OPF_MEDIA_TYPE)
            .or_else(|| self.rootfiles.first())
            .map(|rootfile| rootfile.full_path.as_str())
    }
}
