//! OPF解析器模块
//!
//! 提供OPF（Open Packaging Format）文件的XML解析功能。

use crate::epub::error::{EpubError, Result};
use crate::epub::opf::{
    manifest::{Manifest, ManifestItem},
    metadata::Metadata,
    spine::SpineItem,
};
use crate::epub::xml;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;

/// 当前所在的OPF顶层区块
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Metadata,
    Manifest,
    Spine,
}

/// 正在读取文本内容的元数据元素
struct PendingElement {
    name: String,
    attributes: HashMap<String, String>,
    /// `<meta refines=.. property=..>` 的 (refines, property)
    refines: Option<(String, String)>,
}

/// OPF文件解析结果
#[derive(Debug, Clone)]
pub struct Opf {
    /// EPUB版本
    pub version: String,
    /// 元数据
    pub metadata: Metadata,
    /// 清单项(文件列表)
    pub manifest: Manifest,
    /// 脊柱(阅读顺序)
    pub spine: Vec<SpineItem>,
    /// 脊柱的目录引用(NCX清单项ID)
    pub spine_toc: Option<String>,
}

impl Opf {
    /// 解析OPF文件内容
    ///
    /// # 参数
    /// * `xml_content` - OPF文件的XML内容
    ///
    /// # 返回值
    /// * `Result<Opf>` - 解析后的OPF信息；XML结构错误时返回 `OpfParseError`
    pub fn parse_xml(xml_content: &str) -> Result<Opf> {
        Self::parse_events(xml_content).map_err(|e| match e {
            EpubError::XmlError(xml_err) => {
                EpubError::OpfParseError(format!("XML解析错误: {}", xml_err))
            }
            other => other,
        })
    }

    fn parse_events(xml_content: &str) -> Result<Opf> {
        let mut reader = xml::reader_for(xml_content);

        let mut version = String::new();
        let mut saw_package = false;
        let mut metadata = Metadata::new();
        let mut manifest = Manifest::new();
        let mut spine = Vec::new();
        let mut spine_toc = None;

        let mut buf = Vec::new();
        let mut section = Section::None;
        let mut pending: Option<PendingElement> = None;
        let mut text_content = String::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    let name = xml::local_name(e);
                    match (section, name.as_str()) {
                        (_, "package") => {
                            saw_package = true;
                            version = xml::attr(e, b"version")?.unwrap_or_default();
                        }
                        (_, "metadata") => section = Section::Metadata,
                        (_, "manifest") => section = Section::Manifest,
                        (_, "spine") => {
                            section = Section::Spine;
                            spine_toc = xml::attr(e, b"toc")?;
                        }
                        (Section::Manifest, "item") => {
                            if let Some(item) = Self::parse_manifest_item(e)? {
                                manifest.push(item);
                            }
                        }
                        (Section::Spine, "itemref") => {
                            let idref = xml::attr(e, b"idref")?.filter(|id| !id.is_empty());
                            if let Some(idref) = idref {
                                let linear = xml::attr(e, b"linear")?;
                                spine.push(SpineItem::with_linear_attr(idref, linear.as_deref()));
                            }
                        }
                        (Section::Metadata, _) => {
                            pending = Some(Self::start_metadata_element(e, name)?);
                            text_content.clear();
                        }
                        _ => {}
                    }
                }
                Event::End(ref e) => {
                    let local_name_bytes = e.local_name();
                    let name = String::from_utf8_lossy(local_name_bytes.as_ref());
                    match name.as_ref() {
                        "metadata" | "manifest" | "spine" => section = Section::None,
                        _ if section == Section::Metadata => {
                            if let Some(element) = pending.take().filter(|p| p.name == name) {
                                match element.refines {
                                    Some((refines, property)) => {
                                        metadata.add_refines(&refines, &property, &text_content);
                                    }
                                    None => metadata.add_dublin_core(
                                        &element.name,
                                        &text_content,
                                        &element.attributes,
                                    ),
                                }
                            }
                            text_content.clear();
                        }
                        _ => {}
                    }
                }
                Event::Text(e) => {
                    if pending.is_some() {
                        text_content.push_str(&e.unescape()?);
                    }
                }
                Event::CData(e) => {
                    if pending.is_some() {
                        text_content.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !saw_package {
            return Err(EpubError::OpfParseError("缺少package根元素".to_string()));
        }

        Ok(Opf {
            version,
            metadata,
            manifest,
            spine,
            spine_toc,
        })
    }

    /// 记录元数据元素的属性，等待其文本内容
    fn start_metadata_element(e: &BytesStart, name: String) -> Result<PendingElement> {
        let mut attributes = HashMap::new();
        for attr_result in e.attributes() {
            let attr = attr_result.map_err(quick_xml::Error::InvalidAttr)?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            attributes.insert(key, attr.unescape_value()?.into_owned());
        }

        let refines = if name == "meta" {
            match (attributes.get("refines"), attributes.get("property")) {
                (Some(refines), Some(property)) => Some((refines.clone(), property.clone())),
                _ => None,
            }
        } else {
            None
        };

        Ok(PendingElement {
            name,
            attributes,
            refines,
        })
    }

    /// 解析清单项；缺少id、href或media-type的条目被忽略
    fn parse_manifest_item(e: &BytesStart) -> Result<Option<ManifestItem>> {
        let id = xml::attr(e, b"id")?.unwrap_or_default();
        let href = xml::attr(e, b"href")?.unwrap_or_default();
        let media_type = xml::attr(e, b"media-type")?.unwrap_or_default();

        if id.is_empty() || href.is_empty() || media_type.is_empty() {
            tracing::debug!(%id, %href, "忽略不完整的清单项");
            return Ok(None);
        }

        let mut item = ManifestItem::new(id, href, media_type);
        item.properties = xml::attr(e, b"properties")?;
        Ok(Some(item))
    }

    /// 按脊柱顺序解析出对应的清单项
    ///
    /// 非线性项同样保留；找不到的idref会记录警告后跳过。如果脊柱非空
    /// 但所有idref都不在清单中，返回 `UnresolvableSpine`。
    pub fn reading_order(&self) -> Result<Vec<&ManifestItem>> {
        let mut resolved = Vec::new();
        for spine_item in &self.spine {
            match self.manifest.get(&spine_item.idref) {
                Some(item) => resolved.push(item),
                None => tracing::warn!(idref = %spine_item.idref, "脊柱引用了清单中不存在的项目"),
            }
        }

        if resolved.is_empty() && !self.spine.is_empty() {
            return Err(EpubError::UnresolvableSpine(
                "脊柱中的条目都无法在清单中找到".to_string(),
            ));
        }

        Ok(resolved)
    }

    /// NCX导航文件对应的清单项
    pub fn ncx_item(&self) -> Option<&ManifestItem> {
        self.spine_toc
            .as_deref()
            .and_then(|id| self.manifest.get(id))
            .or_else(|| self.manifest.iter().find(|item| item.is_ncx()))
    }
}
