//! quick-xml 的小工具函数
//!
//! container.xml、OPF 与 NCX 的解析器共用这些属性读取逻辑。

use crate::epub::error::Result;
use quick_xml::events::BytesStart;
use quick_xml::reader::Reader;

/// 创建统一配置的 XML 读取器
pub(crate) fn reader_for(xml_content: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(xml_content);
    reader.config_mut().trim_text(true);
    reader.config_mut().expand_empty_elements = true;
    reader
}

/// 按本地名称读取属性值（忽略命名空间前缀），并处理实体转义
pub(crate) fn attr(e: &BytesStart, local_name: &[u8]) -> Result<Option<String>> {
    for attr_result in e.attributes() {
        let attr = attr_result.map_err(quick_xml::Error::InvalidAttr)?;
        if attr.key.local_name().as_ref() == local_name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// 元素的本地名称
pub(crate) fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}
