pub mod container;
pub mod error;
pub mod ncx;
pub mod opf;
pub mod reader;
mod path;
mod xml;

#[cfg(test)]
pub(crate) mod fixtures;

// 重新导出错误处理
pub use error::{EpubError, ErrorKind, Result};

// 重新导出容器相关
pub use container::{Container, RootFile};

// 重新导出EPUB读取器
pub use reader::{Epub, RawDocument};

// 重新导出OPF相关
pub use opf::{Creator, Manifest, ManifestItem, Metadata, Opf, SpineItem};

// 重新导出NCX相关
pub use ncx::{NavMap, NavPoint, Ncx};
