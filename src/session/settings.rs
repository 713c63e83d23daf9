//! 阅读设置
//!
//! 设置文档是扁平的键值结构。已知键映射为 [`Settings`] 的字段，未知键
//! 原样保存在 `extra` 中，读写往返都不会丢失。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// 字号下限
pub const MIN_FONT_SIZE: u32 = 8;
/// 字号上限
pub const MAX_FONT_SIZE: u32 = 32;
/// 每次放大/缩小的步长
pub const FONT_SIZE_STEP: u32 = 2;

/// 界面提供的字体选项
pub const FONT_FAMILIES: [&str; 5] =
    ["Arial", "Times New Roman", "Georgia", "Verdana", "Courier New"];

/// 用户设置与上次的阅读位置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub font_size: u32,
    pub font_family: String,
    pub dark_mode: bool,
    /// 背景色，`#rrggbb`
    pub bg_color: String,
    /// 文字颜色，`#rrggbb`
    pub text_color: String,
    /// 目前只被读写，分页总是两页
    pub two_page_mode: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub sidebar_width: u32,
    pub last_book_path: String,
    pub last_chapter: usize,
    pub auto_load_last_book: bool,
    /// 文档中无法识别的键
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yml::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_size: 12,
            font_family: "Georgia".to_string(),
            dark_mode: false,
            bg_color: "#f5f5dc".to_string(),
            text_color: "#2c2c2c".to_string(),
            two_page_mode: true,
            window_width: 1200,
            window_height: 800,
            sidebar_width: 250,
            last_book_path: String::new(),
            last_chapter: 0,
            auto_load_last_book: true,
            extra: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// 用 `other` 的已知字段覆盖自身，并合并其未知键
    ///
    /// 自身已有的未知键不会被删除。
    pub fn merge_from(&mut self, other: &Settings) {
        let extra = std::mem::take(&mut self.extra);
        *self = Settings {
            extra,
            ..other.clone()
        };
        for (key, value) in &other.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }
}

/// 预设的阅读配色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemePreset {
    Cream,
    Sepia,
    LightBlue,
    LightGreen,
    LightYellow,
    /// 白底黑字
    Default,
}

impl ThemePreset {
    pub const ALL: [ThemePreset; 6] = [
        ThemePreset::Cream,
        ThemePreset::Sepia,
        ThemePreset::LightBlue,
        ThemePreset::LightGreen,
        ThemePreset::LightYellow,
        ThemePreset::Default,
    ];

    /// (背景色, 文字颜色)
    pub fn colors(self) -> (&'static str, &'static str) {
        match self {
            ThemePreset::Cream => ("#f5f5dc", "#2c2c2c"),
            ThemePreset::Sepia => ("#f4ecd8", "#5c4b37"),
            ThemePreset::LightBlue => ("#e6f3ff", "#2c2c2c"),
            ThemePreset::LightGreen => ("#f0f8f0", "#2c2c2c"),
            ThemePreset::LightYellow => ("#fffff0", "#2c2c2c"),
            ThemePreset::Default => ("#ffffff", "#000000"),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ThemePreset::Cream => "cream",
            ThemePreset::Sepia => "sepia",
            ThemePreset::LightBlue => "light-blue",
            ThemePreset::LightGreen => "light-green",
            ThemePreset::LightYellow => "light-yellow",
            ThemePreset::Default => "default",
        }
    }
}

impl fmt::Display for ThemePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ThemePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        ThemePreset::ALL
            .into_iter()
            .find(|preset| preset.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<_> = ThemePreset::ALL.iter().map(|p| p.name()).collect();
                format!("未知的配色方案: {} (可选: {})", s, names.join(", "))
            })
    }
}

/// 是否为 `#rgb` 或 `#rrggbb` 形式的颜色
pub fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.font_size, 12);
        assert_eq!(settings.font_family, "Georgia");
        assert!(!settings.dark_mode);
        assert_eq!(settings.bg_color, "#f5f5dc");
        assert_eq!(settings.text_color, "#2c2c2c");
        assert!(settings.two_page_mode);
        assert_eq!(settings.window_width, 1200);
        assert_eq!(settings.window_height, 800);
        assert_eq!(settings.sidebar_width, 250);
        assert_eq!(settings.last_book_path, "");
        assert_eq!(settings.last_chapter, 0);
        assert!(settings.auto_load_last_book);
        assert!(settings.extra.is_empty());
    }

    #[test]
    fn test_partial_document_is_merged_over_defaults() {
        let settings: Settings = serde_yml::from_str("font_size: 18\ndark_mode: true\n").unwrap();
        assert_eq!(settings.font_size, 18);
        assert!(settings.dark_mode);
        assert_eq!(settings.font_family, "Georgia");
        assert_eq!(settings.window_width, 1200);
    }

    #[test]
    fn test_unknown_keys_round_trip() {
        let yaml = "font_size: 14\nreader_plugin: enabled\nrecent:\n  - a.epub\n  - b.epub\n";
        let settings: Settings = serde_yml::from_str(yaml).unwrap();
        assert_eq!(settings.extra.len(), 2);
        assert!(settings.extra.contains_key("reader_plugin"));

        let written = serde_yml::to_string(&settings).unwrap();
        let reread: Settings = serde_yml::from_str(&written).unwrap();
        assert_eq!(reread, settings);
    }

    #[test]
    fn test_merge_from_keeps_existing_unknown_keys() {
        let mut current: Settings = serde_yml::from_str("legacy: 1\n").unwrap();
        let mut update = Settings {
            font_size: 20,
            ..Settings::default()
        };
        update.extra.insert("added".to_string(), serde_yml::Value::Bool(true));

        current.merge_from(&update);
        assert_eq!(current.font_size, 20);
        assert!(current.extra.contains_key("legacy"));
        assert!(current.extra.contains_key("added"));
    }

    #[test]
    fn test_theme_presets() {
        assert_eq!(ThemePreset::Sepia.colors(), ("#f4ecd8", "#5c4b37"));
        assert_eq!("Light Blue".parse::<ThemePreset>(), Ok(ThemePreset::LightBlue));
        assert_eq!("light_green".parse::<ThemePreset>(), Ok(ThemePreset::LightGreen));
        assert!("neon".parse::<ThemePreset>().is_err());
        for preset in ThemePreset::ALL {
            let (bg, text) = preset.colors();
            assert!(is_hex_color(bg) && is_hex_color(text));
        }
    }

    #[test]
    fn test_hex_colors() {
        assert!(is_hex_color("#fff"));
        assert!(is_hex_color("#A0b1C2"));
        assert!(!is_hex_color("fff"));
        assert!(!is_hex_color("#ffff"));
        assert!(!is_hex_color("#gggggg"));
        assert!(!is_hex_color(""));
    }
}
