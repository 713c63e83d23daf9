//! 分页
//!
//! 章节内容总是被分成左右两页，不跨章节重排。

/// 一页的内容
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub content: String,
}

/// 对开的两页
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Spread {
    pub left: Page,
    pub right: Page,
}

/// 将章节内容按单词数对半分成两页
///
/// 以空白切分单词，左页取前 `n / 2` 个，右页取其余单词，页内用单个
/// 空格连接。纯函数：相同输入总是得到相同的两页。
pub fn paginate(content: &str) -> Spread {
    let words: Vec<&str> = content.split_whitespace().collect();
    let (left, right) = words.split_at(words.len() / 2);

    Spread {
        left: Page {
            content: left.join(" "),
        },
        right: Page {
            content: right.join(" "),
        },
    }
}
