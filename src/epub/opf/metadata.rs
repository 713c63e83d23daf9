//! 元数据处理模块
//!
//! 只保留阅读器需要的Dublin Core字段：标题、创建者与语言。

use std::collections::HashMap;

/// 创建者信息(作者、编辑者等)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Creator {
    /// 创建者姓名
    pub name: String,
    /// 角色(如aut、edt等)，来自 opf:role 属性或 refines 元数据
    pub role: Option<String>,
    /// 元素ID（用于关联refines元数据）
    pub id: Option<String>,
}

/// OPF文件中的元数据信息
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    titles: Vec<String>,
    creators: Vec<Creator>,
    languages: Vec<String>,
    /// refines元数据中的角色：被精化元素ID -> role
    refined_roles: HashMap<String, String>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加Dublin Core元数据元素
    ///
    /// `tag` 为去掉命名空间前缀的本地名称，如 `title`、`creator`。
    pub fn add_dublin_core(
        &mut self,
        tag: &str,
        value: &str,
        attributes: &HashMap<String, String>,
    ) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }

        match tag {
            "title" => self.titles.push(value.to_string()),
            "creator" => self.creators.push(Creator {
                name: value.to_string(),
                role: attributes.get("role").cloned(),
                id: attributes.get("id").cloned(),
            }),
            "language" => self.languages.push(value.to_string()),
            _ => {}
        }
    }

    /// 记录 `<meta refines="#id" property="role">` 形式的角色信息
    pub fn add_refines(&mut self, refines_id: &str, property: &str, content: &str) {
        if property == "role" && !content.trim().is_empty() {
            self.refined_roles
                .insert(refines_id.trim_start_matches('#').to_string(), content.trim().to_string());
        }
    }

    /// 获取第一个标题
    pub fn title(&self) -> Option<&str> {
        self.titles.first().map(String::as_str)
    }

    /// 获取所有创建者，refines中的角色会补全缺失的role
    pub fn creators(&self) -> Vec<Creator> {
        self.creators
            .iter()
            .map(|creator| {
                let mut creator = creator.clone();
                if creator.role.is_none() {
                    creator.role = creator
                        .id
                        .as_ref()
                        .and_then(|id| self.refined_roles.get(id))
                        .cloned();
                }
                creator
            })
            .collect()
    }

    /// 主要作者：第一个角色为aut的创建者，否则为第一个创建者
    pub fn primary_author(&self) -> Option<String> {
        let creators = self.creators();
        creators
            .iter()
            .find(|creator| creator.role.as_deref() == Some("aut"))
            .or_else(|| creators.first())
            .map(|creator| creator.name.clone())
    }

    /// 获取语言
    pub fn language(&self) -> Option<&str> {
        self.languages.first().map(String::as_str)
    }
}
