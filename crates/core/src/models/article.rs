use serde::{Deserialize, Serialize};

/// 内容源返回的原始文章，字段与 Guardian Content API 的 `results` 条目一致
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(rename = "id")]
    pub content_id: String,
    #[serde(default)]
    pub section_id: String,
    #[serde(default)]
    pub section_name: String,
    #[serde(rename = "webUrl", default)]
    pub url: String,
    #[serde(rename = "webPublicationDate", default)]
    pub published: String,
    #[serde(rename = "webTitle", default)]
    pub title: String,
    #[serde(default)]
    pub fields: ArticleFields,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub blocks: Blocks,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleFields {
    #[serde(default)]
    pub trail_text: String,
    #[serde(default)]
    pub body_text: String,
    #[serde(rename = "wordcount", default)]
    pub word_count: String,
}

/// 文章标签，`contributor` 类型的标签标题即作者名
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(rename = "webTitle", default)]
    pub title: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Blocks {
    #[serde(default)]
    pub main: Option<Block>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Block {
    #[serde(default)]
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub image_type_data: Option<ImageTypeData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub type_data: AssetTypeData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AssetTypeData {
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImageTypeData {
    #[serde(default)]
    pub caption: String,
}

impl Article {
    /// 主区块中的首个图片元素
    pub fn main_image(&self) -> Option<&Element> {
        self.blocks
            .main
            .as_ref()
            .and_then(|block| block.elements.first())
            .filter(|element| element.kind == "image")
    }

    pub fn contributors(&self) -> impl Iterator<Item = &str> {
        self.tags
            .iter()
            .filter(|tag| tag.kind.is_empty() || tag.kind == "contributor")
            .map(|tag| tag.title.as_str())
    }
}
