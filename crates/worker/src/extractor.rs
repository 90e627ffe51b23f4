use chrono::{DateTime, Utc};
use regex::Regex;

use paperboy_core::models::{Article, Summary, SummaryArticle, SummaryImage, SummaryInfo};
use paperboy_core::traits::Transformer;
use paperboy_core::{PaperboyError, PaperboyResult};

/// 摘要配图选用的图片宽度
const IMAGE_WIDTH: u32 = 1000;

/// 把 Guardian 文章转换为摘要
///
/// 摘要取正文的前 `summary_sentences` 句。发布时间或字数无法解析时返回
/// `PaperboyError::Extraction`。
#[derive(Debug, Clone)]
pub struct ArticleExtractor {
    summary_sentences: usize,
    markup: Regex,
}

impl ArticleExtractor {
    pub fn new(summary_sentences: usize) -> PaperboyResult<Self> {
        let markup = Regex::new(r"<[^>]*>")
            .map_err(|e| PaperboyError::Configuration(e.to_string()))?;

        Ok(Self {
            summary_sentences,
            markup,
        })
    }

    fn strip_markup(&self, html: &str) -> String {
        self.markup.replace_all(html, "").trim().to_string()
    }

    fn image(article: &Article) -> Option<SummaryImage> {
        let element = article.main_image()?;
        let asset = element
            .assets
            .iter()
            .find(|asset| asset.type_data.width == IMAGE_WIDTH)?;

        Some(SummaryImage {
            url: asset.file.clone(),
            caption: element
                .image_type_data
                .as_ref()
                .map(|data| data.caption.clone())
                .unwrap_or_default(),
        })
    }
}

/// 按句末标点切分句子
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().map_or(true, |next| next.is_whitespace());
        if at_boundary {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

fn word_count(sentences: &[String]) -> u32 {
    sentences
        .iter()
        .map(|s| s.split_whitespace().count() as u32)
        .sum()
}

impl Transformer for ArticleExtractor {
    fn transform(&self, article: &Article) -> PaperboyResult<Summary> {
        let date = DateTime::parse_from_rfc3339(&article.published)
            .map_err(|e| {
                PaperboyError::extraction(
                    &article.content_id,
                    format!("无法解析发布时间 '{}': {}", article.published, e),
                )
            })?
            .with_timezone(&Utc);

        let full_word_count = article.fields.word_count.trim().parse::<u32>().map_err(|e| {
            PaperboyError::extraction(
                &article.content_id,
                format!("无法解析字数 '{}': {}", article.fields.word_count, e),
            )
        })?;

        let body = self.strip_markup(&article.fields.body_text);
        let summary_text: Vec<String> = split_sentences(&body)
            .into_iter()
            .take(self.summary_sentences)
            .collect();

        Ok(Summary {
            info: SummaryInfo {
                content_id: article.content_id.clone(),
                section_id: article.section_id.clone(),
                section_name: article.section_name.clone(),
                url: article.url.clone(),
                authors: article.contributors().map(str::to_string).collect(),
                date,
            },
            article: SummaryArticle {
                title: article.title.clone(),
                trail_text: self.strip_markup(&article.fields.trail_text),
                summary_word_count: word_count(&summary_text),
                summary_text,
                full_word_count,
            },
            image: Self::image(article),
        })
    }
}
