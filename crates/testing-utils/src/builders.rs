//! Test data builders for creating test entities
//!
//! This module provides builder patterns for creating test data with
//! sensible defaults and easy customization.

use chrono::{DateTime, TimeZone, Utc};
use paperboy_core::models::{
    Article, ArticleFields, Asset, AssetTypeData, Block, Blocks, Element, ImageTypeData, Summary,
    SummaryArticle, SummaryImage, SummaryInfo, Tag,
};

/// Builder for creating test Article entities
pub struct ArticleBuilder {
    article: Article,
}

impl ArticleBuilder {
    pub fn new(content_id: &str) -> Self {
        Self {
            article: Article {
                content_id: content_id.to_string(),
                section_id: "world".to_string(),
                section_name: "World news".to_string(),
                url: format!("https://www.theguardian.com/{content_id}"),
                published: "2024-03-01T10:00:00Z".to_string(),
                title: format!("Headline for {content_id}"),
                fields: ArticleFields {
                    trail_text: "<p>A short trail.</p>".to_string(),
                    body_text: "First sentence. Second sentence. Third sentence.".to_string(),
                    word_count: "6".to_string(),
                },
                tags: Vec::new(),
                blocks: Blocks::default(),
            },
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.article.title = title.to_string();
        self
    }

    pub fn with_section(mut self, id: &str, name: &str) -> Self {
        self.article.section_id = id.to_string();
        self.article.section_name = name.to_string();
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.article.url = url.to_string();
        self
    }

    pub fn with_published(mut self, published: &str) -> Self {
        self.article.published = published.to_string();
        self
    }

    pub fn with_trail_text(mut self, trail_text: &str) -> Self {
        self.article.fields.trail_text = trail_text.to_string();
        self
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.article.fields.body_text = body.to_string();
        self
    }

    pub fn with_word_count(mut self, word_count: &str) -> Self {
        self.article.fields.word_count = word_count.to_string();
        self
    }

    pub fn with_contributor(mut self, name: &str) -> Self {
        self.article.tags.push(Tag {
            id: format!("profile/{}", name.to_lowercase().replace(' ', "-")),
            kind: "contributor".to_string(),
            title: name.to_string(),
        });
        self
    }

    /// Adds an asset to the main image element, creating it on first use
    pub fn with_image(mut self, file: &str, width: u32, caption: &str) -> Self {
        let main = self.article.blocks.main.get_or_insert_with(Block::default);
        if main.elements.is_empty() {
            main.elements.push(Element {
                kind: "image".to_string(),
                assets: Vec::new(),
                image_type_data: Some(ImageTypeData {
                    caption: caption.to_string(),
                }),
            });
        }
        main.elements[0].assets.push(Asset {
            file: file.to_string(),
            type_data: AssetTypeData {
                width,
                height: width * 3 / 5,
            },
        });
        self
    }

    pub fn build(self) -> Article {
        self.article
    }
}

/// Builder for creating test Summary entities
pub struct SummaryBuilder {
    summary: Summary,
}

impl SummaryBuilder {
    pub fn new(content_id: &str) -> Self {
        Self {
            summary: Summary {
                info: SummaryInfo {
                    content_id: content_id.to_string(),
                    section_id: "world".to_string(),
                    section_name: "World news".to_string(),
                    url: format!("https://www.theguardian.com/{content_id}"),
                    authors: Vec::new(),
                    date: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
                },
                article: SummaryArticle {
                    title: format!("Headline for {content_id}"),
                    trail_text: "A short trail.".to_string(),
                    summary_text: vec!["First sentence.".to_string()],
                    full_word_count: 6,
                    summary_word_count: 2,
                },
                image: None,
            },
        }
    }

    pub fn with_section(mut self, id: &str, name: &str) -> Self {
        self.summary.info.section_id = id.to_string();
        self.summary.info.section_name = name.to_string();
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.summary.article.title = title.to_string();
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.summary.info.date = date;
        self
    }

    pub fn with_authors(mut self, authors: &[&str]) -> Self {
        self.summary.info.authors = authors.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_summary_text(mut self, sentences: &[&str]) -> Self {
        self.summary.article.summary_text = sentences.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_image(mut self, url: &str, caption: &str) -> Self {
        self.summary.image = Some(SummaryImage {
            url: url.to_string(),
            caption: caption.to_string(),
        });
        self
    }

    pub fn build(self) -> Summary {
        self.summary
    }
}

/// Summary derived from an article the way the mock transformer does it
pub fn summary_for(article: &Article) -> Summary {
    let date = DateTime::parse_from_rfc3339(&article.published)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    SummaryBuilder::new(&article.content_id)
        .with_section(&article.section_id, &article.section_name)
        .with_title(&article.title)
        .with_date(date)
        .build()
}
